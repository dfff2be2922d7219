//! Block padding schemes
//!
//! Padding always appends between 1 and `block_size` bytes, a full block when
//! the input is already aligned, so removal is never ambiguous for the
//! counted schemes.
//!
//! | Scheme      | n appended bytes                 |
//! |-------------|----------------------------------|
//! | Zeros       | n zero bytes                     |
//! | ANSI X9.23  | n-1 zero bytes, then n           |
//! | PKCS7       | n bytes of value n               |
//! | ISO 10126   | n-1 random bytes, then n         |

use rand::RngCore;
use symcrypt_core::{PaddingKind, SymcryptError, SymcryptResult};

pub trait PaddingScheme: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> PaddingKind;

    /// Write the scheme's bytes into `tail`, the region being appended.
    fn fill(&self, tail: &mut [u8], rng: &mut dyn RngCore);

    /// Number of trailing padding bytes in `data`, after validating them.
    fn padding_len(&self, data: &[u8], block_size: usize) -> SymcryptResult<usize>;

    /// Pad `data` up to the next multiple of `block_size`, drawing any random
    /// filler from `rng`. `block_size` must be in `1..=255`.
    fn add_padding_with_rng(
        &self,
        data: &[u8],
        block_size: usize,
        rng: &mut dyn RngCore,
    ) -> SymcryptResult<Vec<u8>> {
        check_block_size(block_size)?;
        let count = block_size - data.len() % block_size;
        let mut out = Vec::with_capacity(data.len() + count);
        out.extend_from_slice(data);
        out.resize(data.len() + count, 0);
        self.fill(&mut out[data.len()..], rng);
        Ok(out)
    }

    /// Pad using the thread-local RNG for random filler.
    fn add_padding(&self, data: &[u8], block_size: usize) -> SymcryptResult<Vec<u8>> {
        self.add_padding_with_rng(data, block_size, &mut rand::thread_rng())
    }

    fn remove_padding(&self, data: &[u8], block_size: usize) -> SymcryptResult<Vec<u8>> {
        check_block_size(block_size)?;
        if data.is_empty() {
            return Err(SymcryptError::InvalidPadding("empty buffer".into()));
        }
        if data.len() % block_size != 0 {
            return Err(SymcryptError::InvalidPadding(format!(
                "{} bytes is not a multiple of the {block_size}-byte block",
                data.len()
            )));
        }
        let count = self.padding_len(data, block_size)?;
        Ok(data[..data.len() - count].to_vec())
    }
}

/// Select the scheme for `kind`.
pub fn padding_for(kind: PaddingKind) -> Box<dyn PaddingScheme> {
    match kind {
        PaddingKind::Zeros => Box::new(Zeros),
        PaddingKind::AnsiX923 => Box::new(AnsiX923),
        PaddingKind::Pkcs7 => Box::new(Pkcs7),
        PaddingKind::Iso10126 => Box::new(Iso10126),
    }
}

/// The count byte must be able to encode a whole block.
fn check_block_size(block_size: usize) -> SymcryptResult<()> {
    if !(1..=usize::from(u8::MAX)).contains(&block_size) {
        return Err(SymcryptError::InvalidInput {
            expected: "block size in 1..=255".into(),
            actual: block_size.to_string(),
        });
    }
    Ok(())
}

/// Read the trailing count byte and check it fits the block and the buffer.
fn counted_len(data: &[u8], block_size: usize) -> SymcryptResult<usize> {
    let count = usize::from(data[data.len() - 1]);
    if count == 0 || count > block_size || count > data.len() {
        return Err(SymcryptError::InvalidPadding(format!(
            "padding count {count} out of range for {block_size}-byte blocks"
        )));
    }
    Ok(count)
}

/// Zero filler. Removal trims every trailing zero, so payloads that end in
/// zero bytes lose them.
#[derive(Debug, Clone, Copy)]
pub struct Zeros;

impl PaddingScheme for Zeros {
    fn kind(&self) -> PaddingKind {
        PaddingKind::Zeros
    }

    fn fill(&self, tail: &mut [u8], _rng: &mut dyn RngCore) {
        tail.fill(0);
    }

    fn padding_len(&self, data: &[u8], _block_size: usize) -> SymcryptResult<usize> {
        Ok(data.iter().rev().take_while(|&&b| b == 0).count())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnsiX923;

impl PaddingScheme for AnsiX923 {
    fn kind(&self) -> PaddingKind {
        PaddingKind::AnsiX923
    }

    fn fill(&self, tail: &mut [u8], _rng: &mut dyn RngCore) {
        let last = tail.len() - 1;
        tail[..last].fill(0);
        tail[last] = tail.len() as u8;
    }

    fn padding_len(&self, data: &[u8], block_size: usize) -> SymcryptResult<usize> {
        let count = counted_len(data, block_size)?;
        let filler = &data[data.len() - count..data.len() - 1];
        if filler.iter().any(|&b| b != 0) {
            return Err(SymcryptError::InvalidPadding(
                "ANSI X9.23 filler bytes must be zero".into(),
            ));
        }
        Ok(count)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Pkcs7;

impl PaddingScheme for Pkcs7 {
    fn kind(&self) -> PaddingKind {
        PaddingKind::Pkcs7
    }

    fn fill(&self, tail: &mut [u8], _rng: &mut dyn RngCore) {
        let count = tail.len() as u8;
        tail.fill(count);
    }

    fn padding_len(&self, data: &[u8], block_size: usize) -> SymcryptResult<usize> {
        let count = counted_len(data, block_size)?;
        if data[data.len() - count..].iter().any(|&b| usize::from(b) != count) {
            return Err(SymcryptError::InvalidPadding(format!(
                "PKCS7 expects {count} bytes of value {count}"
            )));
        }
        Ok(count)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Iso10126;

impl PaddingScheme for Iso10126 {
    fn kind(&self) -> PaddingKind {
        PaddingKind::Iso10126
    }

    fn fill(&self, tail: &mut [u8], rng: &mut dyn RngCore) {
        let last = tail.len() - 1;
        rng.fill_bytes(&mut tail[..last]);
        tail[last] = tail.len() as u8;
    }

    fn padding_len(&self, data: &[u8], block_size: usize) -> SymcryptResult<usize> {
        counted_len(data, block_size)
    }
}
