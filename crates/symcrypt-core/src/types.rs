use std::fmt;
use std::str::FromStr;

use crate::error::{SymcryptError, SymcryptResult};

/// Supported block ciphers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Rc6,
    Serpent,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Rc6, Algorithm::Serpent];

    /// Block size in bytes (both ciphers use 128-bit blocks)
    pub fn block_size(self) -> usize {
        16
    }

    pub fn block_bits(self) -> u32 {
        self.block_size() as u32 * 8
    }

    /// Key sizes (in bits) the cipher's key schedule accepts
    pub fn supports_key_bits(self, bits: u32) -> bool {
        match self {
            Algorithm::Rc6 => matches!(bits, 128 | 192 | 256),
            Algorithm::Serpent => bits > 0 && bits <= 256 && bits % 8 == 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Rc6 => "RC6",
            Algorithm::Serpent => "SERPENT",
        }
    }
}

/// Block chaining modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Ecb,
    Cbc,
    Pcbc,
    Cfb,
    Ofb,
    Ctr,
    RandomDelta,
}

impl ModeKind {
    pub const ALL: [ModeKind; 7] = [
        ModeKind::Ecb,
        ModeKind::Cbc,
        ModeKind::Pcbc,
        ModeKind::Cfb,
        ModeKind::Ofb,
        ModeKind::Ctr,
        ModeKind::RandomDelta,
    ];

    /// ECB is the only mode that never reads the IV.
    pub fn requires_iv(self) -> bool {
        !matches!(self, ModeKind::Ecb)
    }

    pub fn name(self) -> &'static str {
        match self {
            ModeKind::Ecb => "ECB",
            ModeKind::Cbc => "CBC",
            ModeKind::Pcbc => "PCBC",
            ModeKind::Cfb => "CFB",
            ModeKind::Ofb => "OFB",
            ModeKind::Ctr => "CTR",
            ModeKind::RandomDelta => "RANDOM_DELTA",
        }
    }
}

/// Padding schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaddingKind {
    Zeros,
    AnsiX923,
    Pkcs7,
    Iso10126,
}

impl PaddingKind {
    pub const ALL: [PaddingKind; 4] = [
        PaddingKind::Zeros,
        PaddingKind::AnsiX923,
        PaddingKind::Pkcs7,
        PaddingKind::Iso10126,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PaddingKind::Zeros => "ZEROS",
            PaddingKind::AnsiX923 => "ANSI_X923",
            PaddingKind::Pkcs7 => "PKCS7",
            PaddingKind::Iso10126 => "ISO_10126",
        }
    }
}

/// Uppercase, `-` → `_`, so "random-delta" and "RANDOM_DELTA" agree.
fn normalize(name: &str) -> String {
    name.trim().to_ascii_uppercase().replace('-', "_")
}

impl FromStr for Algorithm {
    type Err = SymcryptError;

    fn from_str(s: &str) -> SymcryptResult<Self> {
        match normalize(s).as_str() {
            "RC6" => Ok(Algorithm::Rc6),
            "SERPENT" => Ok(Algorithm::Serpent),
            _ => Err(SymcryptError::Config(format!("unknown algorithm '{s}'"))),
        }
    }
}

impl FromStr for ModeKind {
    type Err = SymcryptError;

    fn from_str(s: &str) -> SymcryptResult<Self> {
        match normalize(s).as_str() {
            "ECB" => Ok(ModeKind::Ecb),
            "CBC" => Ok(ModeKind::Cbc),
            "PCBC" => Ok(ModeKind::Pcbc),
            "CFB" => Ok(ModeKind::Cfb),
            "OFB" => Ok(ModeKind::Ofb),
            "CTR" => Ok(ModeKind::Ctr),
            "RANDOM_DELTA" | "RD" => Ok(ModeKind::RandomDelta),
            _ => Err(SymcryptError::Config(format!(
                "unknown encryption mode '{s}'"
            ))),
        }
    }
}

impl FromStr for PaddingKind {
    type Err = SymcryptError;

    fn from_str(s: &str) -> SymcryptResult<Self> {
        match normalize(s).as_str() {
            "ZEROS" => Ok(PaddingKind::Zeros),
            "ANSI_X923" | "ANSI_X9.23" | "X923" => Ok(PaddingKind::AnsiX923),
            "PKCS7" => Ok(PaddingKind::Pkcs7),
            "ISO_10126" | "ISO10126" => Ok(PaddingKind::Iso10126),
            _ => Err(SymcryptError::Config(format!("unknown padding '{s}'"))),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for PaddingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything needed to build a façade except the key itself.
///
/// Block size is fixed by the algorithm; `key_bits` defaults to 128.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherSpec {
    pub algorithm: Algorithm,
    pub mode: ModeKind,
    pub padding: PaddingKind,
    pub key_bits: u32,
    pub block_bits: u32,
    pub iv: Vec<u8>,
}

impl CipherSpec {
    pub fn new(algorithm: Algorithm, mode: ModeKind, padding: PaddingKind, iv: Vec<u8>) -> Self {
        Self {
            algorithm,
            mode,
            padding,
            key_bits: 128,
            block_bits: algorithm.block_bits(),
            iv,
        }
    }

    /// Parse the three identifiers as they travel in the interchange record.
    pub fn from_names(
        algorithm: &str,
        mode: &str,
        padding: &str,
        key_bits: u32,
        iv: Vec<u8>,
    ) -> SymcryptResult<Self> {
        let spec = Self::new(algorithm.parse()?, mode.parse()?, padding.parse()?, iv)
            .with_key_bits(key_bits);
        spec.validate()?;
        Ok(spec)
    }

    pub fn with_key_bits(mut self, key_bits: u32) -> Self {
        self.key_bits = key_bits;
        self
    }

    pub fn block_size(&self) -> usize {
        self.algorithm.block_size()
    }

    pub fn key_len(&self) -> usize {
        self.key_bits as usize / 8
    }

    /// Check sizes against the algorithm. ECB accepts any IV (it is ignored).
    pub fn validate(&self) -> SymcryptResult<()> {
        if self.block_bits != self.algorithm.block_bits() {
            return Err(SymcryptError::Config(format!(
                "{} uses {}-bit blocks, spec says {}",
                self.algorithm,
                self.algorithm.block_bits(),
                self.block_bits
            )));
        }
        if !self.algorithm.supports_key_bits(self.key_bits) {
            return Err(SymcryptError::Config(format!(
                "{} does not support {}-bit keys",
                self.algorithm, self.key_bits
            )));
        }
        if self.mode.requires_iv() && self.iv.len() != self.block_size() {
            return Err(SymcryptError::Config(format!(
                "{} needs a {}-byte IV, got {} bytes",
                self.mode,
                self.block_size(),
                self.iv.len()
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for CipherSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherSpec")
            .field("algorithm", &self.algorithm)
            .field("mode", &self.mode)
            .field("padding", &self.padding)
            .field("key_bits", &self.key_bits)
            .field("block_bits", &self.block_bits)
            .field("iv_len", &self.iv.len())
            .finish()
    }
}
