//! Single-block ciphers
//!
//! A [`BlockCipher`] transforms exactly one block in place. The key schedule
//! is computed once at construction and is read-only afterwards, so one
//! instance is shared by every worker of a parallel mode.

mod rc6;
mod serpent;

use std::sync::Arc;

use symcrypt_core::{Algorithm, SymcryptError, SymcryptResult};

pub use rc6::Rc6;
pub use serpent::Serpent;

pub trait BlockCipher: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    /// Block size in bytes
    fn block_size(&self) -> usize;

    /// Encrypt one block in place. Fails with `InvalidInput` unless
    /// `block.len() == self.block_size()`.
    fn encrypt_block(&self, block: &mut [u8]) -> SymcryptResult<()>;

    /// Inverse of [`BlockCipher::encrypt_block`].
    fn decrypt_block(&self, block: &mut [u8]) -> SymcryptResult<()>;
}

/// Build the cipher named by `algorithm` with its key schedule expanded.
pub fn new_block_cipher(algorithm: Algorithm, key: &[u8]) -> SymcryptResult<Arc<dyn BlockCipher>> {
    let cipher: Arc<dyn BlockCipher> = match algorithm {
        Algorithm::Rc6 => Arc::new(Rc6::new(key)?),
        Algorithm::Serpent => Arc::new(Serpent::new(key)?),
    };
    Ok(cipher)
}

pub(crate) fn check_block_len(block: &[u8], block_size: usize) -> SymcryptResult<()> {
    if block.len() != block_size {
        return Err(SymcryptError::invalid_length("block", block_size, block.len()));
    }
    Ok(())
}

/// Load a 16-byte block as four little-endian words.
pub(crate) fn load_words(block: &[u8]) -> [u32; 4] {
    let mut words = [0u32; 4];
    for (word, bytes) in words.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    words
}

pub(crate) fn store_words(words: [u32; 4], block: &mut [u8]) {
    for (word, bytes) in words.iter().zip(block.chunks_exact_mut(4)) {
        bytes.copy_from_slice(&word.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_each_algorithm() {
        for algorithm in Algorithm::ALL {
            let cipher = new_block_cipher(algorithm, &[7u8; 16]).unwrap();
            assert_eq!(cipher.algorithm(), algorithm);
            assert_eq!(cipher.block_size(), algorithm.block_size());
        }
    }

    #[test]
    fn test_ciphers_share_crate_block_size() {
        for algorithm in Algorithm::ALL {
            let cipher = new_block_cipher(algorithm, &[7u8; 16]).unwrap();
            assert_eq!(cipher.block_size(), crate::BLOCK_SIZE);
            let mut block = [0u8; crate::BLOCK_SIZE];
            assert!(cipher.encrypt_block(&mut block).is_ok());
        }
    }

    #[test]
    fn test_wrong_block_length_rejected() {
        for algorithm in Algorithm::ALL {
            let cipher = new_block_cipher(algorithm, &[7u8; 16]).unwrap();
            let mut short = [0u8; 15];
            let mut long = [0u8; 17];

            assert!(matches!(
                cipher.encrypt_block(&mut short),
                Err(SymcryptError::InvalidInput { .. })
            ));
            assert!(matches!(
                cipher.decrypt_block(&mut long),
                Err(SymcryptError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn test_word_order_is_little_endian() {
        let block: Vec<u8> = (0u8..16).collect();
        let words = load_words(&block);
        assert_eq!(words[0], 0x0302_0100);
        assert_eq!(words[3], 0x0f0e_0d0c);

        let mut out = [0u8; 16];
        store_words(words, &mut out);
        assert_eq!(&out[..], &block[..]);
    }
}
