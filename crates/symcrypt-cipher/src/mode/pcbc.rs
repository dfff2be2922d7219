use std::sync::Arc;

use symcrypt_core::{ModeKind, SymcryptResult};

use super::{check_aligned, xor_in_place, ChainingMode};
use crate::block::BlockCipher;

/// Propagating CBC. Each block feeds both its plaintext and ciphertext
/// forward, so neither direction can be split across workers.
pub struct Pcbc {
    cipher: Arc<dyn BlockCipher>,
    iv: Vec<u8>,
}

impl Pcbc {
    pub fn new(cipher: Arc<dyn BlockCipher>, iv: &[u8]) -> Self {
        Self {
            cipher,
            iv: iv.to_vec(),
        }
    }
}

impl ChainingMode for Pcbc {
    fn kind(&self) -> ModeKind {
        ModeKind::Pcbc
    }

    fn encrypt(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        let block_size = self.cipher.block_size();
        check_aligned(data, block_size)?;
        let mut out = data.to_vec();
        // P_{i-1} ^ C_{i-1}, starting from the IV
        let mut feedback = self.iv.clone();

        for (block, plain) in out.chunks_exact_mut(block_size).zip(data.chunks_exact(block_size)) {
            xor_in_place(block, &feedback);
            self.cipher.encrypt_block(block)?;
            feedback.copy_from_slice(plain);
            xor_in_place(&mut feedback, block);
        }
        Ok(out)
    }

    fn decrypt(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        let block_size = self.cipher.block_size();
        check_aligned(data, block_size)?;
        let mut out = data.to_vec();
        let mut feedback = self.iv.clone();

        for (block, cipher_block) in out.chunks_exact_mut(block_size).zip(data.chunks_exact(block_size)) {
            self.cipher.decrypt_block(block)?;
            xor_in_place(block, &feedback);
            feedback.copy_from_slice(cipher_block);
            xor_in_place(&mut feedback, block);
        }
        Ok(out)
    }
}
