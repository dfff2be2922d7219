use std::sync::Arc;

use symcrypt_core::{ModeKind, SymcryptResult};

use super::{check_aligned, xor_in_place, ChainingMode};
use crate::block::BlockCipher;
use crate::pool::BlockPool;

/// Cipher block chaining. Decrypt only needs ciphertext, so it runs on the pool.
pub struct Cbc {
    cipher: Arc<dyn BlockCipher>,
    iv: Vec<u8>,
    pool: Arc<BlockPool>,
}

impl Cbc {
    pub fn new(cipher: Arc<dyn BlockCipher>, iv: &[u8], pool: Arc<BlockPool>) -> Self {
        Self {
            cipher,
            iv: iv.to_vec(),
            pool,
        }
    }
}

impl ChainingMode for Cbc {
    fn kind(&self) -> ModeKind {
        ModeKind::Cbc
    }

    fn encrypt(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        let block_size = self.cipher.block_size();
        check_aligned(data, block_size)?;
        let mut out = data.to_vec();
        let mut previous = self.iv.clone();

        for block in out.chunks_exact_mut(block_size) {
            xor_in_place(block, &previous);
            self.cipher.encrypt_block(block)?;
            previous.copy_from_slice(block);
        }
        Ok(out)
    }

    fn decrypt(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        let block_size = self.cipher.block_size();
        check_aligned(data, block_size)?;
        let mut out = data.to_vec();

        self.pool.for_each_block(&mut out, block_size, |index, block| {
            self.cipher.decrypt_block(block)?;
            let previous = match index {
                0 => &self.iv[..],
                _ => &data[(index - 1) * block_size..index * block_size],
            };
            xor_in_place(block, previous);
            Ok(())
        })?;
        Ok(out)
    }

    fn parallel_decrypt(&self) -> bool {
        true
    }
}
