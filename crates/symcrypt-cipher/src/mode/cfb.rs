use std::sync::Arc;

use symcrypt_core::{ModeKind, SymcryptResult};

use super::{check_aligned, xor_in_place, ChainingMode};
use crate::block::BlockCipher;
use crate::pool::BlockPool;

/// Full-block cipher feedback.
///
/// Encrypt feeds each fresh ciphertext block into the next keystream block
/// and runs sequentially. Decrypt derives every keystream block from
/// ciphertext alone (`P_i = C_i ^ E(C_{i-1})`) and runs on the pool.
pub struct Cfb {
    cipher: Arc<dyn BlockCipher>,
    iv: Vec<u8>,
    pool: Arc<BlockPool>,
}

impl Cfb {
    pub fn new(cipher: Arc<dyn BlockCipher>, iv: &[u8], pool: Arc<BlockPool>) -> Self {
        Self {
            cipher,
            iv: iv.to_vec(),
            pool,
        }
    }
}

impl ChainingMode for Cfb {
    fn kind(&self) -> ModeKind {
        ModeKind::Cfb
    }

    fn encrypt(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        let block_size = self.cipher.block_size();
        check_aligned(data, block_size)?;
        let mut out = data.to_vec();
        let mut keystream = self.iv.clone();

        for block in out.chunks_exact_mut(block_size) {
            self.cipher.encrypt_block(&mut keystream)?;
            xor_in_place(block, &keystream);
            keystream.copy_from_slice(block);
        }
        Ok(out)
    }

    fn decrypt(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        let block_size = self.cipher.block_size();
        check_aligned(data, block_size)?;
        let mut out = data.to_vec();

        self.pool.for_each_block(&mut out, block_size, |index, block| {
            let mut keystream = match index {
                0 => self.iv.clone(),
                _ => data[(index - 1) * block_size..index * block_size].to_vec(),
            };
            self.cipher.encrypt_block(&mut keystream)?;
            xor_in_place(block, &keystream);
            Ok(())
        })?;
        Ok(out)
    }

    fn parallel_decrypt(&self) -> bool {
        true
    }
}
