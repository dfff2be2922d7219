use std::sync::Arc;

use symcrypt_core::{ModeKind, SymcryptResult};

use super::{check_aligned, ChainingMode};
use crate::block::BlockCipher;
use crate::pool::BlockPool;

/// Electronic codebook: every block independent.
pub struct Ecb {
    cipher: Arc<dyn BlockCipher>,
    pool: Arc<BlockPool>,
}

impl Ecb {
    pub fn new(cipher: Arc<dyn BlockCipher>, pool: Arc<BlockPool>) -> Self {
        Self { cipher, pool }
    }
}

impl ChainingMode for Ecb {
    fn kind(&self) -> ModeKind {
        ModeKind::Ecb
    }

    fn encrypt(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        let block_size = self.cipher.block_size();
        check_aligned(data, block_size)?;
        let mut out = data.to_vec();
        self.pool
            .for_each_block(&mut out, block_size, |_, block| self.cipher.encrypt_block(block))?;
        Ok(out)
    }

    fn decrypt(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        let block_size = self.cipher.block_size();
        check_aligned(data, block_size)?;
        let mut out = data.to_vec();
        self.pool
            .for_each_block(&mut out, block_size, |_, block| self.cipher.decrypt_block(block))?;
        Ok(out)
    }

    fn parallel_encrypt(&self) -> bool {
        true
    }

    fn parallel_decrypt(&self) -> bool {
        true
    }
}
