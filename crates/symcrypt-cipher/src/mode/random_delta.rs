use std::sync::Arc;

use symcrypt_core::{ModeKind, SymcryptError, SymcryptResult};

use super::{check_aligned, xor_in_place, ChainingMode};
use crate::block::BlockCipher;
use crate::pool::BlockPool;

/// Random-Delta: a counter mode whose step is taken from the IV.
///
/// With the IV read as a big-endian 128-bit integer `base` and
/// `delta = (low 64 bits of base) | 1`, block `i` is XORed with
/// `E(base + i * delta)` (wrapping). Needs a 128-bit block.
pub struct RandomDelta {
    cipher: Arc<dyn BlockCipher>,
    base: u128,
    delta: u128,
    pool: Arc<BlockPool>,
}

impl RandomDelta {
    pub fn new(cipher: Arc<dyn BlockCipher>, iv: &[u8], pool: Arc<BlockPool>) -> SymcryptResult<Self> {
        let iv: [u8; 16] = iv.try_into().map_err(|_| {
            SymcryptError::Config(format!(
                "RANDOM_DELTA needs a 16-byte IV, got {} bytes",
                iv.len()
            ))
        })?;
        let base = u128::from_be_bytes(iv);
        let delta = u128::from(base as u64 | 1);
        Ok(Self {
            cipher,
            base,
            delta,
            pool,
        })
    }

    fn keystream_input(&self, index: usize) -> [u8; 16] {
        self.base
            .wrapping_add(self.delta.wrapping_mul(index as u128))
            .to_be_bytes()
    }

    fn apply(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        let block_size = self.cipher.block_size();
        check_aligned(data, block_size)?;
        let mut out = data.to_vec();

        self.pool.for_each_block(&mut out, block_size, |index, block| {
            let mut keystream = self.keystream_input(index);
            self.cipher.encrypt_block(&mut keystream)?;
            xor_in_place(block, &keystream);
            Ok(())
        })?;
        Ok(out)
    }
}

impl ChainingMode for RandomDelta {
    fn kind(&self) -> ModeKind {
        ModeKind::RandomDelta
    }

    fn encrypt(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        self.apply(data)
    }

    fn decrypt(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        self.apply(data)
    }

    fn parallel_encrypt(&self) -> bool {
        true
    }

    fn parallel_decrypt(&self) -> bool {
        true
    }
}
