use std::sync::Arc;

use symcrypt_core::{ModeKind, SymcryptError, SymcryptResult};

use super::{check_aligned, xor_in_place, ChainingMode};
use crate::block::BlockCipher;
use crate::pool::BlockPool;

const COUNTER_LEN: usize = 4;

/// Counter mode. Block `i`'s keystream input is the IV with its last four
/// bytes replaced by `i` as a big-endian u32, which limits one call to 2^32
/// blocks.
pub struct Ctr {
    cipher: Arc<dyn BlockCipher>,
    iv: Vec<u8>,
    pool: Arc<BlockPool>,
}

impl Ctr {
    pub fn new(cipher: Arc<dyn BlockCipher>, iv: &[u8], pool: Arc<BlockPool>) -> Self {
        Self {
            cipher,
            iv: iv.to_vec(),
            pool,
        }
    }

    fn apply(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        let block_size = self.cipher.block_size();
        check_aligned(data, block_size)?;
        let blocks = data.len() / block_size;
        if blocks as u64 > u64::from(u32::MAX) + 1 {
            return Err(SymcryptError::InvalidInput {
                expected: "at most 2^32 blocks in counter mode".into(),
                actual: format!("{blocks} blocks"),
            });
        }

        let mut out = data.to_vec();
        self.pool.for_each_block(&mut out, block_size, |index, block| {
            let mut keystream = counter_block(&self.iv, index as u32);
            self.cipher.encrypt_block(&mut keystream)?;
            xor_in_place(block, &keystream);
            Ok(())
        })?;
        Ok(out)
    }
}

pub(crate) fn counter_block(iv: &[u8], index: u32) -> Vec<u8> {
    let mut input = iv.to_vec();
    let split = input.len() - COUNTER_LEN;
    input[split..].copy_from_slice(&index.to_be_bytes());
    input
}

impl ChainingMode for Ctr {
    fn kind(&self) -> ModeKind {
        ModeKind::Ctr
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
