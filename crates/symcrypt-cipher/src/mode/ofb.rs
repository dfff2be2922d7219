use std::sync::Arc;

use symcrypt_core::{ModeKind, SymcryptResult};

use super::{check_aligned, xor_in_place, ChainingMode};
use crate::block::BlockCipher;

/// Output feedback. The keystream is E applied repeatedly to the IV, so it is
/// produced sequentially; encrypt and decrypt are the same operation.
pub struct Ofb {
    cipher: Arc<dyn BlockCipher>,
    iv: Vec<u8>,
}

impl Ofb {
    pub fn new(cipher: Arc<dyn BlockCipher>, iv: &[u8]) -> Self {
        Self {
            cipher,
            iv: iv.to_vec(),
        }
    }

    fn apply(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        let block_size = self.cipher.block_size();
        check_aligned(data, block_size)?;
        let mut out = data.to_vec();
        let mut keystream = self.iv.clone();

        for block in out.chunks_exact_mut(block_size) {
            self.cipher.encrypt_block(&mut keystream)?;
            xor_in_place(block, &keystream);
        }
        Ok(out)
    }
}

impl ChainingMode for Ofb {
    fn kind(&self) -> ModeKind {
        ModeKind::Ofb
    }

    fn encrypt(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        self.apply(data)
    }

    fn decrypt(&self, data: &[u8]) -> SymcryptResult<Vec<u8>> {
        self.apply(data)
    }
}
