//! Block chaining modes
//!
//! Notation: `C_i` ciphertext block, `P_i` plaintext block, `E`/`D` the
//! block cipher, `^` XOR.
//!
//! | Mode         | Encrypt                         | Parallel         |
//! |--------------|---------------------------------|------------------|
//! | ECB          | C_i = E(P_i)                    | both             |
//! | CBC          | C_i = E(P_i ^ C_{i-1})          | decrypt          |
//! | PCBC         | C_i = E(P_i ^ P_{i-1} ^ C_{i-1})| neither          |
//! | CFB          | C_i = P_i ^ E(C_{i-1})          | decrypt          |
//! | OFB          | C_i = P_i ^ E^i(IV)             | neither          |
//! | CTR          | C_i = P_i ^ E(IV[..12] ‖ i)     | both             |
//! | Random-Delta | C_i = P_i ^ E(IV + i·delta)     | both             |
//!
//! Parallel paths go through the shared [`BlockPool`]; sequential paths run
//! on the calling thread and never touch it.

mod cbc;
mod cfb;
mod ctr;
mod ecb;
mod ofb;
mod pcbc;
mod random_delta;

use std::sync::Arc;

use symcrypt_core::{ModeKind, SymcryptError, SymcryptResult};

use crate::block::BlockCipher;
use crate::pool::BlockPool;

pub use cbc::Cbc;
pub use cfb::Cfb;
pub use ctr::Ctr;
pub use ecb::Ecb;
pub use ofb::Ofb;
pub use pcbc::Pcbc;
pub use random_delta::RandomDelta;

/// Whole-buffer encryption over a block cipher.
///
/// Inputs must be block aligned; outputs have the same length.
pub trait ChainingMode: Send + Sync {
    fn kind(&self) -> ModeKind;

    fn encrypt(&self, data: &[u8]) -> SymcryptResult<Vec<u8>>;

    fn decrypt(&self, data: &[u8]) -> SymcryptResult<Vec<u8>>;

    /// Whether `encrypt` fans out over the worker pool
    fn parallel_encrypt(&self) -> bool {
        false
    }

    /// Whether `decrypt` fans out over the worker pool
    fn parallel_decrypt(&self) -> bool {
        false
    }
}

/// Build the mode named by `kind`. `iv` is ignored by ECB and must be one
/// block long for every other mode.
pub fn new_mode(
    kind: ModeKind,
    cipher: Arc<dyn BlockCipher>,
    iv: &[u8],
    pool: Arc<BlockPool>,
) -> SymcryptResult<Box<dyn ChainingMode>> {
    if kind.requires_iv() && iv.len() != cipher.block_size() {
        return Err(SymcryptError::Config(format!(
            "{kind} needs a {}-byte IV, got {} bytes",
            cipher.block_size(),
            iv.len()
        )));
    }

    let mode: Box<dyn ChainingMode> = match kind {
        ModeKind::Ecb => Box::new(Ecb::new(cipher, pool)),
        ModeKind::Cbc => Box::new(Cbc::new(cipher, iv, pool)),
        ModeKind::Pcbc => Box::new(Pcbc::new(cipher, iv)),
        ModeKind::Cfb => Box::new(Cfb::new(cipher, iv, pool)),
        ModeKind::Ofb => Box::new(Ofb::new(cipher, iv)),
        ModeKind::Ctr => Box::new(Ctr::new(cipher, iv, pool)),
        ModeKind::RandomDelta => Box::new(RandomDelta::new(cipher, iv, pool)?),
    };
    Ok(mode)
}

pub(crate) fn check_aligned(data: &[u8], block_size: usize) -> SymcryptResult<()> {
    if data.len() % block_size != 0 {
        return Err(SymcryptError::InvalidInput {
            expected: format!("a multiple of {block_size} bytes"),
            actual: format!("{} bytes", data.len()),
        });
    }
    Ok(())
}

#[inline]
pub(crate) fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    fn build(kind: ModeKind, workers: usize) -> Box<dyn ChainingMode> {
        new_mode(kind, rc6(), &iv(), Arc::new(BlockPool::new(workers))).unwrap()
    }

    #[test]
    fn test_roundtrip_every_mode() {
        let data = sample(16 * 9);
        for kind in ModeKind::ALL {
            let mode = build(kind, 3);
            let encrypted = mode.encrypt(&data).unwrap();
            assert_eq!(encrypted.len(), data.len());
            assert_ne!(encrypted, data, "{kind} must change the data");
            assert_eq!(mode.decrypt(&encrypted).unwrap(), data, "{kind} roundtrip");
        }
    }

    #[test]
    fn test_empty_buffer_passes_through() {
        for kind in ModeKind::ALL {
            let mode = build(kind, 2);
            assert!(mode.encrypt(&[]).unwrap().is_empty());
            assert!(mode.decrypt(&[]).unwrap().is_empty());
        }
    }

    #[test]
    fn test_unaligned_input_rejected() {
        for kind in ModeKind::ALL {
            let mode = build(kind, 2);
            assert!(matches!(
                mode.encrypt(&[0u8; 17]),
                Err(SymcryptError::InvalidInput { .. })
            ));
            assert!(mode.decrypt(&[0u8; 5]).is_err());
        }
    }

    #[test]
    fn test_worker_count_does_not_change_output() {
        let data = sample(16 * 33);
        for kind in [ModeKind::Ecb, ModeKind::Ctr, ModeKind::RandomDelta, ModeKind::Cbc, ModeKind::Cfb] {
            let single = build(kind, 1);
            let many = build(kind, 6);
            let a = single.encrypt(&data).unwrap();
            let b = many.encrypt(&data).unwrap();
            assert_eq!(a, b, "{kind} encrypt differs between 1 and 6 workers");
            assert_eq!(single.decrypt(&a).unwrap(), many.decrypt(&b).unwrap());
        }
    }

    #[test]
    fn test_dispatch_table() {
        let expected = [
            (ModeKind::Ecb, true, true),
            (ModeKind::Cbc, false, true),
            (ModeKind::Pcbc, false, false),
            (ModeKind::Cfb, false, true),
            (ModeKind::Ofb, false, false),
            (ModeKind::Ctr, true, true),
            (ModeKind::RandomDelta, true, true),
        ];
        for (kind, enc, dec) in expected {
            let mode = build(kind, 1);
            assert_eq!(mode.kind(), kind);
            assert_eq!(mode.parallel_encrypt(), enc, "{kind} encrypt");
            assert_eq!(mode.parallel_decrypt(), dec, "{kind} decrypt");
        }
    }

    #[test]
    fn test_sequential_modes_never_start_pool() {
        let data = sample(64);
        for kind in [ModeKind::Pcbc, ModeKind::Ofb] {
            let pool = Arc::new(BlockPool::new(2));
            let mode = new_mode(kind, rc6(), &iv(), Arc::clone(&pool)).unwrap();
            let encrypted = mode.encrypt(&data).unwrap();
            mode.decrypt(&encrypted).unwrap();
            assert!(!pool.is_running(), "{kind} must stay on the calling thread");
        }
    }

    #[test]
    fn test_iv_length_checked() {
        let pool = Arc::new(BlockPool::new(1));
        for kind in ModeKind::ALL {
            let result = new_mode(kind, rc6(), &[0u8; 8], Arc::clone(&pool));
            if kind == ModeKind::Ecb {
                assert!(result.is_ok());
            } else {
                assert!(matches!(result, Err(SymcryptError::Config(_))), "{kind}");
            }
        }
    }

    #[test]
    fn test_ecb_ignores_iv() {
        let pool = Arc::new(BlockPool::new(1));
        let a = new_mode(ModeKind::Ecb, rc6(), &[], Arc::clone(&pool)).unwrap();
        let b = new_mode(ModeKind::Ecb, rc6(), &iv(), pool).unwrap();
        let data = sample(48);
        assert_eq!(a.encrypt(&data).unwrap(), b.encrypt(&data).unwrap());
    }

    #[test]
    fn test_worker_failure_surfaces_operation_failed() {
        let cipher: Arc<dyn BlockCipher> = Arc::new(FaultyCipher);
        let mode = new_mode(ModeKind::Ecb, cipher, &[], Arc::new(BlockPool::new(3))).unwrap();
        let mut data = vec![0u8; 16 * 6];
        data[16 * 4] = 0xFF;

        let err = mode.encrypt(&data).unwrap_err();
        assert!(matches!(err, SymcryptError::OperationFailed { block: 4, .. }));
    }
}
