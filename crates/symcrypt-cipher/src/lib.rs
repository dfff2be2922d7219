//! symcrypt-cipher: pluggable symmetric encryption
//!
//! Architecture: Block Cipher + Chaining Mode + Padding, composed by a façade
//!
//! Pipeline:
//! ```text
//! encrypt: plaintext → pad to block size → chaining mode → ciphertext
//! decrypt: ciphertext → chaining mode → strip padding → plaintext
//! ```
//!
//! Dispatch per mode:
//! ```text
//! ECB, CTR, Random-Delta   parallel both directions (one pool task per block)
//! CBC, CFB                 parallel decrypt, sequential encrypt
//! PCBC, OFB                sequential both directions (calling thread only)
//! ```
//!
//! The worker pool belongs to the façade and is shared with its mode. It is
//! built on first parallel use and released by `SymmetricEncryption::close`
//! (or on drop).

pub mod block;
pub mod engine;
pub mod mode;
pub mod padding;
pub mod pool;

pub use block::{new_block_cipher, BlockCipher, Rc6, Serpent};
pub use engine::{generate_iv, SymmetricEncryption};
pub use mode::{new_mode, ChainingMode};
pub use padding::{padding_for, PaddingScheme};
pub use pool::BlockPool;

pub use symcrypt_core::{Algorithm, CipherSpec, ModeKind, PaddingKind};

/// Block size shared by RC6 and Serpent (128-bit)
pub const BLOCK_SIZE: usize = 16;
