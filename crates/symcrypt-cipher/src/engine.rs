//! Symmetric encryption façade
//!
//! One [`SymmetricEncryption`] binds a cipher spec, an expanded key and a
//! worker pool. Encrypt pads then chains; decrypt chains then strips.
//!
//! Failures are returned as [`SymcryptError`] unless the engine was built
//! with [`FailurePolicy::LegacyEmpty`], in which case they are logged and an
//! empty buffer comes back instead.

use std::sync::Arc;
use std::time::Duration;

use rand::{CryptoRng, RngCore};
use symcrypt_core::{CipherSpec, EngineConfig, FailurePolicy, SymcryptError, SymcryptResult};
use tracing::{debug, info, warn};

use crate::block::{new_block_cipher, BlockCipher};
use crate::mode::{new_mode, ChainingMode};
use crate::padding::{padding_for, PaddingScheme};
use crate::pool::BlockPool;

pub struct SymmetricEncryption {
    spec: CipherSpec,
    mode: Box<dyn ChainingMode>,
    padding: Box<dyn PaddingScheme>,
    pool: Arc<BlockPool>,
    policy: FailurePolicy,
    shutdown_timeout: Duration,
}

impl SymmetricEncryption {
    /// Expand `key` for `spec.algorithm` and assemble the pipeline.
    ///
    /// Fails with `Config` when `spec` is inconsistent or the key is not
    /// `spec.key_bits / 8` bytes long.
    pub fn new(spec: CipherSpec, key: &[u8], config: &EngineConfig) -> SymcryptResult<Self> {
        spec.validate()?;
        if key.len() != spec.key_len() {
            return Err(SymcryptError::Config(format!(
                "{} key must be {} bytes, got {}",
                spec.algorithm,
                spec.key_len(),
                key.len()
            )));
        }
        let cipher = new_block_cipher(spec.algorithm, key)?;
        Self::with_cipher(spec, cipher, config)
    }

    /// Assemble the pipeline around an already keyed cipher.
    pub fn with_cipher(
        spec: CipherSpec,
        cipher: Arc<dyn BlockCipher>,
        config: &EngineConfig,
    ) -> SymcryptResult<Self> {
        spec.validate()?;
        if cipher.algorithm() != spec.algorithm || cipher.block_size() != spec.block_size() {
            return Err(SymcryptError::Config(format!(
                "cipher {} with {}-byte blocks does not match spec {}",
                cipher.algorithm(),
                cipher.block_size(),
                spec.algorithm
            )));
        }

        let pool = Arc::new(BlockPool::new(config.worker_count()));
        let mode = new_mode(spec.mode, cipher, &spec.iv, Arc::clone(&pool))?;
        let padding = padding_for(spec.padding);

        info!(
            algorithm = %spec.algorithm,
            mode = %spec.mode,
            padding = %spec.padding,
            key_bits = spec.key_bits,
            workers = pool.workers(),
            policy = ?config.failure_policy,
            "symmetric engine ready"
        );

        Ok(Self {
            spec,
            mode,
            padding,
            pool,
            policy: config.failure_policy,
            shutdown_timeout: config.shutdown_timeout(),
        })
    }

    pub fn spec(&self) -> &CipherSpec {
        &self.spec
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Encrypt under the configured failure policy.
    pub fn encrypt(&self, plaintext: &[u8]) -> SymcryptResult<Vec<u8>> {
        self.apply_policy("encrypt", self.try_encrypt(plaintext))
    }

    /// Decrypt under the configured failure policy.
    pub fn decrypt(&self, ciphertext: &[u8]) -> SymcryptResult<Vec<u8>> {
        self.apply_policy("decrypt", self.try_decrypt(ciphertext))
    }

    /// Encrypt, always returning failures.
    pub fn try_encrypt(&self, plaintext: &[u8]) -> SymcryptResult<Vec<u8>> {
        self.encrypt_with_rng(plaintext, &mut rand::thread_rng())
    }

    /// Encrypt with an explicit RNG for random padding filler (ISO 10126).
    /// Always returns failures.
    pub fn encrypt_with_rng(&self, plaintext: &[u8], rng: &mut dyn RngCore) -> SymcryptResult<Vec<u8>> {
        let block_size = self.spec.block_size();
        let padded = self.padding.add_padding_with_rng(plaintext, block_size, rng)?;
        debug!(
            mode = %self.spec.mode,
            bytes = plaintext.len(),
            blocks = padded.len() / block_size,
            parallel = self.mode.parallel_encrypt(),
            "encrypt"
        );
        self.mode.encrypt(&padded)
    }

    /// Decrypt, always returning failures.
    pub fn try_decrypt(&self, ciphertext: &[u8]) -> SymcryptResult<Vec<u8>> {
        let block_size = self.spec.block_size();
        if ciphertext.is_empty() || ciphertext.len() % block_size != 0 {
            return Err(SymcryptError::InvalidInput {
                expected: format!("a non-empty multiple of {block_size} bytes"),
                actual: format!("{} bytes", ciphertext.len()),
            });
        }
        debug!(
            mode = %self.spec.mode,
            bytes = ciphertext.len(),
            blocks = ciphertext.len() / block_size,
            parallel = self.mode.parallel_decrypt(),
            "decrypt"
        );
        let padded = self.mode.decrypt(ciphertext)?;
        self.padding.remove_padding(&padded, block_size)
    }

    fn apply_policy(&self, op: &str, result: SymcryptResult<Vec<u8>>) -> SymcryptResult<Vec<u8>> {
        match (result, self.policy) {
            (Err(e), FailurePolicy::LegacyEmpty) => {
                warn!(op, error = %e, "operation failed; returning empty buffer (legacy policy)");
                Ok(Vec::new())
            }
            (result, _) => result,
        }
    }

    /// Release the worker pool, waiting up to the configured timeout.
    pub fn close(self) -> SymcryptResult<()> {
        self.pool.shutdown(self.shutdown_timeout)
    }
}

impl Drop for SymmetricEncryption {
    fn drop(&mut self) {
        if let Err(e) = self.pool.shutdown(self.shutdown_timeout) {
            warn!(error = %e, "worker pool shutdown on drop failed");
        }
    }
}

impl std::fmt::Debug for SymmetricEncryption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricEncryption")
            .field("spec", &self.spec)
            .field("pool", &self.pool)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Fresh random IV of `block_size` bytes.
pub fn generate_iv<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, block_size: usize) -> Vec<u8> {
    let mut iv = vec![0u8; block_size];
    rng.fill_bytes(&mut iv);
    iv
}
