use num_bigint::BigUint;
use symcrypt_cipher::SymmetricEncryption;
use symcrypt_core::{EngineConfig, SymcryptError, SymcryptResult};
use tracing::info;

use crate::dh::{derive_shared_key, PrivateKey};
use crate::message::CipherInfoMessage;

/// Build the façade for a session announced by `message`.
///
/// The key is derived from the message's public value and modulus with
/// `private_key`; cipher, mode, padding, key size and IV all come from the
/// message.
pub fn session_cipher(
    message: &CipherInfoMessage,
    private_key: &PrivateKey,
    config: &EngineConfig,
) -> SymcryptResult<SymmetricEncryption> {
    let spec = message.cipher_spec()?;
    let params = message.dh_params()?;
    let peer = message
        .public_key
        .as_deref()
        .map(BigUint::from_bytes_be)
        .ok_or_else(|| SymcryptError::KeyExchange("cipher_info message has no public key".into()))?;

    let key = derive_shared_key(&peer, private_key, params.p(), spec.key_bits)?;
    info!(
        peer = message.another_client_id,
        algorithm = %spec.algorithm,
        mode = %spec.mode,
        "session cipher established"
    );
    SymmetricEncryption::new(spec, key.as_bytes(), config)
}
