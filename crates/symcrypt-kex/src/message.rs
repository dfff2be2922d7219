//! Key-exchange interchange records
//!
//! JSON objects with camelCase keys. Byte fields (IV, public key, p, g) are
//! standard base64 strings; numbers are big-endian unsigned.
//!
//! ```json
//! {"typeMessage":"cipher_info","anotherClientId":7,"nameAlgorithm":"RC6",
//!  "namePadding":"PKCS7","encryptionMode":"CBC","sizeKeyInBits":128,
//!  "sizeBlockInBits":128,"initializationVector":"...","publicKey":"...",
//!  "p":"...","g":"..."}
//! ```

use serde::{Deserialize, Serialize};
use symcrypt_core::{CipherSpec, SymcryptError, SymcryptResult};

use crate::dh::DhParams;

pub const CIPHER_INFO_TYPE: &str = "cipher_info";
pub const KEY_INFO_TYPE: &str = "key_info";

/// Cipher choice, IV, group parameters and the sender's public value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CipherInfoMessage {
    pub type_message: String,
    pub another_client_id: u64,
    pub name_algorithm: String,
    pub name_padding: String,
    pub encryption_mode: String,
    pub size_key_in_bits: u32,
    pub size_block_in_bits: u32,
    #[serde(with = "b64")]
    pub initialization_vector: Vec<u8>,
    /// Absent until the sender has computed its key pair
    #[serde(default, with = "b64_opt", skip_serializing_if = "Option::is_none")]
    pub public_key: Option<Vec<u8>>,
    #[serde(with = "b64")]
    pub p: Vec<u8>,
    #[serde(with = "b64")]
    pub g: Vec<u8>,
}

impl CipherInfoMessage {
    /// Build a record for `spec` and `params` addressed to `another_client_id`.
    pub fn new(another_client_id: u64, spec: &CipherSpec, params: &DhParams) -> Self {
        Self {
            type_message: CIPHER_INFO_TYPE.to_string(),
            another_client_id,
            name_algorithm: spec.algorithm.to_string(),
            name_padding: spec.padding.to_string(),
            encryption_mode: spec.mode.to_string(),
            size_key_in_bits: spec.key_bits,
            size_block_in_bits: spec.block_bits,
            initialization_vector: spec.iv.clone(),
            public_key: None,
            p: params.p_bytes(),
            g: params.g_bytes(),
        }
    }

    pub fn with_public_key(mut self, public_key: Vec<u8>) -> Self {
        self.public_key = Some(public_key);
        self
    }

    /// Parse the identifiers and sizes back into a validated spec.
    pub fn cipher_spec(&self) -> SymcryptResult<CipherSpec> {
        let spec = CipherSpec::from_names(
            &self.name_algorithm,
            &self.encryption_mode,
            &self.name_padding,
            self.size_key_in_bits,
            self.initialization_vector.clone(),
        )?;
        if spec.block_bits != self.size_block_in_bits {
            return Err(SymcryptError::Config(format!(
                "{} uses {}-bit blocks, message says {}",
                spec.algorithm, spec.block_bits, self.size_block_in_bits
            )));
        }
        Ok(spec)
    }

    pub fn dh_params(&self) -> SymcryptResult<DhParams> {
        DhParams::from_bytes_be(&self.p, &self.g)
    }

    pub fn to_json(&self) -> SymcryptResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> SymcryptResult<Self> {
        let message: Self = serde_json::from_str(json)?;
        expect_type(&message.type_message, CIPHER_INFO_TYPE)?;
        Ok(message)
    }
}

/// Bare public value sent back by the responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMessage {
    pub type_message: String,
    #[serde(with = "b64")]
    pub public_key: Vec<u8>,
}

impl KeyMessage {
    pub fn new(public_key: Vec<u8>) -> Self {
        Self {
            type_message: KEY_INFO_TYPE.to_string(),
            public_key,
        }
    }

    pub fn to_json(&self) -> SymcryptResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> SymcryptResult<Self> {
        let message: Self = serde_json::from_str(json)?;
        expect_type(&message.type_message, KEY_INFO_TYPE)?;
        Ok(message)
    }
}

fn expect_type(actual: &str, expected: &str) -> SymcryptResult<()> {
    if actual != expected {
        return Err(SymcryptError::KeyExchange(format!(
            "expected a {expected} message, got {actual:?}"
        )));
    }
    Ok(())
}

fn base64_encode(data: &[u8]) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    STANDARD.encode(data)
}

fn base64_decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    STANDARD.decode(s)
}

mod b64 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::base64_encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::base64_decode(&s).map_err(|e| de::Error::custom(format!("base64 decode: {e}")))
    }
}

mod b64_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => super::b64::serialize(bytes, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => super::base64_decode(&s)
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("base64 decode: {e}"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use symcrypt_core::{Algorithm, ModeKind, PaddingKind};

    fn params() -> DhParams {
        // 2^61 - 1 is prime; 3 lies in [2, p - 2]
        let p = (BigUint::from(1u32) << 61u32) - 1u32;
        DhParams::new(p, BigUint::from(3u32)).unwrap()
    }

    fn sample() -> CipherInfoMessage {
        let spec = CipherSpec::new(Algorithm::Serpent, ModeKind::Cfb, PaddingKind::Iso10126, vec![0xAB; 16]);
        CipherInfoMessage::new(42, &spec, &params()).with_public_key(vec![1, 2, 3])
    }

    #[test]
    fn test_json_field_names() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["typeMessage"], "cipher_info");
        assert_eq!(value["anotherClientId"], 42);
        assert_eq!(value["nameAlgorithm"], "SERPENT");
        assert_eq!(value["namePadding"], "ISO_10126");
        assert_eq!(value["encryptionMode"], "CFB");
        assert_eq!(value["sizeKeyInBits"], 128);
        assert_eq!(value["sizeBlockInBits"], 128);
        assert_eq!(value["publicKey"], "AQID");
    }

    #[test]
    fn test_roundtrip_and_spec() {
        let message = sample();
        let restored = CipherInfoMessage::from_json(&message.to_json().unwrap()).unwrap();
        assert_eq!(restored, message);

        let spec = restored.cipher_spec().unwrap();
        // CFB stays CFB
        assert_eq!(spec.mode, ModeKind::Cfb);
        assert_eq!(spec.algorithm, Algorithm::Serpent);
        assert_eq!(restored.dh_params().unwrap(), params());
    }

    #[test]
    fn test_missing_public_key_is_none() {
        let spec = CipherSpec::new(Algorithm::Rc6, ModeKind::Ecb, PaddingKind::Zeros, vec![]);
        let message = CipherInfoMessage::new(1, &spec, &params());
        let json = message.to_json().unwrap();
        assert!(!json.contains("publicKey"));
        assert_eq!(CipherInfoMessage::from_json(&json).unwrap().public_key, None);
    }

    #[test]
    fn test_unknown_identifier_rejected() {
        let mut message = sample();
        message.encryption_mode = "XTS".into();
        assert!(matches!(message.cipher_spec(), Err(SymcryptError::Config(_))));
    }

    #[test]
    fn test_block_size_mismatch_rejected() {
        let mut message = sample();
        message.size_block_in_bits = 64;
        assert!(message.cipher_spec().is_err());
    }

    #[test]
    fn test_bad_base64_and_wrong_type() {
        let json = sample().to_json().unwrap().replace("AQID", "!!!");
        assert!(matches!(
            CipherInfoMessage::from_json(&json),
            Err(SymcryptError::Serialization(_))
        ));

        let key = KeyMessage::new(vec![9; 4]).to_json().unwrap();
        assert!(CipherInfoMessage::from_json(&key).is_err());
        assert!(matches!(
            KeyMessage::from_json(&sample().to_json().unwrap()),
            Err(SymcryptError::KeyExchange(_)) | Err(SymcryptError::Serialization(_))
        ));
    }

    #[test]
    fn test_key_message_roundtrip() {
        let message = KeyMessage::new(vec![0xFF, 0x00, 0x10]);
        let json = message.to_json().unwrap();
        assert!(json.contains("\"typeMessage\":\"key_info\""));
        assert_eq!(KeyMessage::from_json(&json).unwrap(), message);
    }
}
