//! symcrypt-kex: Diffie-Hellman key agreement for symcrypt sessions
//!
//! Flow between two parties sharing domain parameters `(p, g)`:
//! ```text
//! A: a = generate_private_key()      B: b = generate_private_key()
//! A: send CipherInfoMessage{g^a, p, g, cipher ids, IV}
//! B: key = derive_shared_key(g^a, b, p)  → SymmetricEncryption
//! B: send KeyMessage{g^b}
//! A: key = derive_shared_key(g^b, a, p)  → SymmetricEncryption
//! ```

pub mod dh;
pub mod message;
pub mod prime;
pub mod session;

pub use dh::{
    derive_shared_key, generate_parameters, generate_private_key, generate_public_key, DhParams,
    KeyExchange, PrivateKey, SharedKey,
};
pub use message::{CipherInfoMessage, KeyMessage};
pub use session::session_cipher;
