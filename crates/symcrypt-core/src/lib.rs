pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{EngineConfig, FailurePolicy, KexConfig, LogFormat, LoggingConfig, SymcryptConfig};
pub use error::{SymcryptError, SymcryptResult};
pub use types::{Algorithm, CipherSpec, ModeKind, PaddingKind};
