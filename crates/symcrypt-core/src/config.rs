use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Top-level engine configuration (loaded from symcrypt.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SymcryptConfig {
    pub engine: EngineConfig,
    pub kex: KexConfig,
    pub logging: LoggingConfig,
}

impl SymcryptConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("parsing symcrypt config")
    }
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
pub fn load(path: &Path) -> anyhow::Result<SymcryptConfig> {
    if !path.exists() {
        tracing::warn!(
            "config file not found: {}  (using defaults)",
            path.display()
        );
        return Ok(SymcryptConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// What the façade does when an encrypt/decrypt call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Return the typed error to the caller
    #[default]
    Propagate,
    /// Log the error and return an empty buffer (old chat client behaviour)
    LegacyEmpty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker thread count for parallel modes (0 = available_parallelism - 1)
    pub workers: usize,
    /// Graceful pool shutdown wait in milliseconds (default: 2000)
    pub shutdown_timeout_ms: u64,
    /// Failure handling for encrypt/decrypt (default: propagate)
    pub failure_policy: FailurePolicy,
}

impl EngineConfig {
    /// Resolve `workers = 0` to one less than the machine's parallelism,
    /// never below one.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        available.saturating_sub(1).max(1)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            shutdown_timeout_ms: 2000,
            failure_policy: FailurePolicy::Propagate,
        }
    }
}

/// Diffie-Hellman parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KexConfig {
    /// Bit length of the generated prime modulus (default: 300)
    pub prime_bits: u64,
    /// Bit length of generated private exponents (default: 256)
    pub private_key_bits: u64,
    /// Miller-Rabin rounds per primality test (default: 32)
    pub miller_rabin_rounds: u32,
}

impl Default for KexConfig {
    fn default() -> Self {
        Self {
            prime_bits: 300,
            private_key_bits: 256,
            miller_rabin_rounds: 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (default: info); RUST_LOG overrides it
    pub level: String,
    /// Log format: "json" or "text"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}
