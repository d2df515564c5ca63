//! Configuration management for Warden.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use warden_common::WardenError;
use warden_common::constants::{
    DEFAULT_ALLOWED_ATTEMPTS, DEFAULT_KEY_NAMESPACE, DEFAULT_MIRROR_CAPACITY,
    DEFAULT_PENALTY_SECS, DEFAULT_RECORD_TTL_SECS, DEFAULT_REDIS_URL,
};

/// Application configuration
///
/// Read once at startup and immutable thereafter; there is no runtime
/// reconfiguration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Namespace mixed into every derived key
    #[serde(default = "default_key_namespace")]
    pub key_namespace: String,

    /// Lockout policy
    #[serde(default)]
    pub lockout: LockoutConfig,

    /// Process-local mirror
    #[serde(default)]
    pub mirror: MirrorConfig,
}

/// Lockout policy tunables
#[derive(Debug, Clone, Deserialize)]
pub struct LockoutConfig {
    /// Consecutive failures tolerated before a key is locked
    #[serde(default = "default_allowed_attempts")]
    pub allowed_attempts: u32,

    /// Penalty window in seconds
    #[serde(default = "default_penalty_seconds")]
    pub penalty_seconds: u64,

    /// Record TTL hint for the shared store, in seconds
    #[serde(default = "default_record_ttl")]
    pub record_ttl_secs: u64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            allowed_attempts: default_allowed_attempts(),
            penalty_seconds: default_penalty_seconds(),
            record_ttl_secs: default_record_ttl(),
        }
    }
}

/// Process-local mirror configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    /// Whether reads may consult the local mirror
    #[serde(default = "default_mirror_enabled")]
    pub enabled: bool,

    /// Maximum mirrored entries
    #[serde(default = "default_mirror_capacity")]
    pub capacity: usize,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            enabled: default_mirror_enabled(),
            capacity: default_mirror_capacity(),
        }
    }
}

// Default value functions
fn default_redis_url() -> String {
    DEFAULT_REDIS_URL.to_string()
}
fn default_key_namespace() -> String {
    DEFAULT_KEY_NAMESPACE.to_string()
}
fn default_allowed_attempts() -> u32 {
    DEFAULT_ALLOWED_ATTEMPTS
}
fn default_penalty_seconds() -> u64 {
    DEFAULT_PENALTY_SECS
}
fn default_record_ttl() -> u64 {
    DEFAULT_RECORD_TTL_SECS
}
fn default_mirror_enabled() -> bool {
    true
}
fn default_mirror_capacity() -> usize {
    DEFAULT_MIRROR_CAPACITY
}

impl AppConfig {
    /// Load configuration from file, with environment overrides
    /// (`WARDEN_`-prefixed variables, `__` as the nesting separator).
    pub fn load(config_path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();

        if Path::new(config_path).exists() {
            builder = builder.add_source(config::File::with_name(config_path));
        } else {
            tracing::warn!("Config file not found, using defaults");
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("WARDEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load config")?;

        let config: Self = settings
            .try_deserialize()
            .context("Failed to parse config")?;

        config.validate()?;

        Ok(config)
    }

    /// Reject tunables the decision logic cannot work with.
    pub fn validate(&self) -> Result<(), WardenError> {
        if self.lockout.allowed_attempts == 0 {
            return Err(WardenError::Config(
                "allowed_attempts must be positive".to_string(),
            ));
        }
        if self.lockout.penalty_seconds == 0 {
            return Err(WardenError::Config(
                "penalty_seconds must be positive".to_string(),
            ));
        }
        if self.key_namespace.is_empty() {
            return Err(WardenError::Config(
                "key_namespace must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// TTL actually applied to stored records. Never shorter than the
    /// penalty window, or a locked record could vanish mid-penalty.
    pub fn record_ttl(&self) -> u64 {
        self.lockout.record_ttl_secs.max(self.lockout.penalty_seconds)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            key_namespace: default_key_namespace(),
            lockout: LockoutConfig::default(),
            mirror: MirrorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.lockout.allowed_attempts, 5);
        assert_eq!(config.lockout.penalty_seconds, 60);
        assert!(config.mirror.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_tunables_rejected() {
        let mut config = AppConfig::default();
        config.lockout.allowed_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.lockout.penalty_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_record_ttl_covers_penalty() {
        let mut config = AppConfig::default();
        config.lockout.record_ttl_secs = 10;
        config.lockout.penalty_seconds = 120;

        assert_eq!(config.record_ttl(), 120);
    }
}
