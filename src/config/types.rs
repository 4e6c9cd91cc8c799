//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/promptloom/) and project (promptloom.toml)
//! level configuration.

use serde::{Deserialize, Serialize};

use crate::ai::provider::ProviderConfig;
use crate::constants::{cache as cache_constants, session as session_constants};
use crate::types::{LoomError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// HTTP server settings
    pub server: ServerConfig,

    /// LLM provider settings
    pub llm: ProviderConfig,

    /// Response cache settings
    pub cache: CacheConfig,

    /// Client session settings
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            server: ServerConfig::default(),
            llm: ProviderConfig::default(),
            cache: CacheConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `LoomError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(LoomError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(LoomError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.cache.ttl_secs == 0 {
            return Err(LoomError::Config(
                "Cache ttl_secs must be greater than 0".to_string(),
            ));
        }

        if self.session.selection_cap == 0
            || self.session.selection_cap > session_constants::MAX_SELECTION_CAP
        {
            return Err(LoomError::Config(format!(
                "Session selection_cap must be between 1 and {}, got {}",
                session_constants::MAX_SELECTION_CAP,
                self.session.selection_cap
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

// =============================================================================
// Cache Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry time-to-live in seconds
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: cache_constants::TTL_SECS,
        }
    }
}

// =============================================================================
// Session Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of tags a user may select
    pub selection_cap: usize,

    /// Debounce window after a topic keystroke, in milliseconds
    pub debounce_ms: u64,

    /// Tags revealed before the first selection
    pub initial_reveal: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            selection_cap: session_constants::DEFAULT_SELECTION_CAP,
            debounce_ms: session_constants::DEBOUNCE_MS,
            initial_reveal: session_constants::INITIAL_REVEAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_selection_cap_bounds() {
        let mut config = Config::default();
        config.session.selection_cap = 8;
        assert!(config.validate().is_ok());

        config.session.selection_cap = 9;
        assert!(config.validate().is_err());

        config.session.selection_cap = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_temperature_bounds() {
        let mut config = Config::default();
        config.llm.temperature = 2.5;
        assert!(config.validate().is_err());
    }
}
