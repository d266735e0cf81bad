//! Configuration for controllers and resolvers.
//!
//! Stored as JSON:
//! ```json
//! { "method": "ethr", "default_validity_secs": 86400, "default_token_lifetime_secs": null }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DidError, Result};

/// DID method name used when none is configured.
pub const DEFAULT_METHOD: &str = "ethr";

/// Validity of delegates and attributes added without an explicit expiry (one day).
pub const DEFAULT_VALIDITY_SECS: u64 = 86_400;

/// Tunables shared by the controller, resolver and token layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DidConfig {
    /// DID method segment (`did:<method>:<address>`).
    pub method: String,
    /// Seconds a delegate or attribute stays valid when no expiry is given.
    pub default_validity_secs: u64,
    /// Lifetime stamped into `exp` of signed tokens, if any.
    pub default_token_lifetime_secs: Option<u64>,
}

impl Default for DidConfig {
    fn default() -> Self {
        Self {
            method: DEFAULT_METHOD.to_string(),
            default_validity_secs: DEFAULT_VALIDITY_SECS,
            default_token_lifetime_secs: None,
        }
    }
}

impl DidConfig {
    /// Load a configuration file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Write this configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.method.is_empty()
            || !self
                .method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(DidError::InvalidConfig(format!(
                "invalid method name: {:?}",
                self.method
            )));
        }
        if self.default_validity_secs == 0 {
            return Err(DidError::InvalidConfig("default_validity_secs must be positive".into()));
        }
        Ok(())
    }
}
