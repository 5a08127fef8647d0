//! Document context configuration.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use dom_wait::DomConfig;
//!
//! let config = DomConfig::from_json(r#"{ "default_timeout_ms": 1000 }"#).unwrap();
//! assert_eq!(config.default_timeout(), Duration::from_secs(1));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default wait timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

// ============================================================================
// DomConfig
// ============================================================================

/// Settings shared by every operation on a [`Dom`](crate::Dom).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomConfig {
    /// Timeout for waits that set none, in milliseconds.
    pub default_timeout_ms: u64,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl DomConfig {
    /// Creates a configuration with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Parses and validates a JSON configuration.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the text is not a valid configuration
    /// - [`Error::Config`] if a value is out of range
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl DomConfig {
    /// Sets the default wait timeout.
    #[inline]
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl DomConfig {
    /// Returns the default wait timeout.
    #[inline]
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Checks that every setting is usable.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the default timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.default_timeout_ms == 0 {
            return Err(Error::config(
                "default_timeout_ms must be greater than zero",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = DomConfig::default();
        assert_eq!(config.default_timeout_ms, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_default_timeout() {
        let config = DomConfig::new().with_default_timeout(Duration::from_millis(1500));
        assert_eq!(config.default_timeout_ms, 1500);
        assert_eq!(config.default_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = DomConfig::new().with_default_timeout(Duration::ZERO);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_from_json_missing_fields_use_defaults() {
        let config = DomConfig::from_json("{}").unwrap();
        assert_eq!(config, DomConfig::default());
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            DomConfig::from_json("not json"),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            DomConfig::from_json(r#"{ "default_timeout_ms": 0 }"#),
            Err(Error::Config { .. })
        ));
    }
}
