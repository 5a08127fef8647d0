//! Builder pattern for document context configuration.
//!
//! Provides a fluent API for configuring and creating [`Dom`] instances.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use dom_wait::Dom;
//! use dom_wait::host::MemoryDocument;
//!
//! # fn example() -> dom_wait::Result<()> {
//! let dom = Dom::builder()
//!     .document(Arc::new(MemoryDocument::new()))
//!     .default_timeout(Duration::from_secs(2))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::host::Document;

use super::core::Dom;
use super::options::DomConfig;

// ============================================================================
// DomBuilder
// ============================================================================

/// Builder for configuring a [`Dom`] instance.
///
/// Use [`Dom::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct DomBuilder {
    /// Injected host document.
    document: Option<Arc<dyn Document>>,
    /// Context configuration.
    config: DomConfig,
}

impl fmt::Debug for DomBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomBuilder")
            .field("has_document", &self.document.is_some())
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// DomBuilder Implementation
// ============================================================================

impl DomBuilder {
    /// Creates a new builder with no document and default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host document.
    #[inline]
    #[must_use]
    pub fn document(mut self, document: Arc<dyn Document>) -> Self {
        self.document = Some(document);
        self
    }

    /// Sets the timeout for waits that set none.
    #[inline]
    #[must_use]
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_default_timeout(timeout);
        self
    }

    /// Replaces the whole configuration.
    #[inline]
    #[must_use]
    pub fn config(mut self, config: DomConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the context with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no document was set
    /// - [`Error::Config`] if the configuration is invalid
    pub fn build(self) -> Result<Dom> {
        let document = self.validate_document()?;
        self.config.validate()?;

        Ok(Dom::from_parts(document, self.config))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl DomBuilder {
    /// Validates the document configuration.
    fn validate_document(&self) -> Result<Arc<dyn Document>> {
        self.document.clone().ok_or_else(|| {
            Error::config(
                "A document is required. Use .document() to set it.\n\
                 Example: Dom::builder().document(Arc::new(MemoryDocument::new()))",
            )
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::host::MemoryDocument;

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = DomBuilder::new();
        assert!(builder.document.is_none());
        assert_eq!(builder.config, DomConfig::default());
    }

    #[test]
    fn test_build_fails_without_document() {
        let err = DomBuilder::new().build().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("document"));
    }

    #[test]
    fn test_build_fails_with_zero_timeout() {
        let result = DomBuilder::new()
            .document(Arc::new(MemoryDocument::new()))
            .default_timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_default_timeout_applies() {
        let dom = DomBuilder::new()
            .document(Arc::new(MemoryDocument::new()))
            .default_timeout(Duration::from_millis(250))
            .build()
            .unwrap();
        assert_eq!(dom.default_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_config_replaces_settings() {
        let config = DomConfig {
            default_timeout_ms: 42,
        };
        let builder = DomBuilder::new().config(config.clone());
        assert_eq!(builder.config, config);
    }

    #[test]
    fn test_builder_is_clone() {
        let builder = DomBuilder::new().document(Arc::new(MemoryDocument::new()));
        let cloned = builder.clone();
        assert!(cloned.document.is_some());
    }
}
