//! Core Dom struct and accessors.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::host::Document;
use crate::identifiers::NodeId;

use super::builder::DomBuilder;
use super::options::DomConfig;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a document context.
pub(crate) struct DomInner {
    /// Injected host document.
    pub document: Arc<dyn Document>,
    /// Context configuration.
    pub config: DomConfig,
}

// ============================================================================
// Dom
// ============================================================================

/// A handle to an injected document.
///
/// Cheap to clone; clones share the same document and configuration.
#[derive(Clone)]
pub struct Dom {
    pub(crate) inner: Arc<DomInner>,
}

impl fmt::Debug for Dom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dom")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Dom {
    /// Creates a context over `document` with the default configuration.
    #[must_use]
    pub fn new(document: Arc<dyn Document>) -> Self {
        Self::from_parts(document, DomConfig::default())
    }

    /// Creates a builder for a configured context.
    #[inline]
    #[must_use]
    pub fn builder() -> DomBuilder {
        DomBuilder::new()
    }

    pub(crate) fn from_parts(document: Arc<dyn Document>, config: DomConfig) -> Self {
        Self {
            inner: Arc::new(DomInner { document, config }),
        }
    }
}

// ============================================================================
// Dom - Accessors
// ============================================================================

impl Dom {
    /// Returns the injected document.
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Arc<dyn Document> {
        &self.inner.document
    }

    /// Returns the context configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DomConfig {
        &self.inner.config
    }

    /// Returns the timeout applied when a wait sets none.
    #[inline]
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        self.inner.config.default_timeout()
    }
}

// ============================================================================
// Dom - Raw Selector Bindings
// ============================================================================

impl Dom {
    /// Returns the first element matching `selector`, without waiting.
    pub fn qs(&self, selector: &str) -> Result<Option<NodeId>> {
        self.inner.document.query_selector(selector)
    }

    /// Returns every element matching `selector`.
    pub fn qsa(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.inner.document.query_selector_all(selector)
    }

    /// Returns the element whose `id` attribute equals `id`.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.inner.document.get_element_by_id(id)
    }
}

// ============================================================================
// Tests
// ============================================================================
