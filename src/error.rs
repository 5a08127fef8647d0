//! Error types for dom-wait.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use dom_wait::{Dom, Result};
//!
//! async fn example(dom: &Dom) -> Result<()> {
//!     let button = dom.wait_for("#submit").await?;
//!     dom.click(button).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Caller input | [`Error::InvalidArgument`], [`Error::InvalidTarget`], [`Error::InvalidEvent`], [`Error::UnsupportedElement`] |
//! | Host | [`Error::InvalidNode`], [`Error::InvalidSelector`] |
//! | Lookup | [`Error::ElementNotFound`], [`Error::Timeout`], [`Error::Cancelled`] |
//! | Configuration | [`Error::Config`] |
//! | External | [`Error::Regex`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::NodeId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Caller-input and host errors are raised immediately; only
/// [`Error::Timeout`] and [`Error::ElementNotFound`] describe a condition
/// that may hold later.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Caller Input Errors
    // ========================================================================
    /// Invalid argument passed to an operation.
    ///
    /// Returned when a wait has neither a probe nor a selector, or when a
    /// text query has nothing to match.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Target is not a node of this document nor the window.
    #[error("Invalid target: {message}")]
    InvalidTarget {
        /// Description of the invalid target.
        message: String,
    },

    /// Element has no settable value property.
    #[error("Unsupported element: {node} has no value property")]
    UnsupportedElement {
        /// The element that was targeted.
        node: String,
    },

    /// Event is neither a name nor an event instance.
    #[error("Invalid event: {message}")]
    InvalidEvent {
        /// Description of the invalid event.
        message: String,
    },

    // ========================================================================
    // Host Errors
    // ========================================================================
    /// Node handle has no associated document.
    ///
    /// Returned by style resolution when the handle was not minted by the
    /// document it is used with.
    #[error("Invalid node: {node} has no owner document")]
    InvalidNode {
        /// The rejected handle.
        node: NodeId,
    },

    /// Selector could not be parsed by the host.
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector {
        /// The selector text.
        selector: String,
        /// Why the host rejected it.
        message: String,
    },

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// Selector matched no element.
    #[error("Element not found: selector={selector}")]
    ElementNotFound {
        /// Selector used for the lookup.
        selector: String,
    },

    /// Wait deadline elapsed without a satisfying match.
    #[error(
        "{} was not found after {timeout_ms}ms ({})",
        timeout_subject(.visible),
        selector_label(.selector)
    )]
    Timeout {
        /// Whether a visible match was required.
        visible: bool,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
        /// Selector being waited for, if any.
        selector: Option<String>,
    },

    /// Wait was cancelled by the caller.
    #[error("Wait cancelled ({})", selector_label(.selector))]
    Cancelled {
        /// Selector being waited for, if any.
        selector: Option<String>,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when context configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// Regular expression failed to compile.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn timeout_subject(visible: &bool) -> &'static str {
    if *visible {
        "A visible selector"
    } else {
        "A selector"
    }
}

fn selector_label(selector: &Option<String>) -> &str {
    selector.as_deref().unwrap_or("probe")
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid target error.
    #[inline]
    pub fn invalid_target(message: impl Into<String>) -> Self {
        Self::InvalidTarget {
            message: message.into(),
        }
    }

    /// Creates an unsupported element error.
    #[inline]
    pub fn unsupported_element(node: impl Into<String>) -> Self {
        Self::UnsupportedElement { node: node.into() }
    }

    /// Creates an invalid event error.
    #[inline]
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            message: message.into(),
        }
    }

    /// Creates an invalid node error.
    #[inline]
    pub fn invalid_node(node: NodeId) -> Self {
        Self::InvalidNode { node }
    }

    /// Creates an invalid selector error.
    #[inline]
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Creates an element not found error.
    #[inline]
    pub fn element_not_found(selector: impl Into<String>) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(visible: bool, timeout_ms: u64, selector: Option<String>) -> Self {
        Self::Timeout {
            visible,
            timeout_ms,
            selector,
        }
    }

    /// Creates a cancellation error.
    #[inline]
    pub fn cancelled(selector: Option<String>) -> Self {
        Self::Cancelled { selector }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if the wait was cancelled by the caller.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns `true` if the error stems from malformed caller input.
    #[inline]
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::InvalidTarget { .. }
                | Self::UnsupportedElement { .. }
                | Self::InvalidEvent { .. }
                | Self::InvalidNode { .. }
                | Self::InvalidSelector { .. }
                | Self::Regex(_)
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed when the caller invokes the operation
    /// again; the library itself never retries.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::ElementNotFound { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_visible() {
        let err = Error::timeout(true, 5000, Some("#foo".into()));
        assert_eq!(
            err.to_string(),
            "A visible selector was not found after 5000ms (#foo)"
        );
    }

    #[test]
    fn test_timeout_display_any() {
        let err = Error::timeout(false, 1000, None);
        assert_eq!(err.to_string(), "A selector was not found after 1000ms (probe)");
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = Error::invalid_argument("probe or selector required");
        assert_eq!(
            err.to_string(),
            "Invalid argument: probe or selector required"
        );
    }

    #[test]
    fn test_invalid_node_display() {
        let err = Error::invalid_node(NodeId::new(3, 7));
        assert_eq!(err.to_string(), "Invalid node: 3:7 has no owner document");
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::timeout(true, 50, None);
        let other_err = Error::element_not_found("#x");

        assert!(timeout_err.is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_is_caller_error() {
        assert!(Error::invalid_event("blank").is_caller_error());
        assert!(Error::unsupported_element("DIV").is_caller_error());
        assert!(!Error::timeout(true, 50, None).is_caller_error());
        assert!(!Error::cancelled(None).is_caller_error());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::timeout(false, 10, None).is_recoverable());
        assert!(Error::element_not_found("p").is_recoverable());
        assert!(!Error::config("bad").is_recoverable());
    }

    #[test]
    fn test_from_regex_error() {
        let regex_err = regex::Regex::new("(").unwrap_err();
        let err: Error = regex_err.into();
        assert!(matches!(err, Error::Regex(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
