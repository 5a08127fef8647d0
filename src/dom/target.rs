//! Dispatch targets and their resolution.
//!
//! # Example
//!
//! ```ignore
//! use dom_wait::Target;
//!
//! // Selector (string conversions)
//! dom.click("#submit").await?;
//!
//! // Node handle
//! dom.click(node).await?;
//!
//! // Window
//! dom.event("ready", Target::Window).await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::host::EventTarget;
use crate::identifiers::NodeId;

use super::Dom;

// ============================================================================
// Target Enum
// ============================================================================

/// Where an interaction is dispatched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Target {
    /// First element matching a selector, looked up once.
    Selector(String),

    /// A node handle.
    Direct(NodeId),

    /// The global window object.
    Window,

    /// No target given; resolves to the window.
    #[default]
    Implicit,
}

// ============================================================================
// Conversions
// ============================================================================

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<&String> for Target {
    fn from(selector: &String) -> Self {
        Self::Selector(selector.clone())
    }
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Self::Direct(node)
    }
}

impl From<EventTarget> for Target {
    fn from(target: EventTarget) -> Self {
        match target {
            EventTarget::Window => Self::Window,
            EventTarget::Node(node) => Self::Direct(node),
        }
    }
}

impl<T: Into<Target>> From<Option<T>> for Target {
    fn from(target: Option<T>) -> Self {
        target.map_or(Self::Implicit, Into::into)
    }
}

// ============================================================================
// Dom - Resolution
// ============================================================================

impl Dom {
    /// Resolves a target to a concrete node or the window.
    ///
    /// Selectors are queried once; waiting is the job of
    /// [`wait_for`](Dom::wait_for).
    ///
    /// # Errors
    ///
    /// - [`Error::ElementNotFound`] if a selector is blank or matches nothing
    /// - [`Error::InvalidSelector`] if the host rejects the selector
    /// - [`Error::InvalidTarget`] if a node handle belongs to another document
    pub fn resolve(&self, target: impl Into<Target>) -> Result<EventTarget> {
        let resolved = match target.into() {
            Target::Implicit | Target::Window => EventTarget::Window,
            Target::Selector(selector) => {
                if selector.trim().is_empty() {
                    return Err(Error::element_not_found(selector));
                }
                let node = self
                    .inner
                    .document
                    .query_selector(&selector)?
                    .ok_or_else(|| Error::element_not_found(&selector))?;
                EventTarget::Node(node)
            }
            Target::Direct(node) => {
                if !self.inner.document.contains(node) {
                    return Err(Error::invalid_target(format!(
                        "{node} is not a node of this document"
                    )));
                }
                EventTarget::Node(node)
            }
        };

        debug!(target = %resolved, "Resolved target");
        Ok(resolved)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::host::{Document, MemoryDocument};

    fn fixture() -> (Dom, NodeId) {
        let doc = Arc::new(MemoryDocument::new());
        let button = doc.create_element("button");
        doc.set_attribute(button, "class", "primary").unwrap();
        doc.append_child(doc.body().unwrap(), button).unwrap();
        (Dom::new(doc), button)
    }

    #[test]
    fn test_conversions() {
        let node = NodeId::new(1, 1);
        assert_eq!(Target::from("#a"), Target::Selector("#a".into()));
        assert_eq!(Target::from(node), Target::Direct(node));
        assert_eq!(Target::from(EventTarget::Window), Target::Window);
        assert_eq!(Target::from(None::<NodeId>), Target::Implicit);
        assert_eq!(Target::from(Some("p")), Target::Selector("p".into()));
        assert_eq!(Target::default(), Target::Implicit);
    }

    #[test]
    fn test_resolve_implicit_and_window() {
        let (dom, _) = fixture();
        assert_eq!(dom.resolve(Target::Implicit).unwrap(), EventTarget::Window);
        assert_eq!(dom.resolve(Target::Window).unwrap(), EventTarget::Window);
    }

    #[test]
    fn test_resolve_selector() {
        let (dom, button) = fixture();
        assert_eq!(
            dom.resolve("button.primary").unwrap(),
            EventTarget::Node(button)
        );
    }

    #[test]
    fn test_resolve_missing_selector() {
        let (dom, _) = fixture();
        let err = dom.resolve("#nope").unwrap_err();
        assert!(matches!(err, Error::ElementNotFound { ref selector } if selector == "#nope"));
        assert!(matches!(
            dom.resolve(""),
            Err(Error::ElementNotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_foreign_node() {
        let (dom, _) = fixture();
        let other = MemoryDocument::new();
        let foreign = other.create_element("div");
        assert!(matches!(
            dom.resolve(foreign),
            Err(Error::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(Target::from("p")).unwrap();
        assert_eq!(json["kind"], "selector");
        assert_eq!(json["value"], "p");
    }
}
