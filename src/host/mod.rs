//! Host document boundary.
//!
//! The document tree, style resolution and event delivery belong to the
//! host environment. This module defines the capability the core consumes,
//! so every [`Dom`](crate::Dom) is bound to an explicitly injected document
//! rather than a global one.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Document`] | Host capability trait |
//! | [`EventTarget`] | Resolved dispatch target (window or node) |
//! | [`ComputedStyle`] | Style snapshot used for visibility |
//! | [`Event`] | Synthetic event |
//! | [`MemoryDocument`] | In-process document for test suites |

// ============================================================================
// Submodules
// ============================================================================

/// Synthetic event types.
pub mod event;

/// In-memory document implementation.
pub mod memory;

/// Selector parsing and matching for [`MemoryDocument`].
pub mod selector;

/// Computed style snapshot.
pub mod style;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

// ============================================================================
// Re-exports
// ============================================================================

pub use crate::identifiers::NodeId;
pub use event::{Event, EventKind};
pub use memory::{EventContext, Listener, MemoryDocument};
pub use style::ComputedStyle;

// ============================================================================
// Constants
// ============================================================================

/// Duration of one animation frame at 60Hz.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

// ============================================================================
// EventTarget
// ============================================================================

/// A concrete dispatch target: the window-like global or a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The global window object.
    Window,
    /// A node of the document.
    Node(NodeId),
}

impl EventTarget {
    /// Returns the node handle, or `None` for the window.
    #[inline]
    #[must_use]
    pub fn node(self) -> Option<NodeId> {
        match self {
            Self::Window => None,
            Self::Node(node) => Some(node),
        }
    }

    /// Returns `true` for the window target.
    #[inline]
    #[must_use]
    pub fn is_window(self) -> bool {
        matches!(self, Self::Window)
    }
}

impl From<NodeId> for EventTarget {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl fmt::Display for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Window => f.write_str("window"),
            Self::Node(node) => write!(f, "node {node}"),
        }
    }
}

// ============================================================================
// Document
// ============================================================================

/// Capability exposed by a host document.
///
/// Node accessors return `None`/empty for handles the document does not
/// own; only [`computed_style`](Document::computed_style) treats such a
/// handle as an error, since visibility cannot be decided without it.
#[async_trait]
pub trait Document: Send + Sync {
    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// Returns the first element matching `selector` in document order.
    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>>;

    /// Returns every element matching `selector` in document order.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>>;

    /// Returns the first element whose `id` attribute equals `id`.
    fn get_element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Returns the `<body>` element.
    fn body(&self) -> Option<NodeId>;

    /// Returns `true` if `node` was minted by this document.
    fn contains(&self, node: NodeId) -> bool;

    // ------------------------------------------------------------------------
    // Tree
    // ------------------------------------------------------------------------

    /// Returns the upper-case node name (`DIV`, `#text`, ...).
    fn node_name(&self, node: NodeId) -> Option<String>;

    /// Returns the parent element.
    fn parent_element(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the element children in order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Returns the next sibling node of any kind.
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the concatenated text of the node and its descendants.
    fn text_content(&self, node: NodeId) -> Option<String>;

    /// Returns an attribute value.
    fn get_attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Returns `true` if the attribute is present.
    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.get_attribute(node, name).is_some()
    }

    // ------------------------------------------------------------------------
    // Style
    // ------------------------------------------------------------------------

    /// Resolves the computed style of `node`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidNode`](crate::Error::InvalidNode) if the handle has
    /// no associated document.
    fn computed_style(&self, node: NodeId) -> Result<ComputedStyle>;

    // ------------------------------------------------------------------------
    // Form Values
    // ------------------------------------------------------------------------

    /// Returns the value property, or `None` if the node has none.
    fn value(&self, node: NodeId) -> Option<String>;

    /// Writes the value property.
    fn set_value(&self, node: NodeId, value: &str) -> Result<()>;

    // ------------------------------------------------------------------------
    // Events & Scheduling
    // ------------------------------------------------------------------------

    /// Dispatches `event` at `target`.
    ///
    /// Returns `false` if a listener cancelled the event.
    fn dispatch_event(&self, target: EventTarget, event: &Event) -> Result<bool>;

    /// Returns `true` if the document currently has input focus.
    fn has_focus(&self) -> bool;

    /// Resolves on the host's next animation frame.
    async fn animation_frame(&self) {
        tokio::time::sleep(FRAME_INTERVAL).await;
    }
}

// ============================================================================
// Tests
// ============================================================================
