//! Type-safe identifiers for document entities.
//!
//! Newtype wrappers prevent mixing node handles with listener registrations
//! at compile time.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`NodeId`] | Handle to a node owned by a host document |
//! | [`ListenerId`] | Registration of an event listener |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// NodeId
// ============================================================================

/// Opaque handle to a node in a host document.
///
/// The `scope` identifies the document that minted the handle, the `index`
/// its position in that document's storage. Handles are `Copy` and hold no
/// ownership of the node; the host document owns the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    scope: u32,
    index: u32,
}

impl NodeId {
    /// Creates a node handle.
    #[inline]
    #[must_use]
    pub const fn new(scope: u32, index: u32) -> Self {
        Self { scope, index }
    }

    /// Returns the scope of the document that minted this handle.
    #[inline]
    #[must_use]
    pub const fn scope(self) -> u32 {
        self.scope
    }

    /// Returns the index within the owning document.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scope, self.index)
    }
}

// ============================================================================
// ListenerId
// ============================================================================

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a registered event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocates a fresh, process-unique listener ID.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
