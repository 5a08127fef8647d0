//! dom-wait - Polling waits, text location and synthetic input for DOM tests.
//!
//! This library drives a document tree the way a UI test would: wait for an
//! element to appear (and become visible), find the element holding some
//! text, then click it, fire events at it or type into it.
//!
//! # Architecture
//!
//! The document is a capability injected by the caller:
//!
//! - **Host**: implements [`host::Document`] (tree, styles, events, frames)
//! - **Core**: a [`Dom`] context wrapping one document; every operation is a
//!   method on it
//!
//! Key design principles:
//!
//! - No global document; independent fixtures can run side by side
//! - Waits poll at a fixed 50ms interval under a deadline (default 5000ms)
//! - Caller mistakes fail immediately; only missing elements time out
//! - [`host::MemoryDocument`] is a complete in-process host for test suites
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use dom_wait::host::{Document, MemoryDocument};
//! use dom_wait::{Dom, Result, TextQuery};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let doc = Arc::new(MemoryDocument::new());
//!     let input = doc.create_element("input");
//!     let label = doc.create_element("label");
//!     doc.set_text_content(label, "Name")?;
//!     doc.append_children(doc.body().expect("body"), [label, input])?;
//!
//!     let dom = Dom::builder()
//!         .document(doc.clone())
//!         .default_timeout(Duration::from_secs(1))
//!         .build()?;
//!
//!     let found = dom.wait_for_text(TextQuery::text("Name")).await?;
//!     assert_eq!(found, label);
//!
//!     dom.type_text("input", "hi").await?;
//!     assert_eq!(doc.value(input).as_deref(), Some("hi"));
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`dom`] | Document context: waits, text search, interaction |
//! | [`host`] | Host document trait and the in-memory implementation |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |

// ============================================================================
// Modules
// ============================================================================

/// Document context and its operations.
///
/// - [`Dom`] - Injected document context
/// - [`WaitOptions`] - Poll-wait settings
/// - [`TextQuery`] - Text locator query
pub mod dom;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Host document boundary.
///
/// Implement [`host::Document`] to drive a real document, or use
/// [`host::MemoryDocument`] in tests.
pub mod host;

/// Type-safe identifiers for document entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

// ============================================================================
// Re-exports
// ============================================================================

// Context types
pub use dom::{
    DEFAULT_TIMEOUT_MS, Dom, DomBuilder, DomConfig, EventInit, MAX_TRAVERSAL_STEPS,
    POLL_INTERVAL, Target, TextQuery, WaitOptions, sleep,
};

// Error types
pub use error::{Error, Result};

// Host types
pub use host::{ComputedStyle, Document, Event, EventKind, EventTarget, MemoryDocument};

// Identifier types
pub use identifiers::{ListenerId, NodeId};

// Cancellation
pub use tokio_util::sync::CancellationToken;
