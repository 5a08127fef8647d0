//! Document context and the operations bound to it.
//!
//! A [`Dom`] wraps one injected [`Document`](crate::host::Document). Every
//! wait, lookup and interaction is a method on it, so independent fixtures
//! can be driven side by side.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | Dom struct, accessors, raw selector bindings |
//! | `builder` | Fluent construction of a [`Dom`] |
//! | `options` | Serializable [`DomConfig`] |
//! | `target` | [`Target`] variants and resolution |
//! | `visibility` | Visibility oracle |
//! | `wait` | Poll-wait engine |
//! | `text` | Text locator |
//! | `interact` | Click, event and typing dispatch |
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use dom_wait::Dom;
//! use dom_wait::host::{Document, MemoryDocument};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> dom_wait::Result<()> {
//! let doc = Arc::new(MemoryDocument::new());
//! let button = doc.create_element("button");
//! doc.set_attribute(button, "id", "submit")?;
//! doc.append_child(doc.body().expect("body"), button)?;
//!
//! let dom = Dom::new(doc);
//! let found = dom.wait_for("#submit").await?;
//! dom.click(found).await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod builder;
mod core;
mod interact;
mod options;
mod target;
mod text;
mod visibility;
mod wait;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::DomBuilder;
pub use core::Dom;
pub use interact::{EventInit, sleep};
pub use options::{DEFAULT_TIMEOUT_MS, DomConfig};
pub use target::Target;
pub use text::{MAX_TRAVERSAL_STEPS, TextQuery};
pub use wait::{POLL_INTERVAL, WaitOptions};
