//! Synthetic DOM event types.
//!
//! Events are built on the local side and handed to the host document for
//! dispatch.
//!
//! # Event Kinds
//!
//! | Kind | Constructor | Bubbles | Cancelable |
//! |------|-------------|---------|------------|
//! | `Mouse` | [`Event::click`] | yes | yes |
//! | `Input` | [`Event::input`] | yes | yes |
//! | `Custom` | [`Event::custom`] | yes | no |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// EventKind
// ============================================================================

/// Interface an event is constructed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventKind {
    /// Generic `Event`.
    Basic,

    /// `MouseEvent` with the pressed button (0 = primary).
    Mouse {
        /// Mouse button index.
        button: u8,
    },

    /// `InputEvent` fired after a value change.
    Input,

    /// `CustomEvent` with an optional payload.
    Custom {
        /// Payload exposed as `event.detail`.
        detail: Option<Value>,
    },
}

// ============================================================================
// Event
// ============================================================================

/// A synthetic event ready for dispatch.
///
/// # Example
///
/// ```
/// use dom_wait::host::{Event, EventKind};
///
/// let click = Event::click();
/// assert_eq!(click.name, "click");
/// assert!(click.bubbles && click.cancelable);
/// assert_eq!(click.kind, EventKind::Mouse { button: 0 });
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type name, e.g. `click`.
    pub name: String,

    /// Interface and interface-specific data.
    pub kind: EventKind,

    /// Whether the event propagates to ancestors.
    pub bubbles: bool,

    /// Whether listeners may cancel the default action.
    pub cancelable: bool,
}

impl Event {
    /// Creates a non-bubbling, non-cancelable basic event.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EventKind::Basic,
            bubbles: false,
            cancelable: false,
        }
    }

    /// Creates a bubbling, cancelable primary-button click.
    #[must_use]
    pub fn click() -> Self {
        Self::mouse("click", 0)
    }

    /// Creates a bubbling, cancelable mouse event for `button`.
    #[must_use]
    pub fn mouse(name: impl Into<String>, button: u8) -> Self {
        Self {
            name: name.into(),
            kind: EventKind::Mouse { button },
            bubbles: true,
            cancelable: true,
        }
    }

    /// Creates a bubbling, cancelable `input` event.
    #[must_use]
    pub fn input() -> Self {
        Self {
            name: "input".to_string(),
            kind: EventKind::Input,
            bubbles: true,
            cancelable: true,
        }
    }

    /// Creates a bubbling custom event without payload.
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EventKind::Custom { detail: None },
            bubbles: true,
            cancelable: false,
        }
    }

    /// Creates a bubbling custom event carrying `detail`.
    #[must_use]
    pub fn custom_with_detail(name: impl Into<String>, detail: Value) -> Self {
        Self {
            name: name.into(),
            kind: EventKind::Custom {
                detail: Some(detail),
            },
            bubbles: true,
            cancelable: false,
        }
    }

    /// Sets whether the event bubbles.
    #[inline]
    #[must_use]
    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    /// Sets whether the event is cancelable.
    #[inline]
    #[must_use]
    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    /// Returns the custom payload, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&Value> {
        match &self.kind {
            EventKind::Custom { detail } => detail.as_ref(),
            _ => None,
        }
    }

    /// Returns the mouse button for mouse events.
    #[must_use]
    pub fn button(&self) -> Option<u8> {
        match self.kind {
            EventKind::Mouse { button } => Some(button),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_click_defaults() {
        let event = Event::click();
        assert_eq!(event.name, "click");
        assert_eq!(event.button(), Some(0));
        assert!(event.bubbles);
        assert!(event.cancelable);
    }

    #[test]
    fn test_input_defaults() {
        let event = Event::input();
        assert_eq!(event.name, "input");
        assert_eq!(event.kind, EventKind::Input);
        assert!(event.bubbles && event.cancelable);
    }

    #[test]
    fn test_custom_detail() {
        let plain = Event::custom("hello");
        assert!(plain.bubbles);
        assert!(plain.detail().is_none());

        let with_detail = Event::custom_with_detail("testing-event", json!("test"));
        assert_eq!(with_detail.detail(), Some(&json!("test")));
    }

    #[test]
    fn test_builders() {
        let event = Event::new("focus").with_bubbles(true).with_cancelable(true);
        assert!(event.bubbles);
        assert!(event.cancelable);
        assert!(event.button().is_none());
    }

    #[test]
    fn test_serialize_kind_tag() {
        let json = serde_json::to_value(Event::click()).unwrap();
        assert_eq!(json["kind"]["type"], "mouse");
        assert_eq!(json["kind"]["button"], 0);
    }
}
