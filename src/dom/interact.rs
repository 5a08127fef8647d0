//! Click, event and typing dispatch.
//!
//! Interactions resolve their target once, dispatch synthetic events through
//! the host, and pace themselves on animation frames so listener side
//! effects can settle before the caller continues.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::host::{Event, EventTarget};

use super::Dom;
use super::target::Target;

// ============================================================================
// EventInit
// ============================================================================

/// An event given by name or as a prepared instance.
///
/// Names become bubbling custom events without payload.
#[derive(Debug, Clone, PartialEq)]
pub enum EventInit {
    /// Event type name.
    Name(String),
    /// Prepared event.
    Event(Event),
}

impl From<&str> for EventInit {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for EventInit {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Event> for EventInit {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

impl EventInit {
    fn into_event(self) -> Result<Event> {
        let event = match self {
            Self::Name(name) => Event::custom(name),
            Self::Event(event) => event,
        };
        if event.name.trim().is_empty() {
            return Err(Error::invalid_event("event name must not be blank"));
        }
        Ok(event)
    }
}

// ============================================================================
// Dom - Interaction
// ============================================================================

impl Dom {
    /// Clicks `target` with the primary button, then waits one frame.
    ///
    /// Returns `false` if a listener cancelled the click.
    ///
    /// # Errors
    ///
    /// Any resolution error from [`resolve`](Dom::resolve).
    pub async fn click(&self, target: impl Into<Target>) -> Result<bool> {
        let target = self.resolve(target)?;
        debug!(%target, "Clicking");

        let not_cancelled = self.inner.document.dispatch_event(target, &Event::click())?;
        self.animation_frame().await;
        Ok(not_cancelled)
    }

    /// Dispatches an event at `target`.
    ///
    /// Returns `false` if a listener cancelled the event.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidEvent`] if the event name is blank
    /// - Any resolution error from [`resolve`](Dom::resolve)
    pub async fn event(
        &self,
        event: impl Into<EventInit>,
        target: impl Into<Target>,
    ) -> Result<bool> {
        let event = event.into().into_event()?;
        let target = self.resolve(target)?;
        debug!(event = %event.name, %target, bubbles = event.bubbles, "Dispatching event");

        self.inner.document.dispatch_event(target, &event)
    }

    /// Types `text` into `target` one character per animation frame.
    ///
    /// Each character is appended to the current value and followed by a
    /// bubbling `input` event.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedElement`] if the target has no value property
    /// - Any resolution error from [`resolve`](Dom::resolve)
    pub async fn type_text(&self, target: impl Into<Target>, text: &str) -> Result<()> {
        let target = self.resolve(target)?;
        let EventTarget::Node(node) = target else {
            return Err(Error::unsupported_element("window"));
        };

        let document = &self.inner.document;
        if document.value(node).is_none() {
            let name = document.node_name(node).unwrap_or_else(|| node.to_string());
            return Err(Error::unsupported_element(name));
        }

        debug!(%node, text_len = text.chars().count(), "Typing text");

        for c in text.chars() {
            self.animation_frame().await;

            let mut value = document.value(node).unwrap_or_default();
            value.push(c);
            document.set_value(node, &value)?;
            document.dispatch_event(target, &Event::input())?;

            trace!(%node, character = %c, "Typed character");
        }

        self.animation_frame().await;
        Ok(())
    }

    /// Waits for the next animation frame.
    ///
    /// Frames only arrive while the document has focus; otherwise the task
    /// yields once to the scheduler instead.
    pub async fn animation_frame(&self) {
        if self.inner.document.has_focus() {
            self.inner.document.animation_frame().await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Suspends for `duration`; a zero duration yields once instead.
pub async fn sleep(duration: Duration) {
    if duration.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Tests
// ============================================================================
