//! Poll-wait engine.
//!
//! A wait runs a probe every [`POLL_INTERVAL`] until it yields a node that
//! satisfies the visibility requirement, the deadline elapses, or the
//! caller cancels. Each wait owns its interval and deadline; concurrent
//! waits on one document do not interact.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//!
//! use dom_wait::WaitOptions;
//!
//! // Visible match, default timeout
//! let node = dom.wait_for("#submit").await?;
//!
//! // Any match within one second
//! let options = WaitOptions::any()
//!     .with_selector(".spinner")
//!     .with_timeout(Duration::from_secs(1));
//! let node = dom.wait_for_with(options).await?;
//!
//! // Custom probe
//! let node = dom
//!     .wait_for_probe(WaitOptions::new(), || Ok(dom.by_id("late")))
//!     .await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::NodeId;

use super::Dom;

// ============================================================================
// Constants
// ============================================================================

/// Fixed delay between probe invocations.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// WaitOptions
// ============================================================================

/// Options for a single wait.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Require the found node to be visible.
    pub visible: bool,

    /// Deadline measured from entry; `None` uses the context default.
    pub timeout: Option<Duration>,

    /// Selector to query, or a label for probe waits.
    pub selector: Option<String>,

    /// Aborts the wait when cancelled.
    pub cancel: Option<CancellationToken>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl WaitOptions {
    /// Creates options requiring a visible match.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            visible: true,
            timeout: None,
            selector: None,
            cancel: None,
        }
    }

    /// Creates options accepting any match, visible or not.
    #[inline]
    #[must_use]
    pub const fn any() -> Self {
        Self {
            visible: false,
            timeout: None,
            selector: None,
            cancel: None,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl WaitOptions {
    /// Sets the deadline.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets whether the match must be visible.
    #[inline]
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets the selector.
    #[inline]
    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Attaches a cancellation token.
    #[inline]
    #[must_use]
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

// ============================================================================
// Dom - Waiting
// ============================================================================

impl Dom {
    /// Waits for a visible element matching `selector`.
    ///
    /// # Errors
    ///
    /// See [`wait_for_with`](Dom::wait_for_with).
    pub async fn wait_for(&self, selector: &str) -> Result<NodeId> {
        self.wait_for_with(WaitOptions::new().with_selector(selector))
            .await
    }

    /// Waits for an element matching `options.selector`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if no selector is set
    /// - [`Error::InvalidSelector`] if the host rejects the selector
    /// - [`Error::Timeout`] if nothing matched before the deadline
    /// - [`Error::Cancelled`] if the token was cancelled
    pub async fn wait_for_with(&self, options: WaitOptions) -> Result<NodeId> {
        let selector = options
            .selector
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| Error::invalid_argument("probe or selector required"))?;

        let document = Arc::clone(&self.inner.document);
        self.wait_for_probe(options, move || document.query_selector(&selector))
            .await
    }

    /// Waits until `probe` yields an acceptable node.
    ///
    /// The probe runs once per [`POLL_INTERVAL`], starting one interval
    /// after entry. A probe error aborts the wait.
    ///
    /// # Errors
    ///
    /// - Any error returned by `probe`
    /// - [`Error::InvalidNode`] if the probe yields a foreign node and
    ///   visibility is required
    /// - [`Error::Timeout`] if nothing matched before the deadline
    /// - [`Error::Cancelled`] if the token was cancelled
    pub async fn wait_for_probe<P>(&self, options: WaitOptions, mut probe: P) -> Result<NodeId>
    where
        P: FnMut() -> Result<Option<NodeId>> + Send,
    {
        let WaitOptions {
            visible,
            timeout,
            selector,
            cancel,
        } = options;
        let timeout = timeout.unwrap_or_else(|| self.default_timeout());
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);

        debug!(
            selector = selector.as_deref().unwrap_or("probe"),
            timeout_ms, visible, "Waiting for element"
        );

        let start = Instant::now();
        let deadline = sleep_until(start.checked_add(timeout).unwrap_or_else(far_future));
        tokio::pin!(deadline);

        let mut ticks = interval_at(start + POLL_INTERVAL, POLL_INTERVAL);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // A token nobody holds never fires.
        let cancel = cancel.unwrap_or_else(CancellationToken::new);
        let mut attempt: u64 = 0;

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    debug!(selector = selector.as_deref().unwrap_or("probe"), attempt, "Wait cancelled");
                    return Err(Error::cancelled(selector));
                }

                _ = ticks.tick() => {
                    attempt += 1;
                    trace!(attempt, "Polling");

                    let Some(node) = probe()? else {
                        continue;
                    };
                    if visible && !self.is_element_visible(node, None)? {
                        trace!(%node, "Match not visible yet");
                        continue;
                    }

                    let elapsed_ms =
                        u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    debug!(%node, attempt, elapsed_ms, "Element found");
                    return Ok(node);
                }

                () = &mut deadline => {
                    warn!(
                        selector = selector.as_deref().unwrap_or("probe"),
                        timeout_ms, visible, attempt, "Wait timed out"
                    );
                    return Err(Error::timeout(visible, timeout_ms, selector));
                }
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Deadline for timeouts too large to represent.
fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86_400 * 365 * 30)
}

// ============================================================================
// Tests
// ============================================================================
