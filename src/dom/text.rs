//! Text locator.
//!
//! Finds the element holding a piece of text, polling like
//! [`wait_for`](crate::Dom::wait_for) until it shows up.
//!
//! Each pass flattens the subtree with a work stack (children are pushed
//! and recorded as they are discovered) and then scans the record from the
//! end, so deeper nodes are tried first. Per node, in order:
//!
//! | Step | Returns |
//! |------|---------|
//! | Regex matches the text | the node |
//! | Text contains the query | the node |
//! | `multiple_tags`: query spelled one char per sibling | the parent |
//!
//! The first hit in scan order wins; it is not a best match.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::host::Document;
use crate::identifiers::NodeId;

use super::Dom;
use super::wait::WaitOptions;

// ============================================================================
// Constants
// ============================================================================

/// Upper bound on nodes popped while flattening one subtree.
pub const MAX_TRAVERSAL_STEPS: usize = 10_000;

// ============================================================================
// TextQuery
// ============================================================================

/// What text to look for and where.
///
/// # Example
///
/// ```ignore
/// use dom_wait::TextQuery;
///
/// let node = dom.wait_for_text(TextQuery::text("quux").multiple_tags()).await?;
/// let node = dom.wait_for_text(TextQuery::regex(r"ba[rz]")?.within(panel)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TextQuery {
    /// Subtree to search; `None` searches the body.
    pub root: Option<NodeId>,

    /// Plain text to find.
    pub text: Option<String>,

    /// Pattern tested against each node's text.
    pub regex: Option<Regex>,

    /// Also match text spelled out one character per sibling element.
    pub multiple_tags: bool,

    /// Deadline; `None` uses the context default.
    pub timeout: Option<Duration>,

    /// Require the found node to be visible.
    pub visible: bool,
}

impl TextQuery {
    /// Creates a query for plain text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::empty()
        }
    }

    /// Creates a query for a regular expression.
    ///
    /// # Errors
    ///
    /// [`Error::Regex`] if the pattern does not compile.
    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(Self::from_regex(Regex::new(pattern)?))
    }

    /// Creates a query for a compiled regular expression.
    #[must_use]
    pub fn from_regex(regex: Regex) -> Self {
        Self {
            regex: Some(regex),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            root: None,
            text: None,
            regex: None,
            multiple_tags: false,
            timeout: None,
            visible: true,
        }
    }

    /// Restricts the search to the subtree under `root`.
    #[inline]
    #[must_use]
    pub fn within(mut self, root: NodeId) -> Self {
        self.root = Some(root);
        self
    }

    /// Enables matching across single-character sibling elements.
    #[inline]
    #[must_use]
    pub fn multiple_tags(mut self) -> Self {
        self.multiple_tags = true;
        self
    }

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

    fn validate(&self) -> Result<()> {
        if self.text.as_deref().is_some_and(str::is_empty) {
            return Err(Error::invalid_argument("text query must not be empty"));
        }
        if self.text.is_none() && self.regex.is_none() {
            return Err(Error::invalid_argument("text or regex required"));
        }
        Ok(())
    }

    /// Label used in wait diagnostics.
    fn label(&self) -> String {
        match (&self.text, &self.regex) {
            (Some(text), _) => format!("text={text:?}"),
            (None, Some(regex)) => format!("regex=/{}/", regex.as_str()),
            (None, None) => "text".to_string(),
        }
    }
}

// ============================================================================
// Dom - Text Search
// ============================================================================

impl Dom {
    /// Waits for an element whose text matches `query`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if the query has nothing to match or the
    ///   document has no body
    /// - [`Error::InvalidNode`] if the root belongs to another document
    /// - [`Error::Timeout`] if nothing matched before the deadline
    pub async fn wait_for_text(&self, query: TextQuery) -> Result<NodeId> {
        query.validate()?;
        let root = self.text_root(&query)?;

        debug!(query = %query.label(), %root, multiple_tags = query.multiple_tags, "Waiting for text");

        let options = WaitOptions {
            visible: query.visible,
            timeout: query.timeout,
            selector: Some(query.label()),
            cancel: None,
        };
        let document = Arc::clone(&self.inner.document);
        self.wait_for_probe(options, move || Ok(locate(&*document, root, &query)))
            .await
    }

    /// Waits for a visible element under the body containing `text`.
    ///
    /// # Errors
    ///
    /// See [`wait_for_text`](Dom::wait_for_text).
    pub async fn wait_for_text_str(&self, text: &str) -> Result<NodeId> {
        self.wait_for_text(TextQuery::text(text)).await
    }

    /// Runs one search pass without waiting or checking visibility.
    ///
    /// # Errors
    ///
    /// Same argument errors as [`wait_for_text`](Dom::wait_for_text).
    pub fn find_text(&self, query: &TextQuery) -> Result<Option<NodeId>> {
        query.validate()?;
        let root = self.text_root(query)?;
        Ok(locate(&*self.inner.document, root, query))
    }

    fn text_root(&self, query: &TextQuery) -> Result<NodeId> {
        let root = match query.root {
            Some(root) => root,
            None => self
                .inner
                .document
                .body()
                .ok_or_else(|| Error::invalid_argument("document has no body"))?,
        };
        if !self.inner.document.contains(root) {
            return Err(Error::invalid_node(root));
        }
        Ok(root)
    }
}

// ============================================================================
// Search
// ============================================================================

fn locate(document: &dyn Document, root: NodeId, query: &TextQuery) -> Option<NodeId> {
    let elements = flatten(document, root);
    scan(document, &elements, query)
}

/// Element descendants of `root`, recorded in stack discovery order.
fn flatten(document: &dyn Document, root: NodeId) -> Vec<NodeId> {
    let mut elements = Vec::new();
    let mut stack = vec![root];
    let mut steps = 0;

    while steps < MAX_TRAVERSAL_STEPS
        && let Some(current) = stack.pop()
    {
        steps += 1;
        let children = document.children(current);
        stack.extend_from_slice(&children);
        elements.extend(children);
    }

    elements
}

fn scan(document: &dyn Document, elements: &[NodeId], query: &TextQuery) -> Option<NodeId> {
    let chars: Vec<char> = query
        .text
        .as_deref()
        .map(|t| t.chars().collect())
        .unwrap_or_default();
    let mut candidate = None;

    for &node in elements.iter().rev() {
        let Some(content) = document.text_content(node).filter(|t| !t.is_empty()) else {
            continue;
        };

        if let Some(regex) = &query.regex
            && regex.is_match(&content)
        {
            return Some(node);
        }

        let Some(text) = query.text.as_deref() else {
            continue;
        };
        if content.contains(text) {
            return Some(node);
        }
        if !query.multiple_tags || content.chars().next() != chars.first().copied() {
            continue;
        }

        let mut sibling = document.next_sibling(node);
        let mut position = 1;
        while position < chars.len() {
            let matched = sibling
                .and_then(|s| document.text_content(s))
                .is_some_and(|t| is_single_char(&t, chars[position]));

            if matched {
                sibling = sibling.and_then(|s| document.next_sibling(s));
                position += 1;
                candidate = document.parent_element(node);
            } else {
                if position == chars.len() - 1 {
                    return document.parent_element(node);
                }
                candidate = None;
                break;
            }
        }
    }

    candidate
}

fn is_single_char(text: &str, expected: char) -> bool {
    let mut chars = text.chars();
    chars.next() == Some(expected) && chars.next().is_none()
}

// ============================================================================
// Tests
// ============================================================================
