//! Computed style snapshot.

use serde::{Deserialize, Serialize};

// ============================================================================
// ComputedStyle
// ============================================================================

/// The subset of a node's computed style that visibility depends on.
///
/// Values are kept as the strings the style-resolution facility reports,
/// since opacity in particular may appear either as `"0"` or as a number
/// that parses to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedStyle {
    /// CSS `display`.
    pub display: String,
    /// CSS `visibility`.
    pub visibility: String,
    /// CSS `opacity`.
    pub opacity: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: "1".to_string(),
        }
    }
}

impl ComputedStyle {
    /// Creates a style snapshot.
    #[must_use]
    pub fn new(
        display: impl Into<String>,
        visibility: impl Into<String>,
        opacity: impl Into<String>,
    ) -> Self {
        Self {
            display: display.into(),
            visibility: visibility.into(),
            opacity: opacity.into(),
        }
    }

    /// Returns `true` if this style renders the node.
    ///
    /// Hidden when `display` is `none`, `visibility` is `hidden` or
    /// `collapse`, or opacity is `"0"` or numerically zero.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.display != "none"
            && self.visibility != "hidden"
            && self.visibility != "collapse"
            && self.opacity != "0"
            && numeric_opacity(&self.opacity) != Some(0.0)
    }
}

/// Numeric reading of an opacity string.
///
/// Blank reads as zero and unparsable text as no number at all, matching
/// how script engines coerce the value.
fn numeric_opacity(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

// ============================================================================
// Tests
// ============================================================================
