//! Visibility oracle.
//!
//! A node is visible when its computed style renders it, its attributes do
//! not hide it, and every ancestor is visible in turn.
//!
//! | Check | Hidden when |
//! |-------|-------------|
//! | Style | `display: none`, `visibility: hidden/collapse`, opacity zero |
//! | `hidden` | attribute present |
//! | `<details>` | no `open` attribute, unless reached from its `<summary>` |

use tracing::warn;

use crate::error::{Error, Result};
use crate::host::ComputedStyle;
use crate::identifiers::NodeId;

use super::Dom;

// ============================================================================
// Dom - Visibility
// ============================================================================

impl Dom {
    /// Returns the computed style of `node`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidNode`] if `node` does not belong to this document.
    pub fn get_computed_style(&self, node: NodeId) -> Result<ComputedStyle> {
        if !self.inner.document.contains(node) {
            warn!(%node, "Node has no owner document");
            return Err(Error::invalid_node(node));
        }
        self.inner.document.computed_style(node)
    }

    /// Returns `true` if `node` and all of its ancestors are visible.
    ///
    /// `previous` is the node the check came from, if any; a `<summary>`
    /// keeps its closed `<details>` parent visible.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidNode`] if a node on the ancestor chain does not
    /// belong to this document.
    pub fn is_element_visible(&self, node: NodeId, previous: Option<NodeId>) -> Result<bool> {
        let mut current = node;
        let mut previous = previous;

        loop {
            if !self.get_computed_style(current)?.is_visible()
                || !self.is_attribute_visible(current, previous)
            {
                return Ok(false);
            }

            match self.inner.document.parent_element(current) {
                Some(parent) => {
                    previous = Some(current);
                    current = parent;
                }
                None => return Ok(true),
            }
        }
    }

    fn is_attribute_visible(&self, node: NodeId, previous: Option<NodeId>) -> bool {
        let document = &self.inner.document;
        if document.has_attribute(node, "hidden") {
            return false;
        }

        let is_details = document
            .node_name(node)
            .is_some_and(|name| name.eq_ignore_ascii_case("DETAILS"));
        let from_summary = previous
            .and_then(|p| document.node_name(p))
            .is_some_and(|name| name.eq_ignore_ascii_case("SUMMARY"));

        if is_details && !from_summary {
            return document.has_attribute(node, "open");
        }
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use proptest::prelude::*;

    use crate::host::{Document, MemoryDocument};

    fn fixture() -> (Arc<MemoryDocument>, Dom) {
        let doc = Arc::new(MemoryDocument::new());
        let dom = Dom::new(Arc::clone(&doc) as Arc<dyn Document>);
        (doc, dom)
    }

    fn attach(doc: &MemoryDocument, parent: NodeId, tag: &str) -> NodeId {
        let node = doc.create_element(tag);
        doc.append_child(parent, node).unwrap();
        node
    }

    #[test]
    fn test_unstyled_root_is_visible() {
        let (doc, dom) = fixture();
        assert!(dom.is_element_visible(doc.document_element(), None).unwrap());
    }

    #[test]
    fn test_detached_unstyled_node_is_visible() {
        let (doc, dom) = fixture();
        let orphan = doc.create_element("div");
        assert!(dom.is_element_visible(orphan, None).unwrap());
    }

    #[test]
    fn test_hidden_attribute() {
        let (doc, dom) = fixture();
        let div = attach(&doc, doc.body().unwrap(), "div");
        doc.set_attribute(div, "hidden", "").unwrap();
        assert!(!dom.is_element_visible(div, None).unwrap());
    }

    #[test]
    fn test_hidden_ancestor_hides_descendant() {
        let (doc, dom) = fixture();
        let outer = attach(&doc, doc.body().unwrap(), "div");
        let inner = attach(&doc, outer, "span");
        assert!(dom.is_element_visible(inner, None).unwrap());

        doc.set_style(outer, "display", "none").unwrap();
        assert!(!dom.is_element_visible(inner, None).unwrap());
    }

    #[test]
    fn test_details_and_summary() {
        let (doc, dom) = fixture();
        let details = attach(&doc, doc.body().unwrap(), "details");
        let summary = attach(&doc, details, "summary");
        let content = attach(&doc, details, "p");

        assert!(!dom.is_element_visible(details, None).unwrap());
        assert!(dom.is_element_visible(summary, None).unwrap());
        assert!(!dom.is_element_visible(content, None).unwrap());

        doc.set_attribute(details, "open", "").unwrap();
        assert!(dom.is_element_visible(details, None).unwrap());
        assert!(dom.is_element_visible(content, None).unwrap());
    }

    #[test]
    fn test_previous_summary_context() {
        let (doc, dom) = fixture();
        let details = attach(&doc, doc.body().unwrap(), "details");
        let summary = attach(&doc, details, "summary");
        assert!(dom.is_element_visible(details, Some(summary)).unwrap());
    }

    #[test]
    fn test_foreign_node_is_invalid() {
        let (_, dom) = fixture();
        let other = MemoryDocument::new();
        let foreign = other.create_element("div");

        assert!(matches!(
            dom.is_element_visible(foreign, None),
            Err(Error::InvalidNode { .. })
        ));
        assert!(matches!(
            dom.get_computed_style(foreign),
            Err(Error::InvalidNode { .. })
        ));
    }

    #[test]
    fn test_deep_chain_terminates() {
        let (doc, dom) = fixture();
        let nodes: Vec<NodeId> = (0..20_000).map(|_| doc.create_element("div")).collect();
        for pair in nodes.windows(2).rev() {
            doc.append_child(pair[0], pair[1]).unwrap();
        }
        doc.append_child(doc.body().unwrap(), nodes[0]).unwrap();
        // Declared on every level so each style lookup stops at its own node.
        for &node in &nodes {
            doc.set_style(node, "visibility", "visible").unwrap();
        }
        let leaf = nodes[nodes.len() - 1];

        assert!(dom.is_element_visible(leaf, None).unwrap());

        doc.set_attribute(nodes[0], "hidden", "").unwrap();
        assert!(!dom.is_element_visible(leaf, None).unwrap());
    }

    #[test]
    fn test_get_computed_style() {
        let (doc, dom) = fixture();
        let span = attach(&doc, doc.body().unwrap(), "span");
        doc.set_style(span, "opacity", "0.0").unwrap();

        let style = dom.get_computed_style(span).unwrap();
        assert_eq!(style.display, "inline");
        assert_eq!(style.opacity, "0.0");
        assert!(!dom.is_element_visible(span, None).unwrap());
    }

    fn style_value() -> impl Strategy<Value = (String, String, String)> {
        (
            prop_oneof![Just("block"), Just("inline"), Just("none")],
            prop_oneof![Just("visible"), Just("hidden"), Just("collapse")],
            prop_oneof![Just("1"), Just("0"), Just("0.0"), Just("0.5"), Just("0.000")],
        )
            .prop_map(|(d, v, o)| (d.to_string(), v.to_string(), o.to_string()))
    }

    proptest! {
        #[test]
        fn prop_style_decides_leaf_visibility((display, visibility, opacity) in style_value()) {
            let (doc, dom) = fixture();
            let div = attach(&doc, doc.body().unwrap(), "div");
            doc.set_style(div, "display", &display).unwrap();
            doc.set_style(div, "visibility", &visibility).unwrap();
            doc.set_style(div, "opacity", &opacity).unwrap();

            let hidden = display == "none"
                || visibility != "visible"
                || opacity.parse::<f64>().unwrap() == 0.0;
            prop_assert_eq!(dom.is_element_visible(div, None).unwrap(), !hidden);
        }
    }
}
