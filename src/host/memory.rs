//! In-memory host document.
//!
//! [`MemoryDocument`] is a complete [`Document`] for test suites that drive
//! the core without a browser. Trees are built through the API (there is no
//! HTML parser), styles come from `style` attributes, and events are
//! delivered to registered listeners with bubbling.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use dom_wait::host::{Document, MemoryDocument};
//!
//! # fn main() -> dom_wait::Result<()> {
//! let doc = Arc::new(MemoryDocument::new());
//! let body = doc.body().expect("fresh documents have a body");
//!
//! let p = doc.create_element("p");
//! doc.set_text_content(p, "testing")?;
//! doc.append_child(body, p)?;
//!
//! assert_eq!(doc.query_selector("p")?, Some(p));
//! assert_eq!(doc.text_content(body).as_deref(), Some("testing"));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::{ListenerId, NodeId};

use super::selector::{ElementTree, SelectorList};
use super::{ComputedStyle, Document, Event, EventTarget, FRAME_INTERVAL};

// ============================================================================
// Constants
// ============================================================================

/// Elements rendered as blocks when no `display` is declared.
const BLOCK_ELEMENTS: &[&str] = &[
    "ADDRESS", "ARTICLE", "ASIDE", "BLOCKQUOTE", "BODY", "DETAILS", "DIALOG", "DIV", "DL",
    "FIELDSET", "FIGURE", "FOOTER", "FORM", "H1", "H2", "H3", "H4", "H5", "H6", "HEADER", "HR",
    "HTML", "MAIN", "NAV", "OL", "P", "PRE", "SECTION", "SUMMARY", "TABLE", "UL",
];

/// Elements never rendered.
const NON_RENDERED_ELEMENTS: &[&str] = &["HEAD", "SCRIPT", "STYLE", "TEMPLATE", "TITLE"];

/// Elements carrying a settable value property.
const VALUE_ELEMENTS: &[&str] = &["INPUT", "SELECT", "TEXTAREA"];

static NEXT_SCOPE: AtomicU32 = AtomicU32::new(1);

// ============================================================================
// Listener Types
// ============================================================================

/// Event listener callback.
pub type Listener = Arc<dyn Fn(&EventContext<'_>) + Send + Sync>;

struct ListenerEntry {
    id: ListenerId,
    name: String,
    listener: Listener,
}

#[derive(Default)]
struct DispatchState {
    default_prevented: AtomicBool,
    propagation_stopped: AtomicBool,
}

/// View of an event as seen by one listener invocation.
pub struct EventContext<'a> {
    event: &'a Event,
    target: EventTarget,
    current_target: EventTarget,
    state: &'a DispatchState,
}

impl EventContext<'_> {
    /// Returns the event being dispatched.
    #[inline]
    #[must_use]
    pub fn event(&self) -> &Event {
        self.event
    }

    /// Returns the target the event was dispatched at.
    #[inline]
    #[must_use]
    pub fn target(&self) -> EventTarget {
        self.target
    }

    /// Returns the target whose listener is running.
    #[inline]
    #[must_use]
    pub fn current_target(&self) -> EventTarget {
        self.current_target
    }

    /// Cancels the event if it is cancelable.
    pub fn prevent_default(&self) {
        if self.event.cancelable {
            self.state.default_prevented.store(true, Ordering::SeqCst);
        }
    }

    /// Returns `true` if a listener cancelled the event.
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.state.default_prevented.load(Ordering::SeqCst)
    }

    /// Stops delivery to further targets once the current one is done.
    pub fn stop_propagation(&self) {
        self.state.propagation_stopped.store(true, Ordering::SeqCst);
    }
}

impl fmt::Debug for EventContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventContext")
            .field("event", &self.event.name)
            .field("target", &self.target)
            .field("current_target", &self.current_target)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tree Storage
// ============================================================================

enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        value: Option<String>,
    },
    Text(String),
}

struct NodeData {
    kind: NodeKind,
    parent: Option<u32>,
    children: Vec<u32>,
}

struct Tree {
    nodes: Vec<NodeData>,
    root: u32,
    body: u32,
}

impl Tree {
    fn node(&self, index: u32) -> Option<&NodeData> {
        self.nodes.get(index as usize)
    }

    fn node_mut(&mut self, index: u32) -> Option<&mut NodeData> {
        self.nodes.get_mut(index as usize)
    }

    /// Appends a node to the arena.
    ///
    /// # Panics
    ///
    /// Panics once the arena holds more than `u32::MAX` nodes.
    fn push(&mut self, kind: NodeKind) -> u32 {
        let index = u32::try_from(self.nodes.len())
            .unwrap_or_else(|_| panic!("memory document exceeded {} nodes", u32::MAX));
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        index
    }

    fn is_element(&self, index: u32) -> bool {
        matches!(
            self.node(index).map(|n| &n.kind),
            Some(NodeKind::Element { .. })
        )
    }

    fn element_children(&self, index: u32) -> Vec<u32> {
        self.node(index)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|c| self.is_element(*c))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn sibling(&self, index: u32, offset: isize) -> Option<u32> {
        let parent = self.node(index)?.parent?;
        let siblings = &self.node(parent)?.children;
        let position = siblings.iter().position(|c| *c == index)?;
        let target = position.checked_add_signed(offset)?;
        siblings.get(target).copied()
    }

    fn element_sibling(&self, index: u32, step: isize) -> Option<u32> {
        let mut cursor = self.sibling(index, step);
        while let Some(candidate) = cursor {
            if self.is_element(candidate) {
                return Some(candidate);
            }
            cursor = self.sibling(candidate, step);
        }
        None
    }

    fn is_connected(&self, index: u32) -> bool {
        let mut cursor = Some(index);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.node(current).and_then(|n| n.parent);
        }
        false
    }

    fn is_inclusive_ancestor(&self, ancestor: u32, node: u32) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node(current).and_then(|n| n.parent);
        }
        false
    }

    /// Connected elements in document order.
    fn elements_in_order(&self) -> Vec<u32> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.element_children(current).into_iter().rev());
        }
        out
    }

    fn detach(&mut self, index: u32) {
        let Some(parent) = self.node(index).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|c| *c != index);
        }
        if let Some(node) = self.node_mut(index) {
            node.parent = None;
        }
    }

    /// Concatenated text of `index` and its descendants in document order.
    fn text_of(&self, index: u32, out: &mut String) {
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            match &node.kind {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Element { .. } => stack.extend(node.children.iter().rev()),
            }
        }
    }

    fn declared_style(&self, index: u32, property: &str) -> Option<String> {
        let style = self.attribute(index, "style")?;
        parse_declarations(style)
            .into_iter()
            .rev()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    /// Nearest declared `visibility` on the parent chain, `inherit` skipped.
    fn computed_visibility(&self, index: u32) -> String {
        let mut cursor = Some(index);
        while let Some(current) = cursor {
            match self.declared_style(current, "visibility") {
                Some(value) if value != "inherit" => return value,
                _ => cursor = self.node(current).and_then(|n| n.parent),
            }
        }
        "visible".to_string()
    }
}

impl ElementTree for Tree {
    type Handle = u32;

    fn tag_name(&self, node: u32) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    fn attribute(&self, node: u32, name: &str) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    fn parent_element(&self, node: u32) -> Option<u32> {
        self.node(node)?.parent.filter(|p| self.is_element(*p))
    }

    fn previous_element_sibling(&self, node: u32) -> Option<u32> {
        self.element_sibling(node, -1)
    }

    fn next_element_sibling(&self, node: u32) -> Option<u32> {
        self.element_sibling(node, 1)
    }
}

// ============================================================================
// MemoryDocument
// ============================================================================

/// A document tree held in process memory.
///
/// Thread-safe; listeners run without internal locks held, so they may
/// mutate the document they observe.
///
/// Nodes live in an append-only arena addressed by `u32` indices. Detached
/// and replaced nodes keep their slot, so a fixture that rewrites text on
/// every tick grows the arena for as long as the document lives.
pub struct MemoryDocument {
    /// Scope stamped into every minted [`NodeId`].
    scope: u32,

    /// Node storage.
    tree: RwLock<Tree>,

    /// Listeners by target, in registration order.
    listeners: Mutex<FxHashMap<EventTarget, Vec<ListenerEntry>>>,

    /// Whether the document reports input focus.
    focused: AtomicBool,

    /// Animation frames served so far.
    frames: AtomicU64,
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("scope", &self.scope)
            .field("nodes", &self.tree.read().nodes.len())
            .field("focused", &self.focused.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MemoryDocument - Constructor
// ============================================================================

impl MemoryDocument {
    /// Creates `<html><head></head><body></body></html>` without focus.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Tree {
            nodes: Vec::new(),
            root: 0,
            body: 0,
        };
        let root = tree.push(element_kind("html"));
        let head = tree.push(element_kind("head"));
        let body = tree.push(element_kind("body"));
        for child in [head, body] {
            if let Some(node) = tree.node_mut(child) {
                node.parent = Some(root);
            }
        }
        if let Some(node) = tree.node_mut(root) {
            node.children = vec![head, body];
        }
        tree.root = root;
        tree.body = body;

        Self {
            scope: NEXT_SCOPE.fetch_add(1, Ordering::Relaxed),
            tree: RwLock::new(tree),
            listeners: Mutex::new(FxHashMap::default()),
            focused: AtomicBool::new(false),
            frames: AtomicU64::new(0),
        }
    }
}

// ============================================================================
// MemoryDocument - Accessors
// ============================================================================

impl MemoryDocument {
    /// Returns the scope stamped into this document's handles.
    #[inline]
    #[must_use]
    pub fn scope(&self) -> u32 {
        self.scope
    }

    /// Returns the `<html>` element.
    #[must_use]
    pub fn document_element(&self) -> NodeId {
        self.id(self.tree.read().root)
    }

    /// Returns the number of animation frames served.
    #[must_use]
    pub fn animation_frames(&self) -> u64 {
        self.frames.load(Ordering::SeqCst)
    }

    /// Returns `true` if `node` is attached under the document element.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.index(node)
            .is_some_and(|index| self.tree.read().is_connected(index))
    }

    /// Sets whether the document reports input focus.
    pub fn set_focus(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
    }

    fn id(&self, index: u32) -> NodeId {
        NodeId::new(self.scope, index)
    }

    fn index(&self, node: NodeId) -> Option<u32> {
        (node.scope() == self.scope && (node.index() as usize) < self.tree.read().nodes.len())
            .then_some(node.index())
    }

    fn require(&self, node: NodeId) -> Result<u32> {
        self.index(node).ok_or_else(|| Error::invalid_node(node))
    }
}

// ============================================================================
// MemoryDocument - Tree Building
// ============================================================================

impl MemoryDocument {
    /// Creates a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        let index = self.tree.write().push(element_kind(tag));
        self.id(index)
    }

    /// Creates a detached text node.
    pub fn create_text(&self, text: &str) -> NodeId {
        let index = self.tree.write().push(NodeKind::Text(text.to_string()));
        self.id(index)
    }

    /// Appends `child` as the last child of `parent`, moving it if attached.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidNode`] if either handle is foreign
    /// - [`Error::InvalidArgument`] if `parent` is a text node or `child`
    ///   contains `parent`
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_index = self.require(parent)?;
        let child_index = self.require(child)?;

        let mut tree = self.tree.write();
        if !tree.is_element(parent_index) {
            return Err(Error::invalid_argument("text nodes cannot have children"));
        }
        if tree.is_inclusive_ancestor(child_index, parent_index) {
            return Err(Error::invalid_argument(
                "cannot append a node to itself or its descendant",
            ));
        }

        tree.detach(child_index);
        if let Some(node) = tree.node_mut(child_index) {
            node.parent = Some(parent_index);
        }
        if let Some(node) = tree.node_mut(parent_index) {
            node.children.push(child_index);
        }
        Ok(())
    }

    /// Appends every node of `children` to `parent` in order.
    pub fn append_children(
        &self,
        parent: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> Result<()> {
        for child in children {
            self.append_child(parent, child)?;
        }
        Ok(())
    }

    /// Detaches `node` from its parent.
    pub fn remove(&self, node: NodeId) -> Result<()> {
        let index = self.require(node)?;
        self.tree.write().detach(index);
        Ok(())
    }

    /// Replaces the children of an element with a single text node, or
    /// rewrites the data of a text node.
    ///
    /// Replaced children are detached but stay in the arena.
    pub fn set_text_content(&self, node: NodeId, text: &str) -> Result<()> {
        let index = self.require(node)?;
        let mut tree = self.tree.write();

        if let Some(NodeData {
            kind: NodeKind::Text(data),
            ..
        }) = tree.node_mut(index)
        {
            *data = text.to_string();
            return Ok(());
        }

        let old_children = tree
            .node_mut(index)
            .map(|n| std::mem::take(&mut n.children))
            .unwrap_or_default();
        for child in old_children {
            if let Some(child_node) = tree.node_mut(child) {
                child_node.parent = None;
            }
        }

        if !text.is_empty() {
            let text_index = tree.push(NodeKind::Text(text.to_string()));
            if let Some(text_node) = tree.node_mut(text_index) {
                text_node.parent = Some(index);
            }
            if let Some(element) = tree.node_mut(index) {
                element.children.push(text_index);
            }
        }
        Ok(())
    }

    /// Sets an attribute on an element.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let index = self.require(node)?;
        let mut tree = self.tree.write();
        let Some(NodeData {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = tree.node_mut(index)
        else {
            return Err(Error::invalid_argument("attributes require an element"));
        };

        let name = name.to_ascii_lowercase();
        match attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attributes.push((name, value.to_string())),
        }
        Ok(())
    }

    /// Removes an attribute. Returns `true` if it was present.
    pub fn remove_attribute(&self, node: NodeId, name: &str) -> Result<bool> {
        let index = self.require(node)?;
        let mut tree = self.tree.write();
        let Some(NodeData {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = tree.node_mut(index)
        else {
            return Ok(false);
        };

        let before = attributes.len();
        attributes.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        Ok(attributes.len() != before)
    }

    /// Sets one inline style declaration, rewriting the `style` attribute.
    pub fn set_style(&self, node: NodeId, property: &str, value: &str) -> Result<()> {
        let index = self.require(node)?;
        let current = self
            .tree
            .read()
            .attribute(index, "style")
            .map(str::to_string)
            .unwrap_or_default();

        let property = property.trim().to_ascii_lowercase();
        let mut declarations: Vec<(String, String)> = parse_declarations(&current)
            .into_iter()
            .filter(|(name, _)| *name != property)
            .collect();
        declarations.push((property, value.trim().to_string()));

        let style = declarations
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("; ");
        self.set_attribute(node, "style", &style)
    }
}

// ============================================================================
// MemoryDocument - Listeners
// ============================================================================

impl MemoryDocument {
    /// Registers `listener` for events named `name` at `target`.
    pub fn add_event_listener<F>(&self, target: EventTarget, name: &str, listener: F) -> ListenerId
    where
        F: Fn(&EventContext<'_>) + Send + Sync + 'static,
    {
        let id = ListenerId::next();
        self.listeners
            .lock()
            .entry(target)
            .or_default()
            .push(ListenerEntry {
                id,
                name: name.to_string(),
                listener: Arc::new(listener),
            });
        id
    }

    /// Unregisters a listener. Returns `true` if it was registered.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        for entries in listeners.values_mut() {
            if let Some(position) = entries.iter().position(|entry| entry.id == id) {
                entries.remove(position);
                return true;
            }
        }
        false
    }

    fn listeners_for(&self, target: EventTarget, name: &str) -> Vec<Listener> {
        self.listeners
            .lock()
            .get(&target)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.name == name)
                    .map(|entry| Arc::clone(&entry.listener))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Targets an event visits, target first.
    fn propagation_path(&self, target: EventTarget, bubbles: bool) -> Result<Vec<EventTarget>> {
        let EventTarget::Node(node) = target else {
            return Ok(vec![EventTarget::Window]);
        };

        let index = self.require(node)?;
        let mut path = vec![target];
        if !bubbles {
            return Ok(path);
        }

        let tree = self.tree.read();
        let mut cursor = tree.node(index).and_then(|n| n.parent);
        while let Some(ancestor) = cursor {
            path.push(EventTarget::Node(self.id(ancestor)));
            cursor = tree.node(ancestor).and_then(|n| n.parent);
        }
        if tree.is_connected(index) {
            path.push(EventTarget::Window);
        }
        Ok(path)
    }
}

// ============================================================================
// Document Implementation
// ============================================================================

#[async_trait]
impl Document for MemoryDocument {
    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        if let Some(id) = list.id_only() {
            return Ok(self.get_element_by_id(id));
        }

        let tree = self.tree.read();
        Ok(tree
            .elements_in_order()
            .into_iter()
            .find(|index| list.matches(&*tree, *index))
            .map(|index| self.id(index)))
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        let tree = self.tree.read();
        Ok(tree
            .elements_in_order()
            .into_iter()
            .filter(|index| list.matches(&*tree, *index))
            .map(|index| self.id(index))
            .collect())
    }

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree.read();
        tree.elements_in_order()
            .into_iter()
            .find(|index| tree.attribute(*index, "id") == Some(id))
            .map(|index| self.id(index))
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.id(self.tree.read().body))
    }

    fn contains(&self, node: NodeId) -> bool {
        self.index(node).is_some()
    }

    fn node_name(&self, node: NodeId) -> Option<String> {
        let index = self.index(node)?;
        let tree = self.tree.read();
        match &tree.node(index)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text(_) => Some("#text".to_string()),
        }
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        let index = self.index(node)?;
        ElementTree::parent_element(&*self.tree.read(), index).map(|p| self.id(p))
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let Some(index) = self.index(node) else {
            return Vec::new();
        };
        self.tree
            .read()
            .element_children(index)
            .into_iter()
            .map(|c| self.id(c))
            .collect()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let index = self.index(node)?;
        self.tree.read().sibling(index, 1).map(|s| self.id(s))
    }

    fn text_content(&self, node: NodeId) -> Option<String> {
        let index = self.index(node)?;
        let mut out = String::new();
        self.tree.read().text_of(index, &mut out);
        Some(out)
    }

    fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let index = self.index(node)?;
        self.tree
            .read()
            .attribute(index, name)
            .map(str::to_string)
    }

    fn computed_style(&self, node: NodeId) -> Result<ComputedStyle> {
        let index = self.require(node)?;
        let tree = self.tree.read();
        let Some(tag) = tree.tag_name(index) else {
            return Err(Error::invalid_node(node));
        };

        let display = tree.declared_style(index, "display").unwrap_or_else(|| {
            if NON_RENDERED_ELEMENTS.contains(&tag) {
                "none".to_string()
            } else if BLOCK_ELEMENTS.contains(&tag) {
                "block".to_string()
            } else if tag == "LI" {
                "list-item".to_string()
            } else {
                "inline".to_string()
            }
        });
        let visibility = tree.computed_visibility(index);
        let opacity = tree
            .declared_style(index, "opacity")
            .unwrap_or_else(|| "1".to_string());

        Ok(ComputedStyle {
            display,
            visibility,
            opacity,
        })
    }

    fn value(&self, node: NodeId) -> Option<String> {
        let index = self.index(node)?;
        let tree = self.tree.read();
        match &tree.node(index)?.kind {
            NodeKind::Element { tag, value, .. } if VALUE_ELEMENTS.contains(&tag.as_str()) => {
                Some(value.clone().unwrap_or_default())
            }
            _ => None,
        }
    }

    fn set_value(&self, node: NodeId, new_value: &str) -> Result<()> {
        let index = self.require(node)?;
        let mut tree = self.tree.write();
        match tree.node_mut(index).map(|n| &mut n.kind) {
            Some(NodeKind::Element { tag, value, .. }) if VALUE_ELEMENTS.contains(&tag.as_str()) => {
                *value = Some(new_value.to_string());
                Ok(())
            }
            Some(NodeKind::Element { tag, .. }) => Err(Error::unsupported_element(tag.clone())),
            _ => Err(Error::unsupported_element("#text")),
        }
    }

    fn dispatch_event(&self, target: EventTarget, event: &Event) -> Result<bool> {
        let path = self.propagation_path(target, event.bubbles)?;
        let state = DispatchState::default();

        for current_target in path {
            for listener in self.listeners_for(current_target, &event.name) {
                let context = EventContext {
                    event,
                    target,
                    current_target,
                    state: &state,
                };
                listener(&context);
            }
            if state.propagation_stopped.load(Ordering::SeqCst) {
                break;
            }
        }

        let not_cancelled = !state.default_prevented.load(Ordering::SeqCst);
        trace!(event = %event.name, %target, not_cancelled, "Dispatched event");
        Ok(not_cancelled)
    }

    fn has_focus(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    async fn animation_frame(&self) {
        tokio::time::sleep(FRAME_INTERVAL).await;
        self.frames.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn element_kind(tag: &str) -> NodeKind {
    NodeKind::Element {
        tag: tag.to_ascii_uppercase(),
        attributes: Vec::new(),
        value: None,
    }
}

/// Parses `prop: value; ...` into lower-cased property names and values.
fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            (!name.is_empty()).then(|| (name, value.trim().to_string()))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;

    fn doc_with_spans(word: &str) -> (MemoryDocument, NodeId, Vec<NodeId>) {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let container = doc.create_element("div");
        doc.append_child(body, container).unwrap();
        let spans = word
            .chars()
            .map(|c| {
                let span = doc.create_element("span");
                doc.set_text_content(span, &c.to_string()).unwrap();
                doc.append_child(container, span).unwrap();
                span
            })
            .collect();
        (doc, container, spans)
    }

    /// Nested `div`s under body, outermost first.
    fn nested(doc: &MemoryDocument, depth: usize) -> Vec<NodeId> {
        let nodes: Vec<NodeId> = (0..depth).map(|_| doc.create_element("div")).collect();
        for pair in nodes.windows(2).rev() {
            doc.append_child(pair[0], pair[1]).unwrap();
        }
        doc.append_child(doc.body().unwrap(), nodes[0]).unwrap();
        nodes
    }

    #[test]
    fn test_new_document_shape() {
        let doc = MemoryDocument::new();
        let html = doc.document_element();
        let body = doc.body().unwrap();
        assert_eq!(doc.node_name(html).as_deref(), Some("HTML"));
        assert_eq!(doc.node_name(body).as_deref(), Some("BODY"));
        assert_eq!(doc.parent_element(body), Some(html));
        assert_eq!(doc.children(html).len(), 2);
        assert!(!doc.has_focus());
    }

    #[test]
    fn test_documents_have_distinct_scopes() {
        let a = MemoryDocument::new();
        let b = MemoryDocument::new();
        assert_ne!(a.scope(), b.scope());
        assert!(!a.contains(b.body().unwrap()));
    }

    #[test]
    fn test_text_content_and_siblings() {
        let (doc, container, spans) = doc_with_spans("quux");
        assert_eq!(doc.text_content(container).as_deref(), Some("quux"));
        assert_eq!(doc.next_sibling(spans[0]), Some(spans[1]));
        assert_eq!(doc.next_sibling(spans[3]), None);
        assert_eq!(doc.children(container), spans);
    }

    #[test]
    fn test_next_sibling_includes_text_nodes() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let a = doc.create_element("b");
        let text = doc.create_text(" ");
        let c = doc.create_element("i");
        doc.append_children(body, [a, text, c]).unwrap();

        assert_eq!(doc.next_sibling(a), Some(text));
        assert_eq!(doc.children(body), vec![a, c]);
        assert_eq!(doc.node_name(text).as_deref(), Some("#text"));
    }

    #[test]
    fn test_append_child_moves_node() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let first = doc.create_element("div");
        let second = doc.create_element("div");
        let child = doc.create_element("span");
        doc.append_children(body, [first, second]).unwrap();
        doc.append_child(first, child).unwrap();
        doc.append_child(second, child).unwrap();

        assert!(doc.children(first).is_empty());
        assert_eq!(doc.children(second), vec![child]);
    }

    #[test]
    fn test_append_child_rejects_cycles() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let html = doc.document_element();
        assert!(matches!(
            doc.append_child(body, html),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_query_selector_document_order() {
        let (doc, container, spans) = doc_with_spans("ab");
        doc.set_attribute(container, "id", "test-two").unwrap();

        assert_eq!(doc.query_selector("span").unwrap(), Some(spans[0]));
        assert_eq!(
            doc.query_selector("#test-two span:first-child").unwrap(),
            Some(spans[0])
        );
        assert_eq!(doc.query_selector_all("span").unwrap(), spans);
        assert_eq!(doc.query_selector("#test-two").unwrap(), Some(container));
        assert_eq!(doc.query_selector("table").unwrap(), None);
        assert!(doc.query_selector("div >").is_err());
    }

    #[test]
    fn test_detached_nodes_are_not_queryable() {
        let doc = MemoryDocument::new();
        let orphan = doc.create_element("aside");
        doc.set_attribute(orphan, "id", "orphan").unwrap();
        assert_eq!(doc.query_selector("aside").unwrap(), None);
        assert_eq!(doc.get_element_by_id("orphan"), None);
        assert!(!doc.is_connected(orphan));
    }

    #[test]
    fn test_computed_style_defaults_and_inheritance() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let div = doc.create_element("div");
        let span = doc.create_element("span");
        doc.append_child(body, div).unwrap();
        doc.append_child(div, span).unwrap();

        assert_eq!(doc.computed_style(div).unwrap(), ComputedStyle::default());
        assert_eq!(doc.computed_style(span).unwrap().display, "inline");

        doc.set_style(div, "visibility", "hidden").unwrap();
        doc.set_style(div, "opacity", "0.5").unwrap();
        let span_style = doc.computed_style(span).unwrap();
        assert_eq!(span_style.visibility, "hidden");
        assert_eq!(span_style.opacity, "1");

        doc.set_style(span, "visibility", "visible").unwrap();
        assert_eq!(doc.computed_style(span).unwrap().visibility, "visible");
        assert_eq!(
            doc.get_attribute(div, "style").as_deref(),
            Some("visibility: hidden; opacity: 0.5")
        );
    }

    #[test]
    fn test_deep_chain_text_and_style() {
        let doc = MemoryDocument::new();
        let nodes = nested(&doc, 60_000);
        let leaf = nodes[nodes.len() - 1];
        doc.set_text_content(leaf, "deep").unwrap();

        assert_eq!(doc.text_content(nodes[0]).as_deref(), Some("deep"));
        assert_eq!(doc.computed_style(leaf).unwrap().visibility, "visible");

        doc.set_style(nodes[0], "visibility", "hidden").unwrap();
        assert_eq!(doc.computed_style(leaf).unwrap().visibility, "hidden");
    }

    #[test]
    fn test_text_content_keeps_document_order() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.append_child(body, outer).unwrap();
        doc.append_child(outer, doc.create_text("a")).unwrap();
        doc.append_child(outer, inner).unwrap();
        doc.append_child(inner, doc.create_text("b")).unwrap();
        doc.append_child(outer, doc.create_text("c")).unwrap();

        assert_eq!(doc.text_content(outer).as_deref(), Some("abc"));
    }

    #[test]
    fn test_computed_style_rejects_foreign_and_text_nodes() {
        let doc = MemoryDocument::new();
        let other = MemoryDocument::new();
        let text = doc.create_text("x");

        assert!(matches!(
            doc.computed_style(other.body().unwrap()),
            Err(Error::InvalidNode { .. })
        ));
        assert!(matches!(
            doc.computed_style(text),
            Err(Error::InvalidNode { .. })
        ));
    }

    #[test]
    fn test_value_property() {
        let doc = MemoryDocument::new();
        let input = doc.create_element("input");
        let div = doc.create_element("div");

        assert_eq!(doc.value(input).as_deref(), Some(""));
        doc.set_value(input, "hi").unwrap();
        assert_eq!(doc.value(input).as_deref(), Some("hi"));

        assert_eq!(doc.value(div), None);
        assert!(matches!(
            doc.set_value(div, "x"),
            Err(Error::UnsupportedElement { .. })
        ));
    }

    #[test]
    fn test_dispatch_bubbles_to_ancestors_and_window() {
        let (doc, container, spans) = doc_with_spans("a");
        let seen = Arc::new(Mutex::new(Vec::new()));

        for target in [
            EventTarget::Node(spans[0]),
            EventTarget::Node(container),
            EventTarget::Window,
        ] {
            let seen = Arc::clone(&seen);
            doc.add_event_listener(target, "click", move |ctx| {
                seen.lock().push(ctx.current_target());
            });
        }

        let not_cancelled = doc
            .dispatch_event(EventTarget::Node(spans[0]), &Event::click())
            .unwrap();
        assert!(not_cancelled);
        assert_eq!(
            *seen.lock(),
            vec![
                EventTarget::Node(spans[0]),
                EventTarget::Node(container),
                EventTarget::Window,
            ]
        );
    }

    #[test]
    fn test_dispatch_non_bubbling_stays_on_target() {
        let (doc, container, spans) = doc_with_spans("a");
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);
        doc.add_event_listener(EventTarget::Node(container), "hello", move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        let event = Event::new("hello");
        doc.dispatch_event(EventTarget::Node(spans[0]), &event).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        doc.dispatch_event(EventTarget::Node(spans[0]), &event.with_bubbles(true))
            .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_prevent_default_and_stop_propagation() {
        let (doc, container, spans) = doc_with_spans("a");
        let outer_hits = Arc::new(AtomicUsize::new(0));
        let outer = Arc::clone(&outer_hits);

        doc.add_event_listener(EventTarget::Node(spans[0]), "click", |ctx| {
            ctx.prevent_default();
            ctx.stop_propagation();
        });
        doc.add_event_listener(EventTarget::Node(container), "click", move |_| {
            outer.fetch_add(1, Ordering::SeqCst);
        });

        let not_cancelled = doc
            .dispatch_event(EventTarget::Node(spans[0]), &Event::click())
            .unwrap();
        assert!(!not_cancelled);
        assert_eq!(outer_hits.load(Ordering::SeqCst), 0);

        // Non-cancelable events ignore prevent_default.
        let not_cancelled = doc
            .dispatch_event(EventTarget::Node(spans[0]), &Event::new("click"))
            .unwrap();
        assert!(not_cancelled);
    }

    #[test]
    fn test_listener_may_mutate_document() {
        let doc = Arc::new(MemoryDocument::new());
        let body = doc.body().unwrap();
        let weak = Arc::downgrade(&doc);
        doc.add_event_listener(EventTarget::Window, "grow", move |_| {
            if let Some(doc) = weak.upgrade() {
                let p = doc.create_element("p");
                doc.append_child(doc.body().unwrap(), p).unwrap();
            }
        });

        doc.dispatch_event(EventTarget::Window, &Event::custom("grow"))
            .unwrap();
        assert_eq!(doc.children(body).len(), 1);
    }

    #[test]
    fn test_remove_event_listener() {
        let doc = MemoryDocument::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);
        let id = doc.add_event_listener(EventTarget::Window, "ping", move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(doc.remove_event_listener(id));
        assert!(!doc.remove_event_listener(id));
        doc.dispatch_event(EventTarget::Window, &Event::custom("ping"))
            .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_animation_frame_counts() {
        let doc = MemoryDocument::new();
        let start = tokio::time::Instant::now();
        doc.animation_frame().await;
        doc.animation_frame().await;
        assert_eq!(doc.animation_frames(), 2);
        assert_eq!(start.elapsed(), FRAME_INTERVAL * 2);
    }
}
