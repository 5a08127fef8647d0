//! Selector parsing and matching.
//!
//! Supports the selector subset test fixtures reach for:
//!
//! | Syntax | Example |
//! |--------|---------|
//! | Type / universal | `span`, `*` |
//! | ID / class | `#test-el`, `.item` |
//! | Attribute | `[hidden]`, `[name=email]`, `[data-x="a b"]` |
//! | Structural | `:first-child`, `:last-child` |
//! | Combinators | descendant (` `), child (`>`), adjacent (`+`) |
//! | Groups | `a, b` |
//!
//! Matching walks right to left over any tree implementing [`ElementTree`].

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

// ============================================================================
// ElementTree
// ============================================================================

/// Read access a tree must offer for selector matching.
pub trait ElementTree {
    /// Element handle type.
    type Handle: Copy;

    /// Returns the element's tag name, `None` for non-elements.
    fn tag_name(&self, node: Self::Handle) -> Option<&str>;

    /// Returns an attribute value.
    fn attribute(&self, node: Self::Handle, name: &str) -> Option<&str>;

    /// Returns the parent element.
    fn parent_element(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// Returns the previous element sibling.
    fn previous_element_sibling(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// Returns the next element sibling.
    fn next_element_sibling(&self, node: Self::Handle) -> Option<Self::Handle>;
}

// ============================================================================
// Selector Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PseudoClass {
    FirstChild,
    LastChild,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCondition {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Step {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
    pseudo: Vec<PseudoClass>,
}

impl Step {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && !self.universal
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    step: Step,
    // Relation to the part on the left.
    combinator: Option<Combinator>,
}

// ============================================================================
// SelectorList
// ============================================================================

/// A parsed, comma-separated selector list.
///
/// # Example
///
/// ```
/// use dom_wait::host::selector::SelectorList;
///
/// assert!(SelectorList::parse("#test-two > span:first-child").is_ok());
/// assert!(SelectorList::parse("div >").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    groups: Vec<Vec<Part>>,
}

impl SelectorList {
    /// Parses a selector list.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSelector`] if the text is empty or malformed.
    pub fn parse(selector: &str) -> Result<Self> {
        let groups = split_groups(selector)?
            .iter()
            .map(|group| parse_chain(group, selector))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { groups })
    }

    /// Returns the ID when the list is a lone `#id` selector.
    #[must_use]
    pub fn id_only(&self) -> Option<&str> {
        match self.groups.as_slice() {
            [chain] => match chain.as_slice() {
                [part] => {
                    let step = &part.step;
                    let only_id = step.tag.is_none()
                        && !step.universal
                        && step.classes.is_empty()
                        && step.attrs.is_empty()
                        && step.pseudo.is_empty();
                    if only_id { step.id.as_deref() } else { None }
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns `true` if `node` matches any group.
    pub fn matches<T: ElementTree>(&self, tree: &T, node: T::Handle) -> bool {
        tree.tag_name(node).is_some()
            && self
                .groups
                .iter()
                .any(|chain| matches_chain(tree, node, chain))
    }
}

// ============================================================================
// Matching
// ============================================================================

fn matches_chain<T: ElementTree>(tree: &T, node: T::Handle, chain: &[Part]) -> bool {
    let Some((last, rest)) = chain.split_last() else {
        return false;
    };
    if !matches_step(tree, node, &last.step) {
        return false;
    }
    let Some(combinator) = last.combinator else {
        return rest.is_empty();
    };

    match combinator {
        Combinator::Child => tree
            .parent_element(node)
            .is_some_and(|parent| matches_chain(tree, parent, rest)),
        Combinator::AdjacentSibling => tree
            .previous_element_sibling(node)
            .is_some_and(|sibling| matches_chain(tree, sibling, rest)),
        Combinator::Descendant => {
            let mut cursor = tree.parent_element(node);
            while let Some(ancestor) = cursor {
                if matches_chain(tree, ancestor, rest) {
                    return true;
                }
                cursor = tree.parent_element(ancestor);
            }
            false
        }
    }
}

fn matches_step<T: ElementTree>(tree: &T, node: T::Handle, step: &Step) -> bool {
    let Some(tag) = tree.tag_name(node) else {
        return false;
    };

    if let Some(expected) = &step.tag
        && !expected.eq_ignore_ascii_case(tag)
    {
        return false;
    }

    if let Some(id) = &step.id
        && tree.attribute(node, "id") != Some(id.as_str())
    {
        return false;
    }

    if !step.classes.is_empty() {
        let class_attr = tree.attribute(node, "class").unwrap_or_default();
        if !step
            .classes
            .iter()
            .all(|class| class_attr.split_ascii_whitespace().any(|c| c == class))
        {
            return false;
        }
    }

    let attrs_match = step.attrs.iter().all(|cond| {
        match (tree.attribute(node, &cond.name), &cond.value) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
        }
    });
    if !attrs_match {
        return false;
    }

    step.pseudo.iter().all(|pseudo| match pseudo {
        PseudoClass::FirstChild => tree.previous_element_sibling(node).is_none(),
        PseudoClass::LastChild => tree.next_element_sibling(node).is_none(),
    })
}

// ============================================================================
// Parsing
// ============================================================================

fn split_groups(selector: &str) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;

    for ch in selector.chars() {
        match ch {
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                if bracket_depth == 0 {
                    return Err(Error::invalid_selector(selector, "unbalanced ']'"));
                }
                bracket_depth -= 1;
                current.push(ch);
            }
            ',' if bracket_depth == 0 => {
                let trimmed = current.trim();
                if trimmed.is_empty() {
                    return Err(Error::invalid_selector(selector, "empty selector group"));
                }
                groups.push(trimmed.to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if bracket_depth != 0 {
        return Err(Error::invalid_selector(selector, "unbalanced '['"));
    }

    let trimmed = current.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_selector(selector, "empty selector group"));
    }
    groups.push(trimmed.to_string());
    Ok(groups)
}

fn tokenize(group: &str, selector: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;

    for ch in group.chars() {
        match ch {
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                bracket_depth = bracket_depth.saturating_sub(1);
                current.push(ch);
            }
            '>' | '+' if bracket_depth == 0 => {
                if !current.trim().is_empty() {
                    tokens.push(current.trim().to_string());
                }
                current.clear();
                tokens.push(ch.to_string());
            }
            ch if ch.is_ascii_whitespace() && bracket_depth == 0 => {
                if !current.trim().is_empty() {
                    tokens.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if bracket_depth != 0 {
        return Err(Error::invalid_selector(selector, "unbalanced '['"));
    }
    if !current.trim().is_empty() {
        tokens.push(current.trim().to_string());
    }
    Ok(tokens)
}

fn parse_chain(group: &str, selector: &str) -> Result<Vec<Part>> {
    let mut parts: Vec<Part> = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokenize(group, selector)? {
        if token == ">" || token == "+" {
            if pending.is_some() || parts.is_empty() {
                return Err(Error::invalid_selector(
                    selector,
                    format!("dangling combinator '{token}'"),
                ));
            }
            pending = Some(if token == ">" {
                Combinator::Child
            } else {
                Combinator::AdjacentSibling
            });
            continue;
        }

        let step = parse_step(&token, selector)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(Part { step, combinator });
    }

    if parts.is_empty() || pending.is_some() {
        return Err(Error::invalid_selector(selector, "incomplete selector"));
    }
    Ok(parts)
}

fn parse_step(token: &str, selector: &str) -> Result<Step> {
    let invalid = |message: &str| Error::invalid_selector(selector, message);
    let mut step = Step::default();
    let mut rest = token;

    while let Some(first) = rest.chars().next() {
        match first {
            '*' => {
                if step.universal || step.tag.is_some() {
                    return Err(invalid("misplaced '*'"));
                }
                step.universal = true;
                rest = &rest[1..];
            }
            '#' => {
                let (ident, tail) = take_ident(&rest[1..]);
                if ident.is_empty() || step.id.replace(ident.to_string()).is_some() {
                    return Err(invalid("invalid id selector"));
                }
                rest = tail;
            }
            '.' => {
                let (ident, tail) = take_ident(&rest[1..]);
                if ident.is_empty() {
                    return Err(invalid("invalid class selector"));
                }
                step.classes.push(ident.to_string());
                rest = tail;
            }
            '[' => {
                let close = rest.find(']').ok_or_else(|| invalid("unbalanced '['"))?;
                step.attrs.push(parse_attr(&rest[1..close], selector)?);
                rest = &rest[close + 1..];
            }
            ':' => {
                let (ident, tail) = take_ident(&rest[1..]);
                let pseudo = match ident {
                    "first-child" => PseudoClass::FirstChild,
                    "last-child" => PseudoClass::LastChild,
                    _ => return Err(invalid("unsupported pseudo-class")),
                };
                step.pseudo.push(pseudo);
                rest = tail;
            }
            _ => {
                if !step.is_empty() {
                    return Err(invalid("type selector must come first"));
                }
                let (ident, tail) = take_ident(rest);
                if ident.is_empty() {
                    return Err(invalid("unexpected character"));
                }
                step.tag = Some(ident.to_string());
                rest = tail;
            }
        }
    }

    if step.is_empty() {
        return Err(invalid("empty compound selector"));
    }
    Ok(step)
}

fn parse_attr(inner: &str, selector: &str) -> Result<AttrCondition> {
    let (name, value) = match inner.split_once('=') {
        Some((name, value)) => (name.trim(), Some(unquote(value.trim()))),
        None => (inner.trim(), None),
    };

    let (ident, tail) = take_ident(name);
    if ident.is_empty() || !tail.is_empty() {
        return Err(Error::invalid_selector(selector, "invalid attribute selector"));
    }

    Ok(AttrCondition {
        name: ident.to_ascii_lowercase(),
        value: value.map(str::to_string),
    })
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn take_ident(input: &str) -> (&str, &str) {
    let end = input
        .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(input.len());
    input.split_at(end)
}

// ============================================================================
// Tests
// ============================================================================
