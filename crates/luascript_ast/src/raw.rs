//! The parser's raw tree: "type-tagged objects with unstable
//! field names."
//!
//! Modeled as a dynamically-typed tree rather than a fixed Rust type,
//! because the external parser's shape is explicitly out of this core's
//! control.
//! `RawRef` uses `Rc<RefCell<_>>` so the same object can appear at more
//! than one position in the tree — real parsers sometimes hand back shared
//! sub-trees — and so that back-reference fields (`parent`) can close a
//! genuine cycle, which the normalizer must detect and cut.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub type RawRef = Rc<RefCell<RawNode>>;

#[derive(Debug, Clone)]
pub struct RawNode {
    pub node_type: String,
    pub fields: BTreeMap<String, RawField>,
}

impl RawNode {
    pub fn new(node_type: impl Into<String>) -> RawRef {
        Rc::new(RefCell::new(RawNode {
            node_type: node_type.into(),
            fields: BTreeMap::new(),
        }))
    }

    pub fn with_field(self: RawRef, name: impl Into<String>, field: RawField) -> RawRef {
        self.borrow_mut().fields.insert(name.into(), field);
        self
    }
}

#[derive(Debug, Clone)]
pub enum RawField {
    Node(RawRef),
    List(Vec<RawField>),
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
}

impl RawField {
    pub fn node(n: RawRef) -> Self {
        RawField::Node(n)
    }

    pub fn as_node(&self) -> Option<&RawRef> {
        match self {
            RawField::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RawField]> {
        match self {
            RawField::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawField::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            RawField::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RawField::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Pointer identity of a `RawRef`, used as the key of the normalizer's
/// `seen` memoization map.
pub fn identity(node: &RawRef) -> usize {
    Rc::as_ptr(node) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_stable_across_clones() {
        let n = RawNode::new("Identifier");
        let cloned = Rc::clone(&n);
        assert_eq!(identity(&n), identity(&cloned));
    }

    #[test]
    fn with_field_builds_nested_structure() {
        let child = RawNode::new("Identifier").with_field("name", RawField::Str("x".into()));
        let parent = RawNode::new("ExpressionStatement")
            .with_field("expression", RawField::node(Rc::clone(&child)));
        let got = parent.borrow().fields.get("expression").unwrap().as_node().unwrap().clone();
        assert_eq!(got.borrow().node_type, "Identifier");
    }
}
