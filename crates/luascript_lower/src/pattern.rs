//! Lowers binding patterns (identifiers, array/object destructuring, rest,
//! defaults) to their IR shapes. Structural only — destructuring is
//! *expanded* into positional/property reads by the emitter, not here.

use luascript_ast::CanonicalNode;
use luascript_diagnostic::CompileError;
use luascript_ir::{NodeId, NodeKind, PropertyKind};

use crate::lowerer::Lowerer;

impl Lowerer {
    pub(crate) fn lower_pattern(&mut self, node: &CanonicalNode) -> Result<NodeId, CompileError> {
        match node {
            CanonicalNode::Identifier { name } => {
                Ok(self.builder.make_node(NodeKind::Identifier { name: name.clone() }))
            }
            CanonicalNode::ArrayPattern { elements } => {
                let mut lowered = Vec::with_capacity(elements.len());
                for el in elements {
                    match el {
                        Some(e) => lowered.push(Some(self.lower_pattern(e)?)),
                        None => lowered.push(None),
                    }
                }
                Ok(self.builder.make_node(NodeKind::ArrayPattern { elements: lowered }))
            }
            CanonicalNode::ObjectPattern { properties } => {
                let mut lowered = Vec::with_capacity(properties.len());
                for prop in properties {
                    lowered.push(self.lower_pattern_property(prop)?);
                }
                Ok(self.builder.make_node(NodeKind::ObjectPattern { properties: lowered }))
            }
            CanonicalNode::RestElement { argument } => {
                let argument = self.lower_pattern(argument)?;
                Ok(self.builder.make_node(NodeKind::RestElement { argument }))
            }
            CanonicalNode::AssignmentPattern { left, right } => {
                let left = self.lower_pattern(left)?;
                let right = self.lower_expr(right)?;
                Ok(self.builder.make_node(NodeKind::AssignmentPattern { left, right }))
            }
            CanonicalNode::MemberExpression { .. } => self.lower_expr(node),
            other => Err(CompileError::UnsupportedConstruct {
                type_name: format!("{:?} used as binding pattern", other.type_tag()),
            }),
        }
    }

    fn lower_pattern_property(&mut self, node: &CanonicalNode) -> Result<NodeId, CompileError> {
        let CanonicalNode::Property {
            key,
            value,
            computed,
            shorthand,
            property_kind,
        } = node
        else {
            return Err(CompileError::UnsupportedConstruct {
                type_name: format!("{:?} in object pattern", node.type_tag()),
            });
        };
        let key = self.lower_expr(key)?;
        let value = self.lower_pattern(value)?;
        let _ = property_kind; // always Init in a destructuring position
        Ok(self.builder.make_node(NodeKind::Property {
            key,
            value,
            computed: *computed,
            shorthand: *shorthand,
            property_kind: PropertyKind::Init,
        }))
    }

    /// Recursively declares every identifier bound by `pattern` into the
    /// current scope.
    pub(crate) fn declare_pattern_bindings(&mut self, pattern: &CanonicalNode) {
        match pattern {
            CanonicalNode::Identifier { name } => self.scopes.declare(name.clone()),
            CanonicalNode::ArrayPattern { elements } => {
                for el in elements.iter().flatten() {
                    self.declare_pattern_bindings(el);
                }
            }
            CanonicalNode::ObjectPattern { properties } => {
                for prop in properties {
                    if let CanonicalNode::Property { value, .. } = prop {
                        self.declare_pattern_bindings(value);
                    }
                }
            }
            CanonicalNode::RestElement { argument } | CanonicalNode::AssignmentPattern { left: argument, .. } => {
                self.declare_pattern_bindings(argument);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luascript_ir::NodeKind;

    #[test]
    fn identifier_pattern_lowers_directly() {
        let mut l = Lowerer::new();
        let id = l
            .lower_pattern(&CanonicalNode::Identifier { name: "x".into() })
            .unwrap();
        assert!(matches!(l.node(&id).unwrap().kind, NodeKind::Identifier { .. }));
    }

    #[test]
    fn array_pattern_with_hole_preserves_none() {
        let mut l = Lowerer::new();
        let pattern = CanonicalNode::ArrayPattern {
            elements: vec![Some(CanonicalNode::Identifier { name: "a".into() }), None],
        };
        let id = l.lower_pattern(&pattern).unwrap();
        let NodeKind::ArrayPattern { elements } = &l.node(&id).unwrap().kind else {
            panic!("expected ArrayPattern");
        };
        assert_eq!(elements.len(), 2);
        assert!(elements[1].is_none());
    }

    #[test]
    fn declare_pattern_bindings_walks_nested_object_pattern() {
        let mut l = Lowerer::new();
        let pattern = CanonicalNode::ObjectPattern {
            properties: vec![CanonicalNode::Property {
                key: Box::new(CanonicalNode::Identifier { name: "a".into() }),
                value: Box::new(CanonicalNode::Identifier { name: "aLocal".into() }),
                computed: false,
                shorthand: false,
                property_kind: luascript_ir::PropertyKind::Init,
            }],
        };
        l.declare_pattern_bindings(&pattern);
        assert!(l.scopes.is_declared("aLocal"));
    }
}
