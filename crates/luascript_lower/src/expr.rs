//! Direct AST → IR translation of expression trees.

use luascript_ast::CanonicalNode;
use luascript_diagnostic::CompileError;
use luascript_ir::{NodeId, NodeKind};

use crate::lowerer::Lowerer;

impl Lowerer {
    pub(crate) fn lower_expr(&mut self, node: &CanonicalNode) -> Result<NodeId, CompileError> {
        let kind = match node {
            CanonicalNode::Identifier { name } => NodeKind::Identifier { name: name.clone() },
            CanonicalNode::Literal { value, type_annotation } => NodeKind::Literal {
                value: value.clone(),
                type_annotation: type_annotation.clone(),
            },
            CanonicalNode::ThisExpression => NodeKind::ThisExpression {},
            CanonicalNode::Super => NodeKind::Super {},
            CanonicalNode::BinaryExpression { operator, left, right } => {
                let left = self.lower_expr(left)?;
                let right = self.lower_expr(right)?;
                NodeKind::BinaryExpression { operator: operator.clone(), left, right }
            }
            CanonicalNode::LogicalExpression { operator, left, right } => {
                let left = self.lower_expr(left)?;
                let right = self.lower_expr(right)?;
                NodeKind::LogicalExpression { operator: operator.clone(), left, right }
            }
            CanonicalNode::AssignmentExpression { operator, left, right } => {
                let left = self.lower_assignment_target(left)?;
                let right = self.lower_expr(right)?;
                NodeKind::AssignmentExpression { operator: operator.clone(), left, right }
            }
            CanonicalNode::UpdateExpression { operator, argument, prefix } => {
                let argument = self.lower_expr(argument)?;
                NodeKind::UpdateExpression { operator: operator.clone(), argument, prefix: *prefix }
            }
            CanonicalNode::UnaryExpression { operator, argument, prefix } => {
                let argument = self.lower_expr(argument)?;
                NodeKind::UnaryExpression { operator: operator.clone(), argument, prefix: *prefix }
            }
            CanonicalNode::ConditionalExpression { test, consequent, alternate } => {
                let test = self.lower_expr(test)?;
                let consequent = self.lower_expr(consequent)?;
                let alternate = self.lower_expr(alternate)?;
                NodeKind::ConditionalExpression { test, consequent, alternate }
            }
            CanonicalNode::CallExpression { callee, arguments, optional } => {
                let callee = self.lower_expr(callee)?;
                let arguments = self.lower_expr_list(arguments)?;
                NodeKind::CallExpression { callee, arguments, optional: *optional }
            }
            CanonicalNode::NewExpression { callee, arguments } => {
                let callee = self.lower_expr(callee)?;
                let arguments = self.lower_expr_list(arguments)?;
                NodeKind::NewExpression { callee, arguments }
            }
            CanonicalNode::MemberExpression { object, property, computed, optional } => {
                let object = self.lower_expr(object)?;
                let property = self.lower_expr(property)?;
                NodeKind::MemberExpression { object, property, computed: *computed, optional: *optional }
            }
            CanonicalNode::ArrayExpression { elements } => {
                let mut out = Vec::with_capacity(elements.len());
                for el in elements {
                    match el {
                        Some(e) => out.push(Some(self.lower_expr(e)?)),
                        None => out.push(None),
                    }
                }
                NodeKind::ArrayExpression { elements: out }
            }
            CanonicalNode::ObjectExpression { properties } => {
                let properties = self.lower_expr_list(properties)?;
                NodeKind::ObjectExpression { properties }
            }
            CanonicalNode::Property { key, value, computed, shorthand, property_kind } => {
                let key = self.lower_expr(key)?;
                let value = self.lower_expr(value)?;
                NodeKind::Property { key, value, computed: *computed, shorthand: *shorthand, property_kind: *property_kind }
            }
            CanonicalNode::TemplateLiteral { quasis, expressions } => {
                let quasis = self.lower_expr_list(quasis)?;
                let expressions = self.lower_expr_list(expressions)?;
                NodeKind::TemplateLiteral { quasis, expressions }
            }
            CanonicalNode::TemplateElement { raw, cooked, tail } => NodeKind::TemplateElement {
                raw: raw.clone(),
                cooked: cooked.clone(),
                tail: *tail,
            },
            CanonicalNode::SpreadElement { argument } => {
                let argument = self.lower_expr(argument)?;
                NodeKind::SpreadElement { argument }
            }
            CanonicalNode::ArrowFunctionExpression { .. } => return self.lower_arrow_function(node),
            CanonicalNode::FunctionExpression { .. } => return self.lower_function_expression(node),
            CanonicalNode::AwaitExpression { argument } => {
                let argument = self.lower_expr(argument)?;
                NodeKind::AwaitExpression { argument }
            }
            CanonicalNode::YieldExpression { argument, delegate } => {
                let argument = match argument {
                    Some(a) => Some(self.lower_expr(a)?),
                    None => None,
                };
                NodeKind::YieldExpression { argument, delegate: *delegate }
            }
            CanonicalNode::ClassExpression { .. } => return self.lower_class_expression(node),
            // Patterns can appear directly in expression position only as
            // assignment targets; route them there.
            CanonicalNode::ArrayPattern { .. } | CanonicalNode::ObjectPattern { .. } => {
                return self.lower_pattern(node)
            }
            other => {
                return Err(CompileError::UnsupportedConstruct {
                    type_name: other.type_tag().to_string(),
                })
            }
        };
        Ok(self.builder.make_node(kind))
    }

    /// The left-hand side of an assignment is either an identifier, a
    /// member access, or (for destructuring assignment) a pattern — never a
    /// fresh declaration, so no scope binding happens here.
    fn lower_assignment_target(&mut self, node: &CanonicalNode) -> Result<NodeId, CompileError> {
        match node {
            CanonicalNode::ArrayPattern { .. } | CanonicalNode::ObjectPattern { .. } => {
                self.lower_pattern(node)
            }
            _ => self.lower_expr(node),
        }
    }

    pub(crate) fn lower_expr_list(&mut self, nodes: &[CanonicalNode]) -> Result<Vec<NodeId>, CompileError> {
        nodes.iter().map(|n| self.lower_expr(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_expression_preserves_operator_string() {
        let mut l = Lowerer::new();
        let id = l
            .lower_expr(&CanonicalNode::BinaryExpression {
                operator: "===".into(),
                left: Box::new(CanonicalNode::Identifier { name: "a".into() }),
                right: Box::new(CanonicalNode::Identifier { name: "b".into() }),
            })
            .unwrap();
        let NodeKind::BinaryExpression { operator, .. } = &l.node(&id).unwrap().kind else {
            panic!("expected BinaryExpression");
        };
        assert_eq!(operator, "===");
    }

    #[test]
    fn optional_member_expression_carries_flag() {
        let mut l = Lowerer::new();
        let id = l
            .lower_expr(&CanonicalNode::MemberExpression {
                object: Box::new(CanonicalNode::Identifier { name: "a".into() }),
                property: Box::new(CanonicalNode::Identifier { name: "b".into() }),
                computed: false,
                optional: true,
            })
            .unwrap();
        let NodeKind::MemberExpression { optional, .. } = &l.node(&id).unwrap().kind else {
            panic!("expected MemberExpression");
        };
        assert!(*optional);
    }

    #[test]
    fn unsupported_ast_shape_in_expression_position_is_rejected() {
        let mut l = Lowerer::new();
        let err = l
            .lower_expr(&CanonicalNode::RestElement {
                argument: Box::new(CanonicalNode::Identifier { name: "x".into() }),
            })
            .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedConstruct { .. }));
    }
}
