//! Lowers classes to a constructor function plus a sequence of prototype
//! or static assignment statements: there is no `class`
//! construct in the IR's execution model, only functions and assignments.

use luascript_ast::CanonicalNode;
use luascript_diagnostic::CompileError;
use luascript_ir::{Meta, MethodKind, NodeId, NodeKind};

use crate::lowerer::Lowerer;

impl Lowerer {
    /// Lowers a class declaration at statement position, returning every
    /// statement it expands into: the constructor function declaration
    /// first, then one assignment per method.
    pub(crate) fn lower_class_declaration(&mut self, node: &CanonicalNode) -> Result<Vec<NodeId>, CompileError> {
        let CanonicalNode::ClassDeclaration { id, super_class, body } = node else {
            return Err(CompileError::Internal(
                "lower_class_declaration called with a non-ClassDeclaration node".into(),
            ));
        };
        let class_name = match id {
            Some(id_node) => self.binding_name(id_node)?,
            None => self.scopes.anonymous_function_name(),
        };
        self.lower_class_body(&class_name, super_class.as_deref(), body)
    }

    pub(crate) fn lower_class_expression(&mut self, node: &CanonicalNode) -> Result<NodeId, CompileError> {
        let CanonicalNode::ClassExpression { id, super_class, body } = node else {
            return Err(CompileError::Internal(
                "lower_class_expression called with a non-ClassExpression node".into(),
            ));
        };
        let class_name = match id {
            Some(id_node) => self.binding_name(id_node)?,
            None => self.scopes.anonymous_function_name(),
        };
        let mut statements = self.lower_class_body(&class_name, super_class.as_deref(), body)?;
        // An expression position needs a single id; the constructor
        // declaration (first element) is the class's value.
        Ok(statements.remove(0))
    }

    fn binding_name(&self, id_node: &CanonicalNode) -> Result<String, CompileError> {
        match id_node {
            CanonicalNode::Identifier { name } => Ok(name.clone()),
            other => Err(CompileError::UnsupportedConstruct {
                type_name: format!("class id of shape {:?}", other.type_tag()),
            }),
        }
    }

    fn lower_class_body(
        &mut self,
        class_name: &str,
        super_class: Option<&CanonicalNode>,
        body: &CanonicalNode,
    ) -> Result<Vec<NodeId>, CompileError> {
        let CanonicalNode::ClassBody { body: members } = body else {
            return Err(CompileError::UnsupportedConstruct {
                type_name: "class body that is not a ClassBody".into(),
            });
        };

        self.scopes.declare(class_name.to_string());
        let super_expr = match super_class {
            Some(sc) => Some(self.lower_expr(sc)?),
            None => None,
        };

        let mut constructor_decl: Option<NodeId> = None;
        let mut method_statements = Vec::new();
        method_statements.push(self.lower_index_assignment(class_name, super_expr));

        for member in members {
            let CanonicalNode::MethodDefinition {
                key,
                value,
                method_kind,
                is_static,
                computed,
            } = member
            else {
                return Err(CompileError::UnsupportedConstruct {
                    type_name: format!("class member of shape {:?}", member.type_tag()),
                });
            };

            let method_name = match key.as_ref() {
                CanonicalNode::Identifier { name } => name.clone(),
                _ if *computed => {
                    return Err(CompileError::UnsupportedConstruct {
                        type_name: "computed class member key".into(),
                    })
                }
                other => {
                    return Err(CompileError::UnsupportedConstruct {
                        type_name: format!("class member key of shape {:?}", other.type_tag()),
                    })
                }
            };

            let fn_id = self.lower_function_expression(value)?;

            match method_kind {
                MethodKind::Constructor => {
                    let name_id = self
                        .builder
                        .make_node(NodeKind::Identifier { name: class_name.to_string() });
                    let ctor_id = self.reconstitute_constructor(name_id, fn_id)?;
                    constructor_decl = Some(ctor_id);
                }
                MethodKind::Method | MethodKind::Get | MethodKind::Set => {
                    method_statements.push(self.lower_method_assignment(class_name, &method_name, fn_id, *is_static));
                }
            }
        }

        let constructor_decl = match constructor_decl {
            Some(id) => id,
            None => self.synthesize_default_constructor(class_name)?,
        };
        let mut meta = self.node(&constructor_decl).map(|n| n.meta.clone()).unwrap_or_default();
        meta.class_like = true;
        self.builder.set_meta(&constructor_decl, meta);

        let mut out = vec![constructor_decl];
        out.extend(method_statements);
        Ok(out)
    }

    /// Rewraps a lowered constructor `FunctionExpression` as a named
    /// `FunctionDeclaration` bound to the class name, which is what the
    /// emitter expects to find at the class's declaration site.
    fn reconstitute_constructor(&mut self, name_id: NodeId, fn_expr_id: NodeId) -> Result<NodeId, CompileError> {
        let NodeKind::FunctionExpression { params, body, return_type, .. } = self
            .node(&fn_expr_id)
            .ok_or_else(|| CompileError::Internal("constructor function expression vanished".into()))?
            .kind
            .clone()
        else {
            return Err(CompileError::Internal("constructor did not lower to a FunctionExpression".into()));
        };
        Ok(self.builder.make_node(NodeKind::FunctionDeclaration {
            id: name_id,
            params,
            body,
            return_type,
        }))
    }

    fn synthesize_default_constructor(&mut self, class_name: &str) -> Result<NodeId, CompileError> {
        let name_id = self
            .builder
            .make_synthetic_node(NodeKind::Identifier { name: class_name.to_string() });
        let body_id = self.builder.make_synthetic_node(NodeKind::BlockStatement { body: vec![] });
        Ok(self.builder.make_synthetic_node(NodeKind::FunctionDeclaration {
            id: name_id,
            params: vec![],
            body: body_id,
            return_type: None,
        }))
    }

    /// `C.prototype.m = function...` for instance methods, `C.m =
    /// function...` for static ones.
    fn lower_method_assignment(&mut self, class_name: &str, method_name: &str, fn_id: NodeId, is_static: bool) -> NodeId {
        let class_id = self.builder.make_synthetic_node(NodeKind::Identifier { name: class_name.to_string() });
        let target_object = if is_static {
            class_id
        } else {
            let prototype_key = self.builder.make_synthetic_node(NodeKind::Identifier { name: "prototype".to_string() });
            self.builder.make_synthetic_node(NodeKind::MemberExpression {
                object: class_id,
                property: prototype_key,
                computed: false,
                optional: false,
            })
        };
        let method_key = self.builder.make_synthetic_node(NodeKind::Identifier { name: method_name.to_string() });
        let lhs = self.builder.make_synthetic_node(NodeKind::MemberExpression {
            object: target_object,
            property: method_key,
            computed: false,
            optional: false,
        });
        let assignment = self.builder.make_synthetic_node(NodeKind::AssignmentExpression {
            operator: "=".to_string(),
            left: lhs,
            right: fn_id,
        });
        self.builder.make_synthetic_node(NodeKind::ExpressionStatement { expression: assignment })
    }

    /// `C.__index = Super` (or `= C` for a root class), the hook the
    /// emitter uses to realize prototype-chain lookup.
    fn lower_index_assignment(&mut self, class_name: &str, super_expr: Option<NodeId>) -> NodeId {
        let class_id = self.builder.make_synthetic_node(NodeKind::Identifier { name: class_name.to_string() });
        let index_key = self.builder.make_synthetic_node(NodeKind::Identifier { name: "__index".to_string() });
        let lhs = self.builder.make_synthetic_node(NodeKind::MemberExpression {
            object: class_id,
            property: index_key,
            computed: false,
            optional: false,
        });
        let rhs = super_expr.unwrap_or_else(|| {
            self.builder.make_synthetic_node(NodeKind::Identifier { name: class_name.to_string() })
        });
        let assignment = self.builder.make_synthetic_node(NodeKind::AssignmentExpression {
            operator: "=".to_string(),
            left: lhs,
            right: rhs,
        });
        self.builder.make_synthetic_node(NodeKind::ExpressionStatement { expression: assignment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str, kind: MethodKind, is_static: bool) -> CanonicalNode {
        CanonicalNode::MethodDefinition {
            key: Box::new(CanonicalNode::Identifier { name: name.into() }),
            value: Box::new(CanonicalNode::FunctionExpression {
                id: None,
                params: vec![],
                body: Box::new(CanonicalNode::BlockStatement { body: vec![] }),
                is_async: false,
                is_generator: false,
                return_type: None,
            }),
            method_kind: kind,
            is_static,
            computed: false,
        }
    }

    #[test]
    fn class_with_constructor_and_method_expands_to_multiple_statements() {
        let mut l = Lowerer::new();
        let class = CanonicalNode::ClassDeclaration {
            id: Some(Box::new(CanonicalNode::Identifier { name: "Point".into() })),
            super_class: None,
            body: Box::new(CanonicalNode::ClassBody {
                body: vec![
                    method("constructor", MethodKind::Constructor, false),
                    method("distance", MethodKind::Method, false),
                ],
            }),
        };
        let statements = l.lower_class_declaration(&class).unwrap();
        assert_eq!(statements.len(), 3); // constructor, __index setup, distance method
        assert!(matches!(l.node(&statements[0]).unwrap().kind, NodeKind::FunctionDeclaration { .. }));
        assert!(l.node(&statements[0]).unwrap().meta.class_like);
    }

    #[test]
    fn class_without_explicit_constructor_gets_a_synthetic_one() {
        let mut l = Lowerer::new();
        let class = CanonicalNode::ClassDeclaration {
            id: Some(Box::new(CanonicalNode::Identifier { name: "Empty".into() })),
            super_class: None,
            body: Box::new(CanonicalNode::ClassBody { body: vec![] }),
        };
        let statements = l.lower_class_declaration(&class).unwrap();
        assert_eq!(statements.len(), 2); // synthetic constructor, __index setup
    }

    #[test]
    fn static_method_assigns_directly_on_class_not_prototype() {
        let mut l = Lowerer::new();
        let class = CanonicalNode::ClassDeclaration {
            id: Some(Box::new(CanonicalNode::Identifier { name: "Util".into() })),
            super_class: None,
            body: Box::new(CanonicalNode::ClassBody {
                body: vec![method("make", MethodKind::Method, true)],
            }),
        };
        let statements = l.lower_class_declaration(&class).unwrap();
        // statements[1] is the __index setup; statements[2] is the static assignment.
        let NodeKind::ExpressionStatement { expression } = &l.node(&statements[2]).unwrap().kind else {
            panic!("expected ExpressionStatement");
        };
        let NodeKind::AssignmentExpression { left, .. } = &l.node(expression).unwrap().kind else {
            panic!("expected AssignmentExpression");
        };
        // left is Util.make directly, not Util.prototype.make
        let NodeKind::MemberExpression { object, .. } = &l.node(left).unwrap().kind else {
            panic!("expected MemberExpression");
        };
        assert!(matches!(l.node(object).unwrap().kind, NodeKind::Identifier { .. }));
    }
}
