//! Function lowering: scope push/pop, parameter binding, and per-function
//! CFG construction.

use luascript_ast::CanonicalNode;
use luascript_diagnostic::CompileError;
use luascript_ir::{BasicBlock, BlockKind, CfgRef, ControlFlowGraph, Meta, NodeId, NodeKind};

use crate::lowerer::Lowerer;

impl Lowerer {
    pub(crate) fn lower_function_declaration(&mut self, node: &CanonicalNode) -> Result<NodeId, CompileError> {
        let CanonicalNode::FunctionDeclaration {
            id,
            params,
            body,
            is_async,
            is_generator,
            return_type,
        } = node
        else {
            return Err(CompileError::Internal(
                "lower_function_declaration called with a non-FunctionDeclaration node".into(),
            ));
        };

        let CanonicalNode::BlockStatement { body: body_stmts } = body.as_ref() else {
            return Err(CompileError::UnsupportedConstruct {
                type_name: "function body that is not a BlockStatement".into(),
            });
        };

        self.scopes.push();
        let name_id = self.lower_pattern(id)?;
        let params = self.lower_params(params)?;
        let body_ids = self.lower_stmt_list(body_stmts)?;
        self.scopes.pop();

        let body_id = self.builder.make_node(NodeKind::BlockStatement { body: body_ids.clone() });
        let cfg_ref = self.build_function_cfg(&body_ids);

        let kind = if *is_async {
            NodeKind::AsyncFunctionDeclaration {
                id: name_id,
                params,
                body: body_id,
                is_generator: *is_generator,
                return_type: return_type.clone(),
            }
        } else if *is_generator {
            NodeKind::GeneratorDeclaration {
                id: name_id,
                params,
                body: body_id,
                return_type: return_type.clone(),
            }
        } else {
            NodeKind::FunctionDeclaration {
                id: name_id,
                params,
                body: body_id,
                return_type: return_type.clone(),
            }
        };

        let fn_id = self.builder.make_node(kind);
        self.builder.set_meta(
            &fn_id,
            Meta {
                cfg: Some(cfg_ref),
                ..Meta::default()
            },
        );
        Ok(fn_id)
    }

    pub(crate) fn lower_function_expression(&mut self, node: &CanonicalNode) -> Result<NodeId, CompileError> {
        let CanonicalNode::FunctionExpression {
            id,
            params,
            body,
            is_async,
            is_generator,
            return_type,
        } = node
        else {
            return Err(CompileError::Internal(
                "lower_function_expression called with a non-FunctionExpression node".into(),
            ));
        };

        let CanonicalNode::BlockStatement { body: body_stmts } = body.as_ref() else {
            return Err(CompileError::UnsupportedConstruct {
                type_name: "function expression body that is not a BlockStatement".into(),
            });
        };

        self.scopes.push();
        let name_id = match id {
            Some(id_node) => Some(self.lower_pattern(id_node)?),
            None => None,
        };
        let params = self.lower_params(params)?;
        let body_ids = self.lower_stmt_list(body_stmts)?;
        self.scopes.pop();

        let body_id = self.builder.make_node(NodeKind::BlockStatement { body: body_ids.clone() });
        let cfg_ref = self.build_function_cfg(&body_ids);

        let fn_id = self.builder.make_node(NodeKind::FunctionExpression {
            id: name_id,
            params,
            body: body_id,
            is_async: *is_async,
            is_generator: *is_generator,
            return_type: return_type.clone(),
        });
        self.builder.set_meta(
            &fn_id,
            Meta {
                cfg: Some(cfg_ref),
                ..Meta::default()
            },
        );
        Ok(fn_id)
    }

    /// Arrow functions carry no name slot of their own; anonymous arrows used
    /// as statement expressions are given a synthetic name at the point of
    /// use, not here.
    pub(crate) fn lower_arrow_function(&mut self, node: &CanonicalNode) -> Result<NodeId, CompileError> {
        let CanonicalNode::ArrowFunctionExpression {
            params,
            body,
            is_async,
            return_type,
        } = node
        else {
            return Err(CompileError::Internal(
                "lower_arrow_function called with a non-ArrowFunctionExpression node".into(),
            ));
        };

        let CanonicalNode::BlockStatement { body: body_stmts } = body.as_ref() else {
            return Err(CompileError::UnsupportedConstruct {
                type_name: "arrow function body that is not a BlockStatement".into(),
            });
        };

        self.scopes.push();
        let params = self.lower_params(params)?;
        let body_ids = self.lower_stmt_list(body_stmts)?;
        self.scopes.pop();

        let body_id = self.builder.make_node(NodeKind::BlockStatement { body: body_ids.clone() });
        let cfg_ref = self.build_function_cfg(&body_ids);

        let fn_id = self.builder.make_node(NodeKind::ArrowFunctionExpression {
            params,
            body: body_id,
            is_async: *is_async,
            return_type: return_type.clone(),
        });
        self.builder.set_meta(
            &fn_id,
            Meta {
                cfg: Some(cfg_ref),
                ..Meta::default()
            },
        );
        Ok(fn_id)
    }

    fn lower_params(&mut self, params: &[CanonicalNode]) -> Result<Vec<NodeId>, CompileError> {
        params.iter().map(|p| self.lower_param(p)).collect()
    }

    /// A parameter with a default is a top-level `AssignmentPattern` in the
    /// canonical AST; it becomes a `Parameter{pattern, default}` node so
    /// default handling is uniform regardless of whether the pattern itself
    /// destructures.
    fn lower_param(&mut self, param: &CanonicalNode) -> Result<NodeId, CompileError> {
        let (pattern_node, default) = match param {
            CanonicalNode::AssignmentPattern { left, right } => (left.as_ref(), Some(right.as_ref())),
            other => (other, None),
        };
        self.declare_pattern_bindings(pattern_node);
        let pattern = self.lower_pattern(pattern_node)?;
        let default = match default {
            Some(d) => Some(self.lower_expr(d)?),
            None => None,
        };
        Ok(self.builder.make_node(NodeKind::Parameter {
            pattern,
            default,
            type_annotation: None,
        }))
    }

    /// One entry block containing the full body, one exit block, a single
    /// `entry -> exit` edge.
    fn build_function_cfg(&mut self, body_ids: &[NodeId]) -> CfgRef {
        let cfg_id = self.builder.new_cfg_id();
        let entry_id = self.builder.next_id(luascript_ir::PREFIX_BB);
        let exit_id = self.builder.next_id(luascript_ir::PREFIX_BB);

        let mut cfg = ControlFlowGraph {
            id: cfg_id.clone(),
            entry: entry_id.clone(),
            exit: exit_id.clone(),
            blocks: vec![
                BasicBlock {
                    id: entry_id.clone(),
                    kind: BlockKind::Entry,
                    statements: body_ids.to_vec(),
                },
                BasicBlock {
                    id: exit_id.clone(),
                    kind: BlockKind::Exit,
                    statements: vec![],
                },
            ],
            successors: Default::default(),
            predecessors: Default::default(),
        };
        cfg.add_edge(entry_id.clone(), exit_id.clone());
        self.builder.insert_cfg(cfg);

        CfgRef { id: cfg_id, entry: entry_id, exit: exit_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_function() -> CanonicalNode {
        CanonicalNode::FunctionDeclaration {
            id: Box::new(CanonicalNode::Identifier { name: "f".into() }),
            params: vec![CanonicalNode::Identifier { name: "x".into() }],
            body: Box::new(CanonicalNode::BlockStatement {
                body: vec![CanonicalNode::ReturnStatement {
                    argument: Some(Box::new(CanonicalNode::Identifier { name: "x".into() })),
                }],
            }),
            is_async: false,
            is_generator: false,
            return_type: None,
        }
    }

    #[test]
    fn function_declaration_gets_entry_exit_cfg() {
        let mut l = Lowerer::new();
        let id = l.lower_function_declaration(&simple_function()).unwrap();
        let node = l.node(&id).unwrap();
        let cfg_ref = node.meta.cfg.clone().expect("expected meta.cfg");
        assert_ne!(cfg_ref.entry, cfg_ref.exit);
    }

    #[test]
    fn async_flag_selects_async_function_declaration_kind() {
        let mut l = Lowerer::new();
        let mut f = simple_function();
        if let CanonicalNode::FunctionDeclaration { is_async, .. } = &mut f {
            *is_async = true;
        }
        let id = l.lower_function_declaration(&f).unwrap();
        assert!(matches!(
            l.node(&id).unwrap().kind,
            NodeKind::AsyncFunctionDeclaration { .. }
        ));
    }

    #[test]
    fn generator_flag_selects_generator_declaration_kind() {
        let mut l = Lowerer::new();
        let mut f = simple_function();
        if let CanonicalNode::FunctionDeclaration { is_generator, .. } = &mut f {
            *is_generator = true;
        }
        let id = l.lower_function_declaration(&f).unwrap();
        assert!(matches!(l.node(&id).unwrap().kind, NodeKind::GeneratorDeclaration { .. }));
    }

    #[test]
    fn parameter_with_default_becomes_parameter_node() {
        let mut l = Lowerer::new();
        let mut f = simple_function();
        if let CanonicalNode::FunctionDeclaration { params, .. } = &mut f {
            params[0] = CanonicalNode::AssignmentPattern {
                left: Box::new(CanonicalNode::Identifier { name: "x".into() }),
                right: Box::new(CanonicalNode::Literal {
                    value: luascript_ir::LiteralValue::Number(1.0),
                    type_annotation: None,
                }),
            };
        }
        let id = l.lower_function_declaration(&f).unwrap();
        let NodeKind::FunctionDeclaration { params, .. } = &l.node(&id).unwrap().kind else {
            panic!("expected FunctionDeclaration");
        };
        let NodeKind::Parameter { default, .. } = &l.node(&params[0]).unwrap().kind else {
            panic!("expected Parameter");
        };
        assert!(default.is_some());
    }
}
