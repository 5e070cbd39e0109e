//! Statement lowering, including the switch → if/else-if/else rewrite.

use luascript_ast::CanonicalNode;
use luascript_diagnostic::CompileError;
use luascript_ir::{NodeId, NodeKind};

use crate::lowerer::{flatten, Lowerer};

impl Lowerer {
    /// Lowers a statement list, flattening the occasional one-to-many
    /// expansion (classes) into the parent block's body.
    pub(crate) fn lower_stmt_list(&mut self, stmts: &[CanonicalNode]) -> Result<Vec<NodeId>, CompileError> {
        let mut groups = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            groups.push(self.lower_stmt_multi(stmt)?);
        }
        Ok(flatten(groups))
    }

    fn lower_stmt_multi(&mut self, stmt: &CanonicalNode) -> Result<Vec<NodeId>, CompileError> {
        match stmt {
            CanonicalNode::ClassDeclaration { .. } => self.lower_class_declaration(stmt),
            other => Ok(vec![self.lower_stmt(other)?]),
        }
    }

    fn lower_stmt(&mut self, stmt: &CanonicalNode) -> Result<NodeId, CompileError> {
        let kind = match stmt {
            CanonicalNode::VariableDeclaration { declarations, declaration_kind } => {
                let declarations = declarations
                    .iter()
                    .map(|d| self.lower_variable_declarator(d, declaration_kind))
                    .collect::<Result<Vec<_>, _>>()?;
                NodeKind::VariableDeclaration { declarations, declaration_kind: declaration_kind.clone() }
            }
            CanonicalNode::BlockStatement { body } => {
                self.scopes.push();
                let body = self.lower_stmt_list(body)?;
                self.scopes.pop();
                NodeKind::BlockStatement { body }
            }
            CanonicalNode::ExpressionStatement { expression } => {
                let expression = self.lower_expr(expression)?;
                NodeKind::ExpressionStatement { expression }
            }
            CanonicalNode::ReturnStatement { argument } => {
                let argument = match argument {
                    Some(a) => Some(self.lower_expr(a)?),
                    None => None,
                };
                NodeKind::ReturnStatement { argument }
            }
            CanonicalNode::IfStatement { test, consequent, alternate } => {
                let test = self.lower_expr(test)?;
                let consequent = self.lower_stmt(consequent)?;
                let alternate = match alternate {
                    Some(a) => Some(self.lower_stmt(a)?),
                    None => None,
                };
                NodeKind::IfStatement { test, consequent, alternate }
            }
            CanonicalNode::SwitchStatement { .. } => return self.lower_switch(stmt),
            CanonicalNode::ForStatement { init, test, update, body } => {
                self.scopes.push();
                let init = match init {
                    Some(i) => Some(self.lower_for_init(i)?),
                    None => None,
                };
                let test = match test {
                    Some(t) => Some(self.lower_expr(t)?),
                    None => None,
                };
                let update = match update {
                    Some(u) => Some(self.lower_expr(u)?),
                    None => None,
                };
                let body = self.lower_stmt(body)?;
                self.scopes.pop();
                NodeKind::ForStatement { init, test, update, body }
            }
            CanonicalNode::ForOfStatement { left, right, body, is_await } => {
                self.scopes.push();
                self.declare_pattern_bindings(left);
                let left = self.lower_for_head_target(left)?;
                let right = self.lower_expr(right)?;
                let body = self.lower_stmt(body)?;
                self.scopes.pop();
                NodeKind::ForOfStatement { left, right, body, is_await: *is_await }
            }
            CanonicalNode::ForInStatement { left, right, body } => {
                self.scopes.push();
                self.declare_pattern_bindings(left);
                let left = self.lower_for_head_target(left)?;
                let right = self.lower_expr(right)?;
                let body = self.lower_stmt(body)?;
                self.scopes.pop();
                NodeKind::ForInStatement { left, right, body }
            }
            CanonicalNode::WhileStatement { test, body } => {
                let test = self.lower_expr(test)?;
                let body = self.lower_stmt(body)?;
                NodeKind::WhileStatement { test, body }
            }
            CanonicalNode::DoWhileStatement { test, body } => {
                let body = self.lower_stmt(body)?;
                let test = self.lower_expr(test)?;
                NodeKind::DoWhileStatement { test, body }
            }
            CanonicalNode::BreakStatement { label } => NodeKind::BreakStatement { label: label.clone() },
            CanonicalNode::ContinueStatement { label } => NodeKind::ContinueStatement { label: label.clone() },
            CanonicalNode::ThrowStatement { argument } => {
                let argument = self.lower_expr(argument)?;
                NodeKind::ThrowStatement { argument }
            }
            CanonicalNode::TryStatement { block, handler, finalizer } => {
                let block = self.lower_stmt(block)?;
                let handler = match handler {
                    Some(h) => Some(self.lower_catch_clause(h)?),
                    None => None,
                };
                let finalizer = match finalizer {
                    Some(f) => Some(self.lower_stmt(f)?),
                    None => None,
                };
                NodeKind::TryStatement { block, handler, finalizer }
            }
            CanonicalNode::FunctionDeclaration { .. } => return self.lower_function_declaration(stmt),
            other => {
                return Err(CompileError::UnsupportedConstruct {
                    type_name: other.type_tag().to_string(),
                })
            }
        };
        Ok(self.builder.make_node(kind))
    }

    fn lower_catch_clause(&mut self, node: &CanonicalNode) -> Result<NodeId, CompileError> {
        let CanonicalNode::CatchClause { param, body } = node else {
            return Err(CompileError::Internal("lower_catch_clause called with a non-CatchClause node".into()));
        };
        self.scopes.push();
        let param = match param {
            Some(p) => {
                self.declare_pattern_bindings(p);
                Some(self.lower_pattern(p)?)
            }
            None => None,
        };
        let body = self.lower_stmt(body)?;
        self.scopes.pop();
        Ok(self.builder.make_node(NodeKind::CatchClause { param, body }))
    }

    fn lower_variable_declarator(&mut self, node: &CanonicalNode, declaration_kind: &str) -> Result<NodeId, CompileError> {
        let CanonicalNode::VariableDeclarator { name, init } = node else {
            return Err(CompileError::Internal(
                "lower_variable_declarator called with a non-VariableDeclarator node".into(),
            ));
        };
        self.declare_pattern_bindings(name);
        let name = self.lower_pattern(name)?;
        let init = match init {
            Some(i) => Some(self.lower_expr(i)?),
            None => None,
        };
        Ok(self.builder.make_node(NodeKind::VariableDeclarator {
            name,
            init,
            var_kind: declaration_kind.to_string(),
        }))
    }

    /// A `for(;;)` init clause is either a fresh `VariableDeclaration` or a
    /// bare expression (e.g. `i = 0`), never wrapped in an
    /// `ExpressionStatement` by the normalizer.
    fn lower_for_init(&mut self, node: &CanonicalNode) -> Result<NodeId, CompileError> {
        match node {
            CanonicalNode::VariableDeclaration { .. } => self.lower_stmt(node),
            _ => self.lower_expr(node),
        }
    }

    /// `for-of`/`for-in` heads bind either a fresh declaration
    /// (`VariableDeclaration`) or an existing assignment target; both are
    /// valid left-hand sides structurally.
    fn lower_for_head_target(&mut self, node: &CanonicalNode) -> Result<NodeId, CompileError> {
        match node {
            CanonicalNode::VariableDeclaration { .. } => self.lower_stmt(node),
            _ => self.lower_pattern(node),
        }
    }

    /// Rewrites `switch (d) { case a: X; case b: Y; default: Z }` into
    /// `if (d === a) { X } else if (d === b) { Y } else { Z }`, preserving
    /// source case order and treating the default (if any) as the final
    /// else branch. Fallthrough between cases is not supported — each
    /// case's consequent becomes one block.
    fn lower_switch(&mut self, stmt: &CanonicalNode) -> Result<NodeId, CompileError> {
        let CanonicalNode::SwitchStatement { discriminant, cases } = stmt else {
            return Err(CompileError::Internal("lower_switch called with a non-SwitchStatement node".into()));
        };

        self.scopes.push();
        let discriminant_id = self.lower_expr(discriminant)?;

        let mut default_body: Option<Vec<NodeId>> = None;
        let mut arms: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
        for case in cases {
            let CanonicalNode::SwitchCase { test, consequent } = case else {
                return Err(CompileError::UnsupportedConstruct {
                    type_name: format!("switch arm of shape {:?}", case.type_tag()),
                });
            };
            let consequent_ids = self.lower_stmt_list(consequent)?;
            match test {
                Some(t) => {
                    let test_id = self.lower_expr(t)?;
                    arms.push((test_id, consequent_ids));
                }
                None => default_body = Some(consequent_ids),
            }
        }
        self.scopes.pop();

        let mut chain: Option<NodeId> = default_body.map(|body| self.builder.make_synthetic_node(NodeKind::BlockStatement { body }));

        for (test_id, consequent_ids) in arms.into_iter().rev() {
            let equality = self.builder.make_synthetic_node(NodeKind::BinaryExpression {
                operator: "===".to_string(),
                left: discriminant_id.clone(),
                right: test_id,
            });
            let consequent_block = self.builder.make_synthetic_node(NodeKind::BlockStatement { body: consequent_ids });
            let if_node = self.builder.make_synthetic_node(NodeKind::IfStatement {
                test: equality,
                consequent: consequent_block,
                alternate: chain,
            });
            chain = Some(if_node);
        }

        Ok(chain.unwrap_or_else(|| self.builder.make_synthetic_node(NodeKind::BlockStatement { body: vec![] })))
    }
}
