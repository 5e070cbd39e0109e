//! Converts the parser's raw tree into the canonical ESTree-shaped AST.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use luascript_diagnostic::CompileError;

use crate::ast::{CanonicalNode, Program};
use crate::raw::{identity, RawField, RawRef};
use crate::regex_fallback;
use crate::rewrite::{
    bool_field, child, is_known_type, list, literal_value, method_kind, no_type_annotation,
    property_kind, str_field,
};

/// An alternative, more permissive parser the normalizer may fall back to
/// when the primary parse produced only error sentinels.
/// This core does not ship one — it is an external collaborator supplied
/// by the caller, "if available".
pub trait AlternativeParser {
    fn try_parse(&self, source: &str) -> Option<RawRef>;
}

/// Traversal depth past which the normalizer refuses to recurse further,
/// treating the remainder as an error sentinel. Bounds the recursive
/// descent the source's generator-based traversal performed unbounded
///").
pub const DEFAULT_MAX_DEPTH: usize = 512;

pub struct Normalizer {
    seen: HashMap<usize, CanonicalNode>,
    in_progress: HashSet<usize>,
    max_depth: usize,
    depth: usize,
    had_error_sentinel: bool,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Normalizer {
            seen: HashMap::new(),
            in_progress: HashSet::new(),
            max_depth,
            depth: 0,
            had_error_sentinel: false,
        }
    }

    /// Normalizes `root`, which must be a `Program` node.
    pub fn normalize(&mut self, root: &RawRef) -> Result<Program, CompileError> {
        if root.borrow().node_type != "Program" {
            return Err(CompileError::InvalidInput(format!(
                "expected a Program root, got {}",
                root.borrow().node_type
            )));
        }
        let body_fields = list(&root.borrow(), "body");
        let mut body = Vec::with_capacity(body_fields.len());
        for stmt in &body_fields {
            if let RawField::Node(n) = stmt {
                body.push(self.normalize_node(n));
            }
        }
        Ok(Program { body })
    }

    /// Normalizes with the full fallback chain: if the primary result is
    /// entirely error sentinels, try an alternative parser, then the regex
    /// destructuring recognizer, in that order.
    pub fn normalize_with_fallback(
        &mut self,
        root: &RawRef,
        source: &str,
        alternative: Option<&dyn AlternativeParser>,
        regex_fallback_enabled: bool,
    ) -> Result<Program, CompileError> {
        let primary = self.normalize(root)?;
        if !is_entirely_error_sentinels(&primary) {
            return Ok(primary);
        }
        warn!("normalizer produced only error sentinels; attempting fallback recovery");

        if let Some(alt) = alternative {
            if let Some(alt_root) = alt.try_parse(source) {
                let mut fresh = Normalizer::with_max_depth(self.max_depth);
                if let Ok(recovered) = fresh.normalize(&alt_root) {
                    if !is_entirely_error_sentinels(&recovered) {
                        return Ok(recovered);
                    }
                }
            }
        }

        if regex_fallback_enabled {
            if let Some(statements) = regex_fallback::recognize(source) {
                return Ok(Program { body: statements });
            }
        }

        Ok(primary)
    }

    fn normalize_node(&mut self, raw: &RawRef) -> CanonicalNode {
        let id = identity(raw);
        if let Some(cached) = self.seen.get(&id) {
            return cached.clone();
        }
        if self.in_progress.contains(&id) {
            // True cycle: cut it rather than recurse forever.
            self.had_error_sentinel = true;
            return CanonicalNode::ErrorSentinel {
                reason: "cyclic reference cut during normalization".to_string(),
            };
        }
        if self.depth >= self.max_depth {
            self.had_error_sentinel = true;
            return CanonicalNode::ErrorSentinel {
                reason: format!("exceeded max traversal depth {}", self.max_depth),
            };
        }

        self.in_progress.insert(id);
        self.depth += 1;
        let result = self.rewrite(raw);
        self.depth -= 1;
        self.in_progress.remove(&id);
        self.seen.insert(id, result.clone());
        result
    }

    fn rewrite(&mut self, raw: &RawRef) -> CanonicalNode {
        let node_type = raw.borrow().node_type.clone();
        debug!(node_type = %node_type, "normalizing node");

        if !is_known_type(&node_type) {
            self.had_error_sentinel = true;
            return CanonicalNode::ErrorSentinel {
                reason: format!("unrecognized node type: {node_type}"),
            };
        }

        let raw_ref = raw.borrow();
        match node_type.as_str() {
            "Identifier" => CanonicalNode::Identifier {
                name: str_field(&raw_ref, "name", ""),
            },
            "Literal" => CanonicalNode::Literal {
                value: literal_value(&raw_ref),
                type_annotation: no_type_annotation(),
            },
            "ThisExpression" => CanonicalNode::ThisExpression,
            "Super" => CanonicalNode::Super,
            "BreakStatement" => CanonicalNode::BreakStatement {
                label: raw_ref.fields.get("label").and_then(RawField::as_str).map(str::to_string),
            },
            "ContinueStatement" => CanonicalNode::ContinueStatement {
                label: raw_ref.fields.get("label").and_then(RawField::as_str).map(str::to_string),
            },
            "BinaryExpression" => self.binary_like(&raw_ref, |operator, left, right| {
                CanonicalNode::BinaryExpression { operator, left, right }
            }),
            "LogicalExpression" => self.binary_like(&raw_ref, |operator, left, right| {
                CanonicalNode::LogicalExpression { operator, left, right }
            }),
            "AssignmentExpression" => self.binary_like(&raw_ref, |operator, left, right| {
                CanonicalNode::AssignmentExpression { operator, left, right }
            }),
            "AssignmentPattern" => {
                let left = self.required_child(&raw_ref, "left");
                let right = self.required_child(&raw_ref, "right");
                CanonicalNode::AssignmentPattern {
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            "UpdateExpression" => CanonicalNode::UpdateExpression {
                operator: str_field(&raw_ref, "operator", "++"),
                argument: Box::new(self.required_child(&raw_ref, "argument")),
                prefix: bool_field(&raw_ref, "prefix"),
            },
            "UnaryExpression" => CanonicalNode::UnaryExpression {
                operator: str_field(&raw_ref, "operator", "!"),
                argument: Box::new(self.required_child(&raw_ref, "argument")),
                prefix: bool_field(&raw_ref, "prefix"),
            },
            "ConditionalExpression" => CanonicalNode::ConditionalExpression {
                test: Box::new(self.required_child(&raw_ref, "test")),
                consequent: Box::new(self.required_child(&raw_ref, "consequent")),
                alternate: Box::new(self.required_child(&raw_ref, "alternate")),
            },
            "CallExpression" => CanonicalNode::CallExpression {
                callee: Box::new(self.required_child(&raw_ref, "callee")),
                arguments: self.node_list(&raw_ref, "arguments"),
                optional: bool_field(&raw_ref, "optional"),
            },
            "NewExpression" => CanonicalNode::NewExpression {
                callee: Box::new(self.required_child(&raw_ref, "callee")),
                arguments: self.node_list(&raw_ref, "arguments"),
            },
            "MemberExpression" => CanonicalNode::MemberExpression {
                object: Box::new(self.required_child(&raw_ref, "object")),
                property: Box::new(self.required_child(&raw_ref, "property")),
                computed: bool_field(&raw_ref, "computed"),
                optional: bool_field(&raw_ref, "optional"),
            },
            "ArrayExpression" => CanonicalNode::ArrayExpression {
                elements: self.optional_node_list(&raw_ref, "elements"),
            },
            "ArrayPattern" => CanonicalNode::ArrayPattern {
                elements: self.optional_node_list(&raw_ref, "elements"),
            },
            "ObjectExpression" => CanonicalNode::ObjectExpression {
                properties: self.node_list(&raw_ref, "properties"),
            },
            "ObjectPattern" => CanonicalNode::ObjectPattern {
                properties: self.node_list(&raw_ref, "properties"),
            },
            "Property" => CanonicalNode::Property {
                key: Box::new(self.required_child(&raw_ref, "key")),
                value: Box::new(self.required_child(&raw_ref, "value")),
                computed: bool_field(&raw_ref, "computed"),
                shorthand: bool_field(&raw_ref, "shorthand"),
                property_kind: property_kind(&raw_ref),
            },
            "TemplateLiteral" => CanonicalNode::TemplateLiteral {
                quasis: self.node_list(&raw_ref, "quasis"),
                expressions: self.node_list(&raw_ref, "expressions"),
            },
            "TemplateElement" => {
                let (raw_text, cooked) = match raw_ref.fields.get("value") {
                    Some(RawField::Node(inner)) => {
                        let inner = inner.borrow();
                        (
                            str_field(&inner, "raw", ""),
                            str_field(&inner, "cooked", ""),
                        )
                    }
                    _ => (str_field(&raw_ref, "raw", ""), str_field(&raw_ref, "cooked", "")),
                };
                CanonicalNode::TemplateElement {
                    raw: raw_text,
                    cooked,
                    tail: bool_field(&raw_ref, "tail"),
                }
            }
            "SpreadElement" => CanonicalNode::SpreadElement {
                argument: Box::new(self.required_child(&raw_ref, "argument")),
            },
            "RestElement" => CanonicalNode::RestElement {
                argument: Box::new(self.required_child(&raw_ref, "argument")),
            },
            "ArrowFunctionExpression" | "ArrowFunction" => {
                let params = self.node_list(&raw_ref, "params");
                let raw_body = child(&raw_ref, "body");
                let body = self.arrow_body(raw_body);
                CanonicalNode::ArrowFunctionExpression {
                    params,
                    body: Box::new(body),
                    is_async: bool_field(&raw_ref, "async"),
                    return_type: no_type_annotation(),
                }
            }
            "FunctionExpression" => CanonicalNode::FunctionExpression {
                id: child(&raw_ref, "id").map(|n| Box::new(self.normalize_node(&n))),
                params: self.node_list(&raw_ref, "params"),
                body: Box::new(self.required_child(&raw_ref, "body")),
                is_async: bool_field(&raw_ref, "async"),
                is_generator: bool_field(&raw_ref, "generator"),
                return_type: no_type_annotation(),
            },
            "FunctionDeclaration" => CanonicalNode::FunctionDeclaration {
                id: Box::new(self.required_child(&raw_ref, "id")),
                params: self.node_list(&raw_ref, "params"),
                body: Box::new(self.required_child(&raw_ref, "body")),
                is_async: bool_field(&raw_ref, "async"),
                is_generator: bool_field(&raw_ref, "generator"),
                return_type: no_type_annotation(),
            },
            "VariableDeclaration" => CanonicalNode::VariableDeclaration {
                declarations: self.node_list(&raw_ref, "declarations"),
                declaration_kind: str_field(&raw_ref, "kind", "let"),
            },
            "VariableDeclarator" => CanonicalNode::VariableDeclarator {
                name: Box::new(self.required_child(&raw_ref, "id")),
                init: child(&raw_ref, "init").map(|n| Box::new(self.normalize_node(&n))),
            },
            "BlockStatement" => CanonicalNode::BlockStatement {
                body: self.node_list(&raw_ref, "body"),
            },
            "ExpressionStatement" => CanonicalNode::ExpressionStatement {
                expression: Box::new(self.required_child(&raw_ref, "expression")),
            },
            "ReturnStatement" => CanonicalNode::ReturnStatement {
                argument: child(&raw_ref, "argument").map(|n| Box::new(self.normalize_node(&n))),
            },
            "IfStatement" => CanonicalNode::IfStatement {
                test: Box::new(self.required_child(&raw_ref, "test")),
                consequent: Box::new(self.required_child(&raw_ref, "consequent")),
                alternate: child(&raw_ref, "alternate").map(|n| Box::new(self.normalize_node(&n))),
            },
            "SwitchStatement" => CanonicalNode::SwitchStatement {
                discriminant: Box::new(self.required_child(&raw_ref, "discriminant")),
                cases: self.node_list(&raw_ref, "cases"),
            },
            "SwitchCase" => CanonicalNode::SwitchCase {
                test: child(&raw_ref, "test").map(|n| Box::new(self.normalize_node(&n))),
                consequent: self.node_list(&raw_ref, "consequent"),
            },
            "ForStatement" => CanonicalNode::ForStatement {
                init: child(&raw_ref, "init").map(|n| Box::new(self.normalize_node(&n))),
                test: child(&raw_ref, "test").map(|n| Box::new(self.normalize_node(&n))),
                update: child(&raw_ref, "update").map(|n| Box::new(self.normalize_node(&n))),
                body: Box::new(self.required_child(&raw_ref, "body")),
            },
            "ForOfStatement" => CanonicalNode::ForOfStatement {
                left: Box::new(self.required_child(&raw_ref, "left")),
                right: Box::new(self.required_child(&raw_ref, "right")),
                body: Box::new(self.required_child(&raw_ref, "body")),
                is_await: bool_field(&raw_ref, "await"),
            },
            "ForInStatement" => CanonicalNode::ForInStatement {
                left: Box::new(self.required_child(&raw_ref, "left")),
                right: Box::new(self.required_child(&raw_ref, "right")),
                body: Box::new(self.required_child(&raw_ref, "body")),
            },
            "WhileStatement" => CanonicalNode::WhileStatement {
                test: Box::new(self.required_child(&raw_ref, "test")),
                body: Box::new(self.required_child(&raw_ref, "body")),
            },
            "DoWhileStatement" => CanonicalNode::DoWhileStatement {
                test: Box::new(self.required_child(&raw_ref, "test")),
                body: Box::new(self.required_child(&raw_ref, "body")),
            },
            "ThrowStatement" => CanonicalNode::ThrowStatement {
                argument: Box::new(self.required_child(&raw_ref, "argument")),
            },
            "TryStatement" => CanonicalNode::TryStatement {
                block: Box::new(self.required_child(&raw_ref, "block")),
                handler: child(&raw_ref, "handler").map(|n| Box::new(self.normalize_node(&n))),
                finalizer: child(&raw_ref, "finalizer").map(|n| Box::new(self.normalize_node(&n))),
            },
            "CatchClause" => CanonicalNode::CatchClause {
                param: child(&raw_ref, "param").map(|n| Box::new(self.normalize_node(&n))),
                body: Box::new(self.required_child(&raw_ref, "body")),
            },
            "ClassDeclaration" => CanonicalNode::ClassDeclaration {
                id: child(&raw_ref, "id").map(|n| Box::new(self.normalize_node(&n))),
                super_class: child(&raw_ref, "superClass").map(|n| Box::new(self.normalize_node(&n))),
                body: Box::new(self.required_child(&raw_ref, "body")),
            },
            "ClassExpression" => CanonicalNode::ClassExpression {
                id: child(&raw_ref, "id").map(|n| Box::new(self.normalize_node(&n))),
                super_class: child(&raw_ref, "superClass").map(|n| Box::new(self.normalize_node(&n))),
                body: Box::new(self.required_child(&raw_ref, "body")),
            },
            "ClassBody" => CanonicalNode::ClassBody {
                body: self.node_list(&raw_ref, "body"),
            },
            "MethodDefinition" => CanonicalNode::MethodDefinition {
                key: Box::new(self.required_child(&raw_ref, "key")),
                value: Box::new(self.required_child(&raw_ref, "value")),
                method_kind: method_kind(&raw_ref),
                is_static: bool_field(&raw_ref, "static"),
                computed: bool_field(&raw_ref, "computed"),
            },
            "AwaitExpression" => CanonicalNode::AwaitExpression {
                argument: Box::new(self.required_child(&raw_ref, "argument")),
            },
            "YieldExpression" => CanonicalNode::YieldExpression {
                argument: child(&raw_ref, "argument").map(|n| Box::new(self.normalize_node(&n))),
                delegate: bool_field(&raw_ref, "delegate"),
            },
            "Program" => {
                // A nested Program is not itself a valid child slot; treat
                // its body as an (unlikely) block.
                CanonicalNode::BlockStatement {
                    body: self.node_list(&raw_ref, "body"),
                }
            }
            _ => unreachable!("is_known_type guards every handled variant above"),
        }
    }

    fn binary_like(
        &mut self,
        raw_ref: &crate::raw::RawNode,
        make: impl FnOnce(String, Box<CanonicalNode>, Box<CanonicalNode>) -> CanonicalNode,
    ) -> CanonicalNode {
        let operator = str_field(raw_ref, "operator", "+");
        let left = self.required_child(raw_ref, "left");
        let right = self.required_child(raw_ref, "right");
        make(operator, Box::new(left), Box::new(right))
    }

    fn required_child(&mut self, raw_ref: &crate::raw::RawNode, name: &str) -> CanonicalNode {
        match child(raw_ref, name) {
            Some(n) => self.normalize_node(&n),
            None => {
                self.had_error_sentinel = true;
                CanonicalNode::ErrorSentinel {
                    reason: format!("missing required field {name:?} on {}", raw_ref.node_type),
                }
            }
        }
    }

    fn node_list(&mut self, raw_ref: &crate::raw::RawNode, name: &str) -> Vec<CanonicalNode> {
        list(raw_ref, name)
            .into_iter()
            .filter_map(|f| match f {
                RawField::Node(n) => Some(self.normalize_node(&n)),
                _ => None,
            })
            .collect()
    }

    fn optional_node_list(
        &mut self,
        raw_ref: &crate::raw::RawNode,
        name: &str,
    ) -> Vec<Option<CanonicalNode>> {
        list(raw_ref, name)
            .into_iter()
            .map(|f| match f {
                RawField::Node(n) => Some(self.normalize_node(&n)),
                RawField::Null => None,
                _ => None,
            })
            .collect()
    }

    /// Arrow functions with an expression body are rewrapped as a
    /// `BlockStatement` containing a single `ReturnStatement`.
    fn arrow_body(&mut self, raw_body: Option<RawRef>) -> CanonicalNode {
        let Some(raw_body) = raw_body else {
            return CanonicalNode::BlockStatement { body: vec![] };
        };
        if raw_body.borrow().node_type == "BlockStatement" {
            return self.normalize_node(&raw_body);
        }
        let expr = self.normalize_node(&raw_body);
        CanonicalNode::BlockStatement {
            body: vec![CanonicalNode::ReturnStatement {
                argument: Some(Box::new(expr)),
            }],
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_entirely_error_sentinels(program: &Program) -> bool {
    !program.body.is_empty() && program.body.iter().all(CanonicalNode::is_error_sentinel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{RawField, RawNode};

    fn ident(name: &str) -> RawRef {
        RawNode::new("Identifier").with_field("name", RawField::Str(name.into()))
    }

    #[test]
    fn rejects_non_program_root() {
        let root = ident("x");
        let mut n = Normalizer::new();
        assert!(n.normalize(&root).is_err());
    }

    #[test]
    fn normalizes_simple_binary_expression_program() {
        let bin = RawNode::new("BinaryExpression")
            .with_field("operator", RawField::Str("+".into()))
            .with_field("left", RawField::node(ident("a")))
            .with_field("right", RawField::node(ident("b")));
        let expr_stmt = RawNode::new("ExpressionStatement")
            .with_field("expression", RawField::node(bin));
        let program = RawNode::new("Program")
            .with_field("body", RawField::List(vec![RawField::node(expr_stmt)]));

        let mut n = Normalizer::new();
        let result = n.normalize(&program).unwrap();
        assert_eq!(result.body.len(), 1);
        assert_eq!(result.body[0].type_tag(), "ExpressionStatement");
    }

    #[test]
    fn arrow_expression_body_is_rewrapped_in_block_return() {
        let arrow = RawNode::new("ArrowFunctionExpression")
            .with_field("params", RawField::List(vec![]))
            .with_field("body", RawField::node(ident("x")))
            .with_field("async", RawField::Bool(false));
        let stmt = RawNode::new("ExpressionStatement").with_field("expression", RawField::node(arrow));
        let program = RawNode::new("Program").with_field("body", RawField::List(vec![RawField::node(stmt)]));

        let mut n = Normalizer::new();
        let result = n.normalize(&program).unwrap();
        let CanonicalNode::ExpressionStatement { expression } = &result.body[0] else {
            panic!("expected ExpressionStatement");
        };
        let CanonicalNode::ArrowFunctionExpression { body, .. } = expression.as_ref() else {
            panic!("expected ArrowFunctionExpression");
        };
        match body.as_ref() {
            CanonicalNode::BlockStatement { body } => {
                assert_eq!(body.len(), 1);
                assert_eq!(body[0].type_tag(), "ReturnStatement");
            }
            other => panic!("expected BlockStatement, got {other:?}"),
        }
    }

    #[test]
    fn shared_subtree_is_visited_once_and_reused() {
        let shared = ident("shared");
        let left = RawNode::new("ExpressionStatement").with_field("expression", RawField::node(Rc_clone(&shared)));
        let right = RawNode::new("ExpressionStatement").with_field("expression", RawField::node(Rc_clone(&shared)));
        let program = RawNode::new("Program")
            .with_field("body", RawField::List(vec![RawField::node(left), RawField::node(right)]));

        let mut n = Normalizer::new();
        let result = n.normalize(&program).unwrap();
        assert_eq!(result.body.len(), 2);
    }

    fn Rc_clone(r: &RawRef) -> RawRef {
        std::rc::Rc::clone(r)
    }

    #[test]
    fn unknown_node_type_becomes_error_sentinel() {
        let weird = RawNode::new("BigIntLiteral").with_field("value", RawField::Str("1n".into()));
        let stmt = RawNode::new("ExpressionStatement").with_field("expression", RawField::node(weird));
        let program = RawNode::new("Program").with_field("body", RawField::List(vec![RawField::node(stmt)]));

        let mut n = Normalizer::new();
        let result = n.normalize(&program).unwrap();
        let CanonicalNode::ExpressionStatement { expression } = &result.body[0] else {
            panic!("expected ExpressionStatement");
        };
        assert!(expression.is_error_sentinel());
    }

    #[test]
    fn fallback_recovers_destructuring_when_primary_is_all_sentinels() {
        let weird = RawNode::new("WeirdThing");
        let stmt = RawNode::new("ExpressionStatement").with_field("expression", RawField::node(weird));
        let program = RawNode::new("Program").with_field("body", RawField::List(vec![RawField::node(stmt)]));

        let mut n = Normalizer::new();
        let result = n
            .normalize_with_fallback(&program, "const [a, b] = arr;", None, true)
            .unwrap();
        assert_eq!(result.body.len(), 1);
        assert_eq!(result.body[0].type_tag(), "VariableDeclaration");
    }
}
