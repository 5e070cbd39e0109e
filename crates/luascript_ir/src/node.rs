//! The closed set of IR node kinds.
//!
//! Child references are node ids (`String`s), never embedded objects
//! — this makes the IR a directed graph with explicit edges,
//! enabling graph rewrites (the Extension Registry's transforms) without
//! deep copies. Dispatch on `kind` is exhaustive pattern matching over this
//! enum rather than a string-keyed switch.

use serde::{Deserialize, Serialize};

use crate::doc::Doc;
use crate::ty::Type;

pub type NodeId = String;

bitflags::bitflags! {
    /// Generic per-node flags, independent of kind-specific fields like
    /// `optional` on `MemberExpression`.
    #[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct NodeFlags: u8 {
        /// Introduced by the lowerer or a transform, not present in source
        /// (e.g. a destructuring temp). Suppressed from `emitDebugInfo`
        /// source maps.
        const SYNTHETIC = 0b0000_0001;
        /// Marked for removal by a compatibility-mode transform rollback;
        /// retained until the next validator pass confirms safety.
        const PENDING_REMOVAL = 0b0000_0010;
    }
}

/// Arbitrary auxiliary metadata attached to a node.
///
/// Most nodes carry no metadata. The two structured uses named by the spec
/// — `meta.cfg` on a function declaration and `meta.classLike` on a
/// constructor — get their own typed fields so they don't round-trip
/// through a loosely-typed map; everything else a transform wants to stash
/// goes in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfg: Option<CfgRef>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub class_like: bool,
    #[serde(default, skip_serializing_if = "BTreeIsEmpty::is_empty")]
    pub extra: std::collections::BTreeMap<String, serde_json::Value>,
}

/// Helper trait so `#[serde(skip_serializing_if)]` can call `.is_empty()`
/// on the `extra` map without importing a concrete type at each call site.
trait BTreeIsEmpty {
    fn is_empty(&self) -> bool;
}
impl<K, V> BTreeIsEmpty for std::collections::BTreeMap<K, V> {
    fn is_empty(&self) -> bool {
        std::collections::BTreeMap::is_empty(self)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CfgRef {
    pub id: String,
    pub entry: String,
    pub exit: String,
}

/// A fully-realized IR node: identity plus kind-specific payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<luascript_diagnostic::Span>,
    #[serde(default, skip_serializing_if = "NodeFlags::is_empty")]
    pub flags: NodeFlags,
    #[serde(default)]
    pub doc: Doc,
    #[serde(default, skip_serializing_if = "is_default_meta")]
    pub meta: Meta,
}

fn is_default_meta(m: &Meta) -> bool {
    m == &Meta::default()
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

/// The closed set of node kinds, tagged by `kind` in the
/// serialized form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NodeKind {
    Identifier {
        name: String,
    },
    Literal {
        value: LiteralValue,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        type_annotation: Option<Type>,
    },
    BinaryExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    LogicalExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    AssignmentExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    UpdateExpression {
        operator: String,
        argument: NodeId,
        prefix: bool,
    },
    ConditionalExpression {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    UnaryExpression {
        operator: String,
        argument: NodeId,
        prefix: bool,
    },
    CallExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
        optional: bool,
    },
    NewExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    MemberExpression {
        object: NodeId,
        property: NodeId,
        computed: bool,
        optional: bool,
    },
    ArrayExpression {
        elements: Vec<Option<NodeId>>,
    },
    ObjectExpression {
        properties: Vec<NodeId>,
    },
    Property {
        key: NodeId,
        value: NodeId,
        computed: bool,
        shorthand: bool,
        property_kind: PropertyKind,
    },
    TemplateLiteral {
        quasis: Vec<NodeId>,
        expressions: Vec<NodeId>,
    },
    TemplateElement {
        raw: String,
        cooked: String,
        tail: bool,
    },
    SpreadElement {
        argument: NodeId,
    },
    ArrowFunctionExpression {
        params: Vec<NodeId>,
        body: NodeId,
        is_async: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<Type>,
    },
    FunctionExpression {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<NodeId>,
        params: Vec<NodeId>,
        body: NodeId,
        is_async: bool,
        is_generator: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<Type>,
    },
    FunctionDeclaration {
        id: NodeId,
        params: Vec<NodeId>,
        body: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<Type>,
    },
    AsyncFunctionDeclaration {
        id: NodeId,
        params: Vec<NodeId>,
        body: NodeId,
        is_generator: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<Type>,
    },
    GeneratorDeclaration {
        id: NodeId,
        params: Vec<NodeId>,
        body: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<Type>,
    },
    VariableDeclaration {
        declarations: Vec<NodeId>,
        declaration_kind: String,
    },
    VariableDeclarator {
        name: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        init: Option<NodeId>,
        var_kind: String,
    },
    BlockStatement {
        body: Vec<NodeId>,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    ReturnStatement {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        argument: Option<NodeId>,
    },
    IfStatement {
        test: NodeId,
        consequent: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alternate: Option<NodeId>,
    },
    SwitchStatement {
        discriminant: NodeId,
        cases: Vec<NodeId>,
    },
    SwitchCase {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        test: Option<NodeId>,
        consequent: Vec<NodeId>,
    },
    ForStatement {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        init: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        test: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        update: Option<NodeId>,
        body: NodeId,
    },
    ForOfStatement {
        left: NodeId,
        right: NodeId,
        body: NodeId,
        is_await: bool,
    },
    ForInStatement {
        left: NodeId,
        right: NodeId,
        body: NodeId,
    },
    WhileStatement {
        test: NodeId,
        body: NodeId,
    },
    DoWhileStatement {
        test: NodeId,
        body: NodeId,
    },
    BreakStatement {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    ContinueStatement {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    ThrowStatement {
        argument: NodeId,
    },
    TryStatement {
        block: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        handler: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        finalizer: Option<NodeId>,
    },
    CatchClause {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        param: Option<NodeId>,
        body: NodeId,
    },
    ClassDeclaration {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        super_class: Option<NodeId>,
        body: NodeId,
    },
    ClassExpression {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        super_class: Option<NodeId>,
        body: NodeId,
    },
    ClassBody {
        body: Vec<NodeId>,
    },
    MethodDefinition {
        key: NodeId,
        value: NodeId,
        method_kind: MethodKind,
        is_static: bool,
        computed: bool,
    },
    ObjectPattern {
        properties: Vec<NodeId>,
    },
    ArrayPattern {
        elements: Vec<Option<NodeId>>,
    },
    RestElement {
        argument: NodeId,
    },
    AssignmentPattern {
        left: NodeId,
        right: NodeId,
    },
    ThisExpression {},
    Super {},
    AwaitExpression {
        argument: NodeId,
    },
    YieldExpression {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        argument: Option<NodeId>,
        delegate: bool,
    },
    Parameter {
        pattern: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        type_annotation: Option<Type>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "literalKind", content = "raw")]
pub enum LiteralValue {
    Null,
    Undefined,
    Bool(bool),
    /// Stored as bits so the overall node stays `PartialEq`/hashable-free
    /// without pulling in a float-ordering crate
    Number(f64),
    Str(String),
    Regex { pattern: String, flags: String },
}

impl NodeKind {
    /// The `kind` tag as it appears in the serialized form.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::LogicalExpression { .. } => "LogicalExpression",
            NodeKind::AssignmentExpression { .. } => "AssignmentExpression",
            NodeKind::UpdateExpression { .. } => "UpdateExpression",
            NodeKind::ConditionalExpression { .. } => "ConditionalExpression",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::CallExpression { .. } => "CallExpression",
            NodeKind::NewExpression { .. } => "NewExpression",
            NodeKind::MemberExpression { .. } => "MemberExpression",
            NodeKind::ArrayExpression { .. } => "ArrayExpression",
            NodeKind::ObjectExpression { .. } => "ObjectExpression",
            NodeKind::Property { .. } => "Property",
            NodeKind::TemplateLiteral { .. } => "TemplateLiteral",
            NodeKind::TemplateElement { .. } => "TemplateElement",
            NodeKind::SpreadElement { .. } => "SpreadElement",
            NodeKind::ArrowFunctionExpression { .. } => "ArrowFunctionExpression",
            NodeKind::FunctionExpression { .. } => "FunctionExpression",
            NodeKind::FunctionDeclaration { .. } => "FunctionDeclaration",
            NodeKind::AsyncFunctionDeclaration { .. } => "AsyncFunctionDeclaration",
            NodeKind::GeneratorDeclaration { .. } => "GeneratorDeclaration",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::VariableDeclarator { .. } => "VariableDeclarator",
            NodeKind::BlockStatement { .. } => "BlockStatement",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::SwitchCase { .. } => "SwitchCase",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::ForOfStatement { .. } => "ForOfStatement",
            NodeKind::ForInStatement { .. } => "ForInStatement",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::DoWhileStatement { .. } => "DoWhileStatement",
            NodeKind::BreakStatement { .. } => "BreakStatement",
            NodeKind::ContinueStatement { .. } => "ContinueStatement",
            NodeKind::ThrowStatement { .. } => "ThrowStatement",
            NodeKind::TryStatement { .. } => "TryStatement",
            NodeKind::CatchClause { .. } => "CatchClause",
            NodeKind::ClassDeclaration { .. } => "ClassDeclaration",
            NodeKind::ClassExpression { .. } => "ClassExpression",
            NodeKind::ClassBody { .. } => "ClassBody",
            NodeKind::MethodDefinition { .. } => "MethodDefinition",
            NodeKind::ObjectPattern { .. } => "ObjectPattern",
            NodeKind::ArrayPattern { .. } => "ArrayPattern",
            NodeKind::RestElement { .. } => "RestElement",
            NodeKind::AssignmentPattern { .. } => "AssignmentPattern",
            NodeKind::ThisExpression {} => "ThisExpression",
            NodeKind::Super {} => "Super",
            NodeKind::AwaitExpression { .. } => "AwaitExpression",
            NodeKind::YieldExpression { .. } => "YieldExpression",
            NodeKind::Parameter { .. } => "Parameter",
        }
    }

    /// All child node ids referenced directly by this node (not
    /// transitively), in a stable order. Used by the validator for
    /// referential-closure and acyclicity checks, and by traversal utilities.
    pub fn child_ids(&self) -> Vec<&NodeId> {
        match self {
            NodeKind::Identifier { .. }
            | NodeKind::Literal { .. }
            | NodeKind::TemplateElement { .. }
            | NodeKind::ThisExpression {}
            | NodeKind::Super {}
            | NodeKind::BreakStatement { .. }
            | NodeKind::ContinueStatement { .. } => vec![],

            NodeKind::BinaryExpression { left, right, .. }
            | NodeKind::LogicalExpression { left, right, .. }
            | NodeKind::AssignmentExpression { left, right, .. }
            | NodeKind::AssignmentPattern { left, right, .. } => vec![left, right],

            NodeKind::UpdateExpression { argument, .. }
            | NodeKind::UnaryExpression { argument, .. }
            | NodeKind::SpreadElement { argument }
            | NodeKind::RestElement { argument }
            | NodeKind::ThrowStatement { argument }
            | NodeKind::AwaitExpression { argument } => vec![argument],

            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => vec![test, consequent, alternate],

            NodeKind::CallExpression {
                callee, arguments, ..
            }
            | NodeKind::NewExpression {
                callee, arguments, ..
            } => {
                let mut v = vec![callee];
                v.extend(arguments.iter());
                v
            }

            NodeKind::MemberExpression {
                object, property, ..
            } => vec![object, property],

            NodeKind::ArrayExpression { elements } | NodeKind::ArrayPattern { elements } => {
                elements.iter().filter_map(|e| e.as_ref()).collect()
            }

            NodeKind::ObjectExpression { properties } | NodeKind::ObjectPattern { properties } => {
                properties.iter().collect()
            }

            NodeKind::Property { key, value, .. } => vec![key, value],

            NodeKind::TemplateLiteral {
                quasis,
                expressions,
            } => quasis.iter().chain(expressions.iter()).collect(),

            NodeKind::ArrowFunctionExpression { params, body, .. } => {
                let mut v: Vec<&NodeId> = params.iter().collect();
                v.push(body);
                v
            }
            NodeKind::FunctionExpression { id, params, body, .. } => {
                let mut v: Vec<&NodeId> = id.iter().collect();
                v.extend(params.iter());
                v.push(body);
                v
            }
            NodeKind::FunctionDeclaration {
                id, params, body, ..
            } => {
                let mut v = vec![id];
                v.extend(params.iter());
                v.push(body);
                v
            }
            NodeKind::AsyncFunctionDeclaration {
                id, params, body, ..
            }
            | NodeKind::GeneratorDeclaration {
                id, params, body, ..
            } => {
                let mut v = vec![id];
                v.extend(params.iter());
                v.push(body);
                v
            }

            NodeKind::VariableDeclaration { declarations, .. } => declarations.iter().collect(),
            NodeKind::VariableDeclarator { name, init, .. } => {
                let mut v = vec![name];
                v.extend(init.iter());
                v
            }

            NodeKind::BlockStatement { body } => body.iter().collect(),
            NodeKind::ExpressionStatement { expression } => vec![expression],
            NodeKind::ReturnStatement { argument } => argument.iter().collect(),
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                let mut v = vec![test, consequent];
                v.extend(alternate.iter());
                v
            }
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => {
                let mut v = vec![discriminant];
                v.extend(cases.iter());
                v
            }
            NodeKind::SwitchCase { test, consequent } => {
                let mut v: Vec<&NodeId> = test.iter().collect();
                v.extend(consequent.iter());
                v
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                let mut v: Vec<&NodeId> = init.iter().chain(test.iter()).chain(update.iter()).collect();
                v.push(body);
                v
            }
            NodeKind::ForOfStatement {
                left, right, body, ..
            }
            | NodeKind::ForInStatement { left, right, body } => vec![left, right, body],
            NodeKind::WhileStatement { test, body } | NodeKind::DoWhileStatement { test, body } => {
                vec![test, body]
            }
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                let mut v = vec![block];
                v.extend(handler.iter());
                v.extend(finalizer.iter());
                v
            }
            NodeKind::CatchClause { param, body } => {
                let mut v: Vec<&NodeId> = param.iter().collect();
                v.push(body);
                v
            }
            NodeKind::ClassDeclaration {
                id,
                super_class,
                body,
            }
            | NodeKind::ClassExpression {
                id,
                super_class,
                body,
            } => {
                let mut v: Vec<&NodeId> = id.iter().chain(super_class.iter()).collect();
                v.push(body);
                v
            }
            NodeKind::ClassBody { body } => body.iter().collect(),
            NodeKind::MethodDefinition { key, value, .. } => vec![key, value],
            NodeKind::YieldExpression { argument, .. } => argument.iter().collect(),
            NodeKind::Parameter {
                pattern, default, ..
            } => {
                let mut v = vec![pattern];
                v.extend(default.iter());
                v
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_ids_covers_binary_expression() {
        let kind = NodeKind::BinaryExpression {
            operator: "+".into(),
            left: "node_0".into(),
            right: "node_1".into(),
        };
        assert_eq!(kind.child_ids(), vec![&"node_0".to_string(), &"node_1".to_string()]);
    }

    #[test]
    fn leaf_kinds_have_no_children() {
        assert!(NodeKind::Identifier { name: "x".into() }.child_ids().is_empty());
        assert!(NodeKind::ThisExpression {}.child_ids().is_empty());
    }

    #[test]
    fn array_expression_skips_elisions() {
        let kind = NodeKind::ArrayExpression {
            elements: vec![Some("node_0".into()), None, Some("node_1".into())],
        };
        assert_eq!(kind.child_ids().len(), 2);
    }

    #[test]
    fn tag_matches_kind_name() {
        assert_eq!(NodeKind::ThisExpression {}.tag(), "ThisExpression");
        assert_eq!(
            NodeKind::Identifier { name: "a".into() }.tag(),
            "Identifier"
        );
    }

    #[test]
    fn node_json_round_trip() {
        let node = Node {
            id: "node_1".into(),
            kind: NodeKind::Identifier { name: "x".into() },
            span: Some(luascript_diagnostic::Span::new(0, 1)),
            flags: NodeFlags::SYNTHETIC,
            doc: Doc::default(),
            meta: Meta::default(),
        };
        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
