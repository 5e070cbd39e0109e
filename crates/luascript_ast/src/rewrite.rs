//! Per-type rewrite rules from raw node shape to canonical shape.

use luascript_ir::{LiteralValue, MethodKind, PropertyKind, Type};

use crate::ast::CanonicalNode;
use crate::raw::{RawField, RawNode, RawRef};

/// Flattens one level of list nesting in a child slot.
pub fn flatten_one_level(items: &[RawField]) -> Vec<RawField> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            RawField::List(inner) => out.extend(inner.iter().cloned()),
            other => out.push(other.clone()),
        }
    }
    out
}

pub fn field<'a>(raw: &'a RawNode, name: &str) -> Option<&'a RawField> {
    raw.fields.get(name)
}

pub fn str_field(raw: &RawNode, name: &str, default: &str) -> String {
    field(raw, name)
        .and_then(RawField::as_str)
        .unwrap_or(default)
        .to_string()
}

pub fn bool_field(raw: &RawNode, name: &str) -> bool {
    field(raw, name).and_then(RawField::as_bool).unwrap_or(false)
}

pub fn literal_value(raw: &RawNode) -> LiteralValue {
    match raw.fields.get("value") {
        Some(RawField::Str(s)) => LiteralValue::Str(s.clone()),
        Some(RawField::Num(n)) => LiteralValue::Number(*n),
        Some(RawField::Bool(b)) => LiteralValue::Bool(*b),
        Some(RawField::Null) | None => LiteralValue::Null,
        Some(RawField::Node(_)) | Some(RawField::List(_)) => LiteralValue::Null,
    }
}

/// The type tags this rewrite table recognizes.
pub const KNOWN_TYPES: &[&str] = &[
    "Program",
    "Identifier",
    "Literal",
    "BinaryExpression",
    "LogicalExpression",
    "AssignmentExpression",
    "UpdateExpression",
    "ConditionalExpression",
    "UnaryExpression",
    "CallExpression",
    "NewExpression",
    "MemberExpression",
    "ArrayExpression",
    "ObjectExpression",
    "Property",
    "TemplateLiteral",
    "TemplateElement",
    "SpreadElement",
    "ArrowFunctionExpression",
    "ArrowFunction",
    "FunctionExpression",
    "FunctionDeclaration",
    "VariableDeclaration",
    "VariableDeclarator",
    "BlockStatement",
    "ExpressionStatement",
    "ReturnStatement",
    "IfStatement",
    "SwitchStatement",
    "SwitchCase",
    "ForStatement",
    "ForOfStatement",
    "ForInStatement",
    "WhileStatement",
    "DoWhileStatement",
    "BreakStatement",
    "ContinueStatement",
    "ThrowStatement",
    "TryStatement",
    "CatchClause",
    "ClassDeclaration",
    "ClassExpression",
    "ClassBody",
    "MethodDefinition",
    "ObjectPattern",
    "ArrayPattern",
    "RestElement",
    "AssignmentPattern",
    "ThisExpression",
    "Super",
    "AwaitExpression",
    "YieldExpression",
];

pub fn is_known_type(type_name: &str) -> bool {
    KNOWN_TYPES.contains(&type_name)
}

/// Parses an optional `{propertyKind: "init"|"get"|"set"}`-style field into
/// the canonical enum.
pub fn property_kind(raw: &RawNode) -> PropertyKind {
    match str_field(raw, "kind", "init").as_str() {
        "get" => PropertyKind::Get,
        "set" => PropertyKind::Set,
        _ => PropertyKind::Init,
    }
}

pub fn method_kind(raw: &RawNode) -> MethodKind {
    match str_field(raw, "kind", "method").as_str() {
        "constructor" => MethodKind::Constructor,
        "get" => MethodKind::Get,
        "set" => MethodKind::Set,
        _ => MethodKind::Method,
    }
}

/// Type annotations are always optional and never appear in the raw parser
/// output this core targets; reserved for
/// transforms that attach inferred types post-lowering.
pub fn no_type_annotation() -> Option<Type> {
    None
}

pub fn child(raw: &RawNode, name: &str) -> Option<RawRef> {
    field(raw, name).and_then(RawField::as_node).cloned()
}

pub fn list(raw: &RawNode, name: &str) -> Vec<RawField> {
    match field(raw, name) {
        Some(RawField::List(items)) => flatten_one_level(items),
        Some(RawField::Node(n)) => vec![RawField::Node(n.clone())],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_one_level_splices_nested_lists() {
        let items = vec![
            RawField::Str("a".into()),
            RawField::List(vec![RawField::Str("b".into()), RawField::Str("c".into())]),
        ];
        let flat = flatten_one_level(&items);
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn known_types_contains_core_estree_kinds() {
        assert!(is_known_type("Identifier"));
        assert!(is_known_type("ForOfStatement"));
        assert!(!is_known_type("BigIntLiteral"));
    }
}
