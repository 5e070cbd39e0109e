//! Operator string mapping, Lua precedence/associativity, and the
//! string-concatenation inference used to decide `+` vs `..`.

use luascript_ir::{IrModule, LiteralValue, NodeId, NodeKind};

/// Maps a JS-style binary/logical operator string to its Lua spelling.
/// `+` is handled separately by [`is_string_like`] since its mapping
/// depends on the operand types, not the operator alone.
pub fn map_binary_operator(operator: &str) -> &str {
    match operator {
        "===" | "==" => "==",
        "!==" | "!=" => "~=",
        "&&" => "and",
        "||" | "??" => "or",
        "**" => "^",
        other => other,
    }
}

pub fn map_unary_operator(operator: &str) -> String {
    match operator {
        "!" => "not ".to_string(),
        other => other.to_string(),
    }
}

/// Lua operator precedence, highest binds tightest.
/// Returns `None` for anything that isn't a Lua binary operator (the
/// caller only consults this for operands that are themselves
/// binary/logical expressions).
pub fn precedence(lua_operator: &str) -> u8 {
    match lua_operator {
        "or" => 1,
        "and" => 2,
        "<" | ">" | "<=" | ">=" | "~=" | "==" => 3,
        "|" => 4,
        "~" => 5,
        "&" => 6,
        "<<" | ">>" => 7,
        ".." => 8,
        "+" | "-" => 9,
        "*" | "/" | "//" | "%" => 10,
        "^" => 12,
        _ => 9,
    }
}

pub fn is_right_associative(lua_operator: &str) -> bool {
    matches!(lua_operator, "^" | "..")
}

const MAX_STRING_LIKE_DEPTH: u8 = 10;

/// Whether `node_id`'s expression is statically string-like, per the
/// depth-limited recursive predicate in: a string literal, a
/// template literal, a `+` with a string-like side, a call to `String` or
/// to a `.toString`/`.concat` member, or a member access off a
/// string-like object.
pub fn is_string_like(module: &IrModule, node_id: &NodeId) -> bool {
    is_string_like_at_depth(module, node_id, 0)
}

fn is_string_like_at_depth(module: &IrModule, node_id: &NodeId, depth: u8) -> bool {
    if depth >= MAX_STRING_LIKE_DEPTH {
        return false;
    }
    let Some(node) = module.node(node_id) else {
        return false;
    };
    match &node.kind {
        NodeKind::Literal { value: LiteralValue::Str(_), .. } => true,
        NodeKind::TemplateLiteral { .. } => true,
        NodeKind::BinaryExpression { operator, left, right } if operator == "+" => {
            is_string_like_at_depth(module, left, depth + 1) || is_string_like_at_depth(module, right, depth + 1)
        }
        NodeKind::CallExpression { callee, .. } => is_string_producing_callee(module, callee),
        NodeKind::MemberExpression { object, .. } => is_string_like_at_depth(module, object, depth + 1),
        _ => false,
    }
}

fn is_string_producing_callee(module: &IrModule, callee: &NodeId) -> bool {
    match module.node(callee).map(|n| &n.kind) {
        Some(NodeKind::Identifier { name }) => name == "String",
        Some(NodeKind::MemberExpression { property, .. }) => matches!(
            module.node(property).map(|n| &n.kind),
            Some(NodeKind::Identifier { name }) if name == "toString" || name == "concat"
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luascript_ir::Builder;

    #[test]
    fn equality_operators_map_to_lua() {
        assert_eq!(map_binary_operator("==="), "==");
        assert_eq!(map_binary_operator("!=="), "~=");
        assert_eq!(map_binary_operator("&&"), "and");
        assert_eq!(map_binary_operator("??"), "or");
    }

    #[test]
    fn precedence_table_matches_spec_levels() {
        assert_eq!(precedence("or"), 1);
        assert_eq!(precedence(".."), 8);
        assert_eq!(precedence("^"), 12);
    }

    #[test]
    fn caret_and_concat_are_right_associative() {
        assert!(is_right_associative("^"));
        assert!(is_right_associative(".."));
        assert!(!is_right_associative("+"));
    }

    #[test]
    fn string_literal_is_string_like() {
        let mut b = Builder::new();
        let lit = b.make_node(NodeKind::Literal { value: LiteralValue::Str("hi".into()), type_annotation: None });
        let module = b.finish();
        assert!(is_string_like(&module, &lit));
    }

    #[test]
    fn plus_with_a_string_side_is_string_like() {
        let mut b = Builder::new();
        let s = b.make_node(NodeKind::Literal { value: LiteralValue::Str("x".into()), type_annotation: None });
        let n = b.make_node(NodeKind::Literal { value: LiteralValue::Number(1.0), type_annotation: None });
        let plus = b.make_node(NodeKind::BinaryExpression { operator: "+".into(), left: s, right: n });
        let module = b.finish();
        assert!(is_string_like(&module, &plus));
    }

    #[test]
    fn numeric_plus_is_not_string_like() {
        let mut b = Builder::new();
        let a = b.make_node(NodeKind::Literal { value: LiteralValue::Number(1.0), type_annotation: None });
        let c = b.make_node(NodeKind::Literal { value: LiteralValue::Number(2.0), type_annotation: None });
        let plus = b.make_node(NodeKind::BinaryExpression { operator: "+".into(), left: a, right: c });
        let module = b.finish();
        assert!(!is_string_like(&module, &plus));
    }

    #[test]
    fn to_string_call_is_string_like() {
        let mut b = Builder::new();
        let obj = b.make_node(NodeKind::Identifier { name: "n".into() });
        let method = b.make_node(NodeKind::Identifier { name: "toString".into() });
        let callee = b.make_node(NodeKind::MemberExpression { object: obj, property: method, computed: false, optional: false });
        let call = b.make_node(NodeKind::CallExpression { callee, arguments: vec![], optional: false });
        let module = b.finish();
        assert!(is_string_like(&module, &call));
    }
}
