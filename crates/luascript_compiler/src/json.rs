//! Adapter from a JSON-encoded ESTree-ish tree to the normalizer's raw
//! tree shape. There is no in-tree JS lexer/parser (out of scope per the
//! crate boundary) — callers are expected to have already parsed source
//! text with an external tool and handed the result over as JSON, the way
//! `luascript_ast::raw` expects "a dynamically-typed tree... the external
//! parser's shape is explicitly out of this core's control".

use luascript_ast::{RawField, RawNode, RawRef};
use luascript_diagnostic::CompileError;
use serde_json::Value;

/// Converts a JSON value into a [`RawRef`]. The top-level value, and any
/// object reachable through it, must carry a string `"type"` field to be
/// treated as a node; any other object shape is rejected.
pub fn from_json(value: &Value) -> Result<RawRef, CompileError> {
    let Value::Object(map) = value else {
        return Err(CompileError::InvalidInput("expected a JSON object at the tree root".to_string()));
    };
    let Some(Value::String(node_type)) = map.get("type") else {
        return Err(CompileError::InvalidInput("JSON node is missing a string \"type\" field".to_string()));
    };

    let node = RawNode::new(node_type.clone());
    for (key, field_value) in map {
        if key == "type" {
            continue;
        }
        node.borrow_mut().fields.insert(key.clone(), field_from_json(field_value)?);
    }
    Ok(node)
}

fn field_from_json(value: &Value) -> Result<RawField, CompileError> {
    match value {
        Value::Null => Ok(RawField::Null),
        Value::Bool(b) => Ok(RawField::Bool(*b)),
        Value::Number(n) => n
            .as_f64()
            .map(RawField::Num)
            .ok_or_else(|| CompileError::InvalidInput(format!("non-finite number literal: {n}"))),
        Value::String(s) => Ok(RawField::Str(s.clone())),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(field_from_json(item)?);
            }
            Ok(RawField::List(out))
        }
        Value::Object(map) if map.contains_key("type") => Ok(RawField::node(from_json(value)?)),
        Value::Object(_) => Ok(RawField::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_a_program_with_nested_expression() {
        let value = json!({
            "type": "Program",
            "body": [{
                "type": "ExpressionStatement",
                "expression": { "type": "Literal", "value": 1.0 }
            }]
        });
        let root = from_json(&value).unwrap();
        assert_eq!(root.borrow().node_type, "Program");
        let body = root.borrow().fields.get("body").unwrap().as_list().unwrap().to_vec();
        assert_eq!(body.len(), 1);
        let stmt = body[0].as_node().unwrap().clone();
        assert_eq!(stmt.borrow().node_type, "ExpressionStatement");
    }

    #[test]
    fn rejects_a_node_missing_type() {
        let value = json!({ "name": "x" });
        assert!(from_json(&value).is_err());
    }

    #[test]
    fn preserves_string_and_bool_fields() {
        let value = json!({ "type": "Identifier", "name": "x", "optional": false });
        let root = from_json(&value).unwrap();
        let borrowed = root.borrow();
        assert_eq!(borrowed.fields.get("name").unwrap().as_str(), Some("x"));
        assert_eq!(borrowed.fields.get("optional").unwrap().as_bool(), Some(false));
    }
}
