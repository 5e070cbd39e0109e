//! Best-effort regex recognizer for simple destructuring declarations,
//! used only when the normalizer's primary output is entirely error
//! sentinels and no alternative parser is available.
//!
//! Callers opt into this recognizer explicitly (via
//! `Normalizer::normalize_with_fallback`'s `regex_fallback_enabled` flag)
//! rather than having it run by default, and it is capped at
//! [`MAX_FALLBACK_SOURCE_LEN`] bytes — it exists to rescue small snippets,
//! never to replace a real parser.

use once_cell::sync::Lazy;
use regex::Regex;

use luascript_ir::LiteralValue;

use crate::ast::CanonicalNode;

/// Source larger than this is never handed to the fallback recognizer —
/// it exists to rescue small snippets, not to replace a real parser.
pub const MAX_FALLBACK_SOURCE_LEN: usize = 8 * 1024;

static ARRAY_DESTRUCTURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(var|let|const)\s*\[\s*([A-Za-z_$][\w$]*(?:\s*,\s*[A-Za-z_$][\w$]*)*)\s*\]\s*=\s*([^;\n]+);?\s*$").unwrap()
});

static OBJECT_DESTRUCTURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(var|let|const)\s*\{\s*([A-Za-z_$][\w$]*(?:\s*,\s*[A-Za-z_$][\w$]*)*)\s*\}\s*=\s*([^;\n]+);?\s*$").unwrap()
});

/// Attempts to recover a canonical `Program` containing exactly the simple
/// destructuring declaration statements it can recognize in `source`.
/// Returns `None` (not an empty `Program`) when nothing is recognized, so
/// the caller can distinguish "nothing to rescue" from "rescued zero
/// statements".
pub fn recognize(source: &str) -> Option<Vec<CanonicalNode>> {
    if source.len() > MAX_FALLBACK_SOURCE_LEN {
        return None;
    }
    let mut statements = Vec::new();
    for caps in ARRAY_DESTRUCTURE.captures_iter(source) {
        let kind = caps[1].to_string();
        let names: Vec<&str> = caps[2].split(',').map(str::trim).collect();
        let init_name = caps[3].trim().to_string();
        statements.push(destructure_decl(kind, pattern_array(&names), init_name));
    }
    for caps in OBJECT_DESTRUCTURE.captures_iter(source) {
        let kind = caps[1].to_string();
        let names: Vec<&str> = caps[2].split(',').map(str::trim).collect();
        let init_name = caps[3].trim().to_string();
        statements.push(destructure_decl(kind, pattern_object(&names), init_name));
    }
    if statements.is_empty() {
        None
    } else {
        Some(statements)
    }
}

fn pattern_array(names: &[&str]) -> CanonicalNode {
    CanonicalNode::ArrayPattern {
        elements: names
            .iter()
            .map(|n| Some(CanonicalNode::Identifier { name: (*n).to_string() }))
            .collect(),
    }
}

fn pattern_object(names: &[&str]) -> CanonicalNode {
    CanonicalNode::ObjectPattern {
        properties: names
            .iter()
            .map(|n| CanonicalNode::Property {
                key: Box::new(CanonicalNode::Identifier { name: (*n).to_string() }),
                value: Box::new(CanonicalNode::Identifier { name: (*n).to_string() }),
                computed: false,
                shorthand: true,
                property_kind: luascript_ir::PropertyKind::Init,
            })
            .collect(),
    }
}

fn destructure_decl(kind: String, pattern: CanonicalNode, init_name: String) -> CanonicalNode {
    let init = if let Ok(n) = init_name.parse::<f64>() {
        CanonicalNode::Literal {
            value: LiteralValue::Number(n),
            type_annotation: None,
        }
    } else {
        CanonicalNode::Identifier { name: init_name }
    };
    CanonicalNode::VariableDeclaration {
        declarations: vec![CanonicalNode::VariableDeclarator {
            name: Box::new(pattern),
            init: Some(Box::new(init)),
        }],
        declaration_kind: kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_array_destructuring() {
        let got = recognize("const [a, b] = arr;").unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].type_tag(), "VariableDeclaration");
    }

    #[test]
    fn recognizes_object_destructuring() {
        let got = recognize("let { x, y } = point;").unwrap();
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn returns_none_when_nothing_matches() {
        assert!(recognize("function f() { return 1; }").is_none());
    }

    #[test]
    fn rejects_oversized_source() {
        let huge = "a".repeat(MAX_FALLBACK_SOURCE_LEN + 1);
        assert!(recognize(&huge).is_none());
    }
}
