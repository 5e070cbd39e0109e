//! Algebraic type model.
//!
//! Used as optional annotations on literals, parameters, and return
//! positions. Closed variant set, structural equality, JSON round-trip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "tag", content = "value")]
pub enum Type {
    Primitive(Primitive),
    Array(Box<Type>),
    Object(BTreeMap<String, Type>),
    Function { params: Vec<Type>, ret: Box<Type> },
    Union(Vec<Type>),
    Optional(Box<Type>),
    Void,
    Any,
    Custom(String),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum Primitive {
    Number,
    String,
    Boolean,
    Null,
    Undefined,
}

impl Type {
    /// Structural equality with `Any` acting as a wildcard and `Union`
    /// compared as a set.
    #[must_use]
    pub fn structurally_eq(&self, other: &Type) -> bool {
        if matches!(self, Type::Any) || matches!(other, Type::Any) {
            return true;
        }
        match (self, other) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Array(a), Type::Array(b)) => a.structurally_eq(b),
            (Type::Object(a), Type::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|bv| v.structurally_eq(bv)))
            }
            (
                Type::Function {
                    params: ap,
                    ret: ar,
                },
                Type::Function {
                    params: bp,
                    ret: br,
                },
            ) => {
                ap.len() == bp.len()
                    && ap
                        .iter()
                        .zip(bp.iter())
                        .all(|(a, b)| a.structurally_eq(b))
                    && ar.structurally_eq(br)
            }
            (Type::Union(a), Type::Union(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|x| b.iter().any(|y| x.structurally_eq(y)))
            }
            (Type::Optional(a), Type::Optional(b)) => a.structurally_eq(b),
            (Type::Void, Type::Void) => true,
            (Type::Custom(a), Type::Custom(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_equals_everything() {
        assert!(Type::Any.structurally_eq(&Type::Primitive(Primitive::Number)));
        assert!(Type::Primitive(Primitive::String).structurally_eq(&Type::Any));
    }

    #[test]
    fn union_compares_as_a_set() {
        let a = Type::Union(vec![
            Type::Primitive(Primitive::Number),
            Type::Primitive(Primitive::String),
        ]);
        let b = Type::Union(vec![
            Type::Primitive(Primitive::String),
            Type::Primitive(Primitive::Number),
        ]);
        assert!(a.structurally_eq(&b));
    }

    #[test]
    fn mismatched_variants_are_unequal() {
        assert!(!Type::Void.structurally_eq(&Type::Primitive(Primitive::Null)));
    }

    #[test]
    fn json_round_trip() {
        let t = Type::Function {
            params: vec![Type::Primitive(Primitive::Number), Type::Optional(Box::new(Type::Primitive(Primitive::String)))],
            ret: Box::new(Type::Union(vec![Type::Void, Type::Primitive(Primitive::Boolean)])),
        };
        let json = serde_json::to_string(&t).unwrap();
        let back: Type = serde_json::from_str(&json).unwrap();
        assert!(t.structurally_eq(&back));
    }
}
