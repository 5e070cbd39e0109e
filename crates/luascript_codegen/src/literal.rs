//! Literal rendering: JSON-style string escaping, canonical number form,
//! and the `null`/`undefined` → `nil` mapping.

use luascript_ir::LiteralValue;

pub fn render_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Null | LiteralValue::Undefined => "nil".to_string(),
        LiteralValue::Bool(b) => b.to_string(),
        LiteralValue::Number(n) => render_number(*n),
        LiteralValue::Str(s) => render_string(s),
        LiteralValue::Regex { pattern, flags } => render_string(&format!("/{pattern}/{flags}")),
    }
}

/// Canonical decimal form: integral values print without a trailing `.0`
/// (Lua numbers are untyped, so `1` and `1.0` are the same value but `1`
/// is the form a human author would actually write).
fn render_number(n: f64) -> String {
    if n.is_nan() {
        return "(0/0)".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "math.huge".to_string() } else { "-math.huge".to_string() };
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

fn render_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\{}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_undefined_both_render_as_nil() {
        assert_eq!(render_literal(&LiteralValue::Null), "nil");
        assert_eq!(render_literal(&LiteralValue::Undefined), "nil");
    }

    #[test]
    fn integral_numbers_drop_the_decimal_point() {
        assert_eq!(render_literal(&LiteralValue::Number(3.0)), "3");
    }

    #[test]
    fn fractional_numbers_keep_precision() {
        assert_eq!(render_literal(&LiteralValue::Number(3.5)), "3.5");
    }

    #[test]
    fn strings_escape_quotes_and_control_characters() {
        assert_eq!(render_literal(&LiteralValue::Str("a\"b\nc".into())), "\"a\\\"b\\nc\"");
    }
}
