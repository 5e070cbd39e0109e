//! Expression emission: every `NodeKind` variant that can appear in
//! expression position is rendered to a self-contained Lua expression
//! string, parenthesized only where the surrounding operator's precedence
//! requires it.

use luascript_diagnostic::CompileError;
use luascript_ir::{IrModule, LiteralValue, NodeId, NodeKind, PropertyKind};

use crate::context::EmitContext;
use crate::literal::render_literal;
use crate::operators::{is_right_associative, is_string_like, map_binary_operator, map_unary_operator, precedence};
use crate::function::emit_function_expression_body;

pub fn emit_expr(module: &IrModule, ctx: &mut EmitContext, id: &NodeId) -> Result<String, CompileError> {
    let node = module
        .node(id)
        .ok_or_else(|| CompileError::BrokenReference { id: id.clone() })?;

    let text = match &node.kind {
        NodeKind::Identifier { name } => name.clone(),
        NodeKind::Literal { value, .. } => render_literal(value),
        NodeKind::ThisExpression {} => "self".to_string(),
        // No explicit Lua mapping is specified for a bare `super` reference
        // beyond the `C.__index = Super` wiring the class emitter does;
        // this names the conventional upvalue a constructor body can use
        // to reach it.
        NodeKind::Super {} => "super".to_string(),
        NodeKind::BinaryExpression { operator, left, right } => {
            emit_binary_like(module, ctx, operator, left, right)?
        }
        NodeKind::LogicalExpression { operator, left, right } => {
            emit_binary_like(module, ctx, operator, left, right)?
        }
        NodeKind::AssignmentExpression { operator, left, right } => {
            let left_text = emit_expr(module, ctx, left)?;
            let right_text = emit_expr(module, ctx, right)?;
            if operator == "=" {
                format!("{left_text} = {right_text}")
            } else {
                // Compound assignment (`+=` etc.) has no direct Lua
                // operator; expand to `x = x <op> y`.
                let base_op = operator.trim_end_matches('=');
                let mapped = map_binary_operator(base_op);
                let op = if mapped == "+" && (is_string_like(module, left) || is_string_like(module, right)) {
                    ".."
                } else {
                    mapped
                };
                format!("{left_text} = {left_text} {op} {right_text}")
            }
        }
        NodeKind::UpdateExpression { operator, argument, prefix } => {
            let arg_text = emit_expr(module, ctx, argument)?;
            let delta = if operator == "++" { "1" } else { "-1" };
            let _ = prefix; // pre/post distinction doesn't change a standalone statement's effect
            format!("{arg_text} = {arg_text} + {delta}")
        }
        NodeKind::UnaryExpression { operator, argument, .. } => {
            let arg_text = emit_expr(module, ctx, argument)?;
            format!("{}{arg_text}", map_unary_operator(operator))
        }
        NodeKind::ConditionalExpression { test, consequent, alternate } => {
            let test_text = emit_expr(module, ctx, test)?;
            let consequent_text = emit_expr(module, ctx, consequent)?;
            let alternate_text = emit_expr(module, ctx, alternate)?;
            format!("({test_text} and {consequent_text} or {alternate_text})")
        }
        NodeKind::CallExpression { callee, arguments, optional } => {
            emit_call(module, ctx, callee, arguments, *optional)?
        }
        NodeKind::NewExpression { callee, arguments } => {
            let callee_text = emit_expr(module, ctx, callee)?;
            let args_text = emit_expr_list(module, ctx, arguments)?;
            format!("{callee_text}.new({args_text})")
        }
        NodeKind::MemberExpression { object, property, computed, optional } => {
            emit_member(module, ctx, object, property, *computed, *optional)?
        }
        NodeKind::ArrayExpression { elements } => {
            let mut parts = Vec::with_capacity(elements.len());
            for el in elements {
                match el {
                    Some(e) => parts.push(emit_expr(module, ctx, e)?),
                    None => parts.push("nil".to_string()),
                }
            }
            format!("{{ {} }}", parts.join(", "))
        }
        NodeKind::ObjectExpression { properties } => {
            let mut parts = Vec::with_capacity(properties.len());
            for p in properties {
                parts.push(emit_expr(module, ctx, p)?);
            }
            format!("{{ {} }}", parts.join(", "))
        }
        NodeKind::Property { key, value, computed, property_kind, .. } => {
            if *property_kind != PropertyKind::Init {
                return Err(CompileError::UnsupportedKind { kind: "getter/setter Property".to_string() });
            }
            let value_text = emit_expr(module, ctx, value)?;
            if *computed {
                let key_text = emit_expr(module, ctx, key)?;
                format!("[{key_text}] = {value_text}")
            } else {
                match module.node(key).map(|n| &n.kind) {
                    Some(NodeKind::Identifier { name }) => format!("{name} = {value_text}"),
                    Some(NodeKind::Literal { value: LiteralValue::Str(s), .. }) => {
                        format!("[{}] = {value_text}", render_literal(&LiteralValue::Str(s.clone())))
                    }
                    _ => return Err(CompileError::UnsupportedKind { kind: "Property key".to_string() }),
                }
            }
        }
        NodeKind::TemplateLiteral { quasis, expressions } => emit_template_literal(module, ctx, quasis, expressions)?,
        NodeKind::SpreadElement { argument } => {
            let arg_text = emit_expr(module, ctx, argument)?;
            format!("table.unpack({arg_text})")
        }
        NodeKind::ArrowFunctionExpression { params, body, is_async, .. } => {
            emit_function_expression_body(module, ctx, params, body, *is_async, false)?
        }
        NodeKind::FunctionExpression { params, body, is_async, is_generator, .. } => {
            emit_function_expression_body(module, ctx, params, body, *is_async, *is_generator)?
        }
        NodeKind::AwaitExpression { argument } => {
            let arg_text = emit_expr(module, ctx, argument)?;
            match ctx.current_await_mode() {
                crate::context::AwaitMode::AsyncGenerator => {
                    ctx.mark_needs_await_value();
                    format!("__await_value({arg_text})")
                }
                crate::context::AwaitMode::PlainAsync => format!("coroutine.yield({arg_text})"),
            }
        }
        NodeKind::YieldExpression { argument, .. } => {
            let arg_text = match argument {
                Some(a) => emit_expr(module, ctx, a)?,
                None => String::new(),
            };
            format!("coroutine.yield({arg_text})")
        }
        other => return Err(CompileError::UnsupportedKind { kind: other.tag().to_string() }),
    };
    Ok(text)
}

fn emit_binary_like(
    module: &IrModule,
    ctx: &mut EmitContext,
    operator: &str,
    left: &NodeId,
    right: &NodeId,
) -> Result<String, CompileError> {
    let mapped = if operator == "+" && (is_string_like(module, left) || is_string_like(module, right)) {
        ".."
    } else {
        map_binary_operator(operator)
    };
    let left_text = emit_operand(module, ctx, left, mapped, Side::Left)?;
    let right_text = emit_operand(module, ctx, right, mapped, Side::Right)?;
    Ok(format!("{left_text} {mapped} {right_text}"))
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum Side {
    Left,
    Right,
}

/// Emits an operand, parenthesizing it iff the child is itself a
/// binary/logical expression whose precedence is lower than the parent's,
/// or equal but on the associativity-sensitive side.
fn emit_operand(module: &IrModule, ctx: &mut EmitContext, id: &NodeId, parent_op: &str, side: Side) -> Result<String, CompileError> {
    let text = emit_expr(module, ctx, id)?;
    let Some(node) = module.node(id) else {
        return Ok(text);
    };
    let child_op = match &node.kind {
        NodeKind::BinaryExpression { operator, .. } | NodeKind::LogicalExpression { operator, .. } => {
            if operator == "+" && is_string_like(module, id) {
                ".."
            } else {
                map_binary_operator(operator)
            }
        }
        _ => return Ok(text),
    };
    let parent_prec = precedence(parent_op);
    let child_prec = precedence(child_op);
    let needs_parens = if child_prec != parent_prec {
        child_prec < parent_prec
    } else if is_right_associative(parent_op) {
        side == Side::Left
    } else {
        side == Side::Right
    };
    if needs_parens {
        Ok(format!("({text})"))
    } else {
        Ok(text)
    }
}

fn emit_call(
    module: &IrModule,
    ctx: &mut EmitContext,
    callee: &NodeId,
    arguments: &[NodeId],
    optional: bool,
) -> Result<String, CompileError> {
    let callee_text = emit_expr(module, ctx, callee)?;
    let args_text = emit_expr_list(module, ctx, arguments)?;
    if optional {
        Ok(format!(
            "(type({callee_text}) == \"function\" and {callee_text}({args_text}) or nil)"
        ))
    } else {
        Ok(format!("{callee_text}({args_text})"))
    }
}

fn emit_member(
    module: &IrModule,
    ctx: &mut EmitContext,
    object: &NodeId,
    property: &NodeId,
    computed: bool,
    optional: bool,
) -> Result<String, CompileError> {
    let object_text = emit_expr(module, ctx, object)?;
    let access = if computed {
        let property_text = emit_expr(module, ctx, property)?;
        format!("{object_text}[{property_text}]")
    } else {
        match module.node(property).map(|n| &n.kind) {
            Some(NodeKind::Identifier { name }) => format!("{object_text}.{name}"),
            _ => return Err(CompileError::UnsupportedKind { kind: "non-computed MemberExpression property".to_string() }),
        }
    };
    if optional {
        Ok(format!("({object_text} ~= nil and {access} or nil)"))
    } else {
        Ok(access)
    }
}

fn emit_template_literal(
    module: &IrModule,
    ctx: &mut EmitContext,
    quasis: &[NodeId],
    expressions: &[NodeId],
) -> Result<String, CompileError> {
    let mut parts = Vec::with_capacity(quasis.len() + expressions.len());
    for (i, quasi_id) in quasis.iter().enumerate() {
        let cooked = match module.node(quasi_id).map(|n| &n.kind) {
            Some(NodeKind::TemplateElement { cooked, .. }) => cooked.clone(),
            _ => return Err(CompileError::UnsupportedKind { kind: "TemplateLiteral quasi".to_string() }),
        };
        if !cooked.is_empty() {
            parts.push(render_literal(&LiteralValue::Str(cooked)));
        }
        if let Some(expr_id) = expressions.get(i) {
            let expr_text = emit_expr(module, ctx, expr_id)?;
            parts.push(format!("tostring({expr_text})"));
        }
    }
    if parts.is_empty() {
        Ok("\"\"".to_string())
    } else {
        Ok(format!("({})", parts.join(" .. ")))
    }
}

pub fn emit_expr_list(module: &IrModule, ctx: &mut EmitContext, ids: &[NodeId]) -> Result<String, CompileError> {
    let mut parts = Vec::with_capacity(ids.len());
    for id in ids {
        parts.push(emit_expr(module, ctx, id)?);
    }
    Ok(parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use luascript_ir::Builder;

    #[test]
    fn identifier_and_literal_render_verbatim() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let id = b.make_node(NodeKind::Identifier { name: "x".into() });
        let module = b.finish();
        assert_eq!(emit_expr(&module, &mut ctx, &id).unwrap(), "x");
    }

    #[test]
    fn strict_equality_maps_to_double_equals() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let a = b.make_node(NodeKind::Identifier { name: "a".into() });
        let c = b.make_node(NodeKind::Identifier { name: "b".into() });
        let bin = b.make_node(NodeKind::BinaryExpression { operator: "===".into(), left: a, right: c });
        let module = b.finish();
        assert_eq!(emit_expr(&module, &mut ctx, &bin).unwrap(), "a == b");
    }

    #[test]
    fn string_plus_becomes_concat() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let s = b.make_node(NodeKind::Literal { value: LiteralValue::Str("a".into()), type_annotation: None });
        let n = b.make_node(NodeKind::Identifier { name: "x".into() });
        let bin = b.make_node(NodeKind::BinaryExpression { operator: "+".into(), left: s, right: n });
        let module = b.finish();
        assert_eq!(emit_expr(&module, &mut ctx, &bin).unwrap(), "\"a\" .. x");
    }

    #[test]
    fn lower_precedence_child_gets_parenthesized() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let a = b.make_node(NodeKind::Identifier { name: "a".into() });
        let c = b.make_node(NodeKind::Identifier { name: "b".into() });
        let d = b.make_node(NodeKind::Identifier { name: "c".into() });
        let add = b.make_node(NodeKind::BinaryExpression { operator: "+".into(), left: a, right: c });
        let mul = b.make_node(NodeKind::BinaryExpression { operator: "*".into(), left: add, right: d });
        let module = b.finish();
        assert_eq!(emit_expr(&module, &mut ctx, &mul).unwrap(), "(a + b) * c");
    }

    #[test]
    fn optional_member_access_guards_against_nil() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let obj = b.make_node(NodeKind::Identifier { name: "a".into() });
        let prop = b.make_node(NodeKind::Identifier { name: "b".into() });
        let member = b.make_node(NodeKind::MemberExpression { object: obj, property: prop, computed: false, optional: true });
        let module = b.finish();
        assert_eq!(emit_expr(&module, &mut ctx, &member).unwrap(), "(a ~= nil and a.b or nil)");
    }

    #[test]
    fn plain_async_await_yields_the_coroutine() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let arg = b.make_node(NodeKind::Identifier { name: "p".into() });
        let await_id = b.make_node(NodeKind::AwaitExpression { argument: arg });
        let module = b.finish();
        assert_eq!(emit_expr(&module, &mut ctx, &await_id).unwrap(), "coroutine.yield(p)");
        assert!(!ctx.needs_await_value());
    }

    #[test]
    fn async_generator_await_wraps_in_helper_and_flags_prelude() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        ctx.push_await_mode(crate::context::AwaitMode::AsyncGenerator);
        let mut b = Builder::new();
        let arg = b.make_node(NodeKind::Identifier { name: "p".into() });
        let await_id = b.make_node(NodeKind::AwaitExpression { argument: arg });
        let module = b.finish();
        assert_eq!(emit_expr(&module, &mut ctx, &await_id).unwrap(), "__await_value(p)");
        assert!(ctx.needs_await_value());
    }
}
