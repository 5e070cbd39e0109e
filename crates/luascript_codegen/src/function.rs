//! Shared parameter/body emission used by both function declarations
//! (`stmt.rs`) and function/arrow expressions (`expr.rs`): JS default and
//! destructuring parameters have no Lua equivalent in the signature itself,
//! so every non-trivial parameter becomes a plain name in the signature
//! plus a prologue statement at the top of the body that does the actual
//! binding.

use luascript_diagnostic::CompileError;
use luascript_ir::{IrModule, NodeId, NodeKind};

use crate::context::EmitContext;
use crate::destructure::emit_pattern_bindings;
use crate::expr::emit_expr;
use crate::stmt::emit_statement;

pub struct ParamEmission {
    pub signature: String,
    pub prologue: Vec<String>,
}

pub fn emit_params(module: &IrModule, ctx: &mut EmitContext, params: &[NodeId]) -> Result<ParamEmission, CompileError> {
    let mut names = Vec::with_capacity(params.len());
    let mut prologue = Vec::new();

    for param_id in params {
        let param_node = module
            .node(param_id)
            .ok_or_else(|| CompileError::BrokenReference { id: param_id.clone() })?;
        let NodeKind::Parameter { pattern, default, .. } = &param_node.kind else {
            return Err(CompileError::UnsupportedKind { kind: "non-Parameter entry in params list".to_string() });
        };

        let pattern_node = module
            .node(pattern)
            .ok_or_else(|| CompileError::BrokenReference { id: pattern.clone() })?;

        if let NodeKind::RestElement { argument } = &pattern_node.kind {
            names.push("...".to_string());
            prologue.extend(emit_pattern_bindings(module, ctx, argument, "{ ... }", true)?);
            continue;
        }

        match (default, &pattern_node.kind) {
            (None, NodeKind::Identifier { name }) => names.push(name.clone()),
            (None, _) => {
                let slot = ctx.fresh_temp();
                names.push(slot.clone());
                prologue.extend(emit_pattern_bindings(module, ctx, pattern, &slot, true)?);
            }
            (Some(default_id), _) => {
                let slot = ctx.fresh_temp();
                names.push(slot.clone());
                let default_text = emit_expr(module, ctx, default_id)?;
                let resolved = ctx.fresh_temp();
                prologue.push(format!("local {resolved} = ({slot} ~= nil) and {slot} or {default_text}"));
                prologue.extend(emit_pattern_bindings(module, ctx, pattern, &resolved, true)?);
            }
        }
    }

    Ok(ParamEmission { signature: names.join(", "), prologue })
}

/// Emits a complete `function(...) ... end` expression body: parameter
/// prologue followed by the lowered statement list. Async/generator
/// function *expressions* are wrapped the same way async/generator
/// *declarations* are (`stmt.rs`), just without a name.
pub fn emit_function_expression_body(
    module: &IrModule,
    ctx: &mut EmitContext,
    params: &[NodeId],
    body: &NodeId,
    is_async: bool,
    is_generator: bool,
) -> Result<String, CompileError> {
    let emission = emit_params(module, ctx, params)?;
    let statements = block_statements(module, body)?.to_vec();

    if is_async {
        let mode = if is_generator { crate::context::AwaitMode::AsyncGenerator } else { crate::context::AwaitMode::PlainAsync };
        ctx.push_await_mode(mode);
    }

    let inner = ctx.capture(|ctx| {
        ctx.indent();
        for line in &emission.prologue {
            ctx.writeln(line);
        }
        for stmt_id in &statements {
            emit_statement(module, ctx, stmt_id)?;
        }
        ctx.dedent();
        Ok(())
    });

    if is_async {
        ctx.pop_await_mode();
    }
    let inner = inner?;

    // A generator's own `yield`-producing closure is wrapped the same way
    // whether or not it's also async — `is_generator` is checked first so
    // an async generator isn't mistaken for a plain async function; the
    // enclosing `await_mode` pushed above is what tells its `await`
    // expressions apart from a plain async function's.
    if is_generator {
        ctx.mark_needs_async_generator();
        Ok(format!("__async_generator(function({})\n{inner}end)", emission.signature))
    } else if is_async {
        Ok(format!(
            "function({}) return coroutine.create(function()\n{inner}end) end",
            emission.signature
        ))
    } else {
        Ok(format!("function({})\n{inner}end", emission.signature))
    }
}

pub fn block_statements<'a>(module: &'a IrModule, body: &NodeId) -> Result<&'a [NodeId], CompileError> {
    match module.node(body).map(|n| &n.kind) {
        Some(NodeKind::BlockStatement { body }) => Ok(body.as_slice()),
        _ => Err(CompileError::UnsupportedKind { kind: "function body that is not a BlockStatement".to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luascript_ir::Builder;

    #[test]
    fn plain_identifier_params_pass_through_unchanged() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let pattern = b.make_node(NodeKind::Identifier { name: "x".into() });
        let param = b.make_node(NodeKind::Parameter { pattern, default: None, type_annotation: None });
        let module = b.finish();
        let emission = emit_params(&module, &mut ctx, &[param]).unwrap();
        assert_eq!(emission.signature, "x");
        assert!(emission.prologue.is_empty());
    }

    #[test]
    fn defaulted_param_gets_a_prologue_line() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let pattern = b.make_node(NodeKind::Identifier { name: "x".into() });
        let default = b.make_node(NodeKind::Literal { value: luascript_ir::LiteralValue::Number(1.0), type_annotation: None });
        let param = b.make_node(NodeKind::Parameter { pattern, default: Some(default), type_annotation: None });
        let module = b.finish();
        let emission = emit_params(&module, &mut ctx, &[param]).unwrap();
        assert_ne!(emission.signature, "x");
        assert_eq!(emission.prologue.len(), 2);
    }

    #[test]
    fn rest_parameter_becomes_ellipsis() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let target = b.make_node(NodeKind::Identifier { name: "rest".into() });
        let pattern = b.make_node(NodeKind::RestElement { argument: target });
        let param = b.make_node(NodeKind::Parameter { pattern, default: None, type_annotation: None });
        let module = b.finish();
        let emission = emit_params(&module, &mut ctx, &[param]).unwrap();
        assert_eq!(emission.signature, "...");
        assert_eq!(emission.prologue, vec!["local rest = { ... }".to_string()]);
    }

    #[test]
    fn plain_async_function_body_uses_coroutine_create() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let call_callee = b.make_node(NodeKind::Identifier { name: "g".into() });
        let call = b.make_node(NodeKind::CallExpression { callee: call_callee, arguments: vec![], optional: false });
        let await_expr = b.make_node(NodeKind::AwaitExpression { argument: call });
        let stmt = b.make_node(NodeKind::ExpressionStatement { expression: await_expr });
        let body = b.make_node(NodeKind::BlockStatement { body: vec![stmt] });
        let module = b.finish();
        let text = emit_function_expression_body(&module, &mut ctx, &[], &body, true, false).unwrap();
        assert!(text.contains("coroutine.create(function()"));
        assert!(!text.contains("coroutine.wrap"));
        assert!(text.contains("coroutine.yield(g())"));
        assert!(!ctx.needs_await_value());
    }

    #[test]
    fn async_generator_routes_through_async_generator_helper_and_await_value() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let call_callee = b.make_node(NodeKind::Identifier { name: "g".into() });
        let call = b.make_node(NodeKind::CallExpression { callee: call_callee, arguments: vec![], optional: false });
        let await_expr = b.make_node(NodeKind::AwaitExpression { argument: call });
        let stmt = b.make_node(NodeKind::ExpressionStatement { expression: await_expr });
        let body = b.make_node(NodeKind::BlockStatement { body: vec![stmt] });
        let module = b.finish();
        let text = emit_function_expression_body(&module, &mut ctx, &[], &body, true, true).unwrap();
        assert!(text.starts_with("__async_generator(function("));
        assert!(text.contains("__await_value(g())"));
        assert!(ctx.needs_await_value());
        assert!(ctx.needs_async_generator());
    }

    #[test]
    fn plain_generator_routes_through_async_generator_helper() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let body = b.make_node(NodeKind::BlockStatement { body: vec![] });
        let module = b.finish();
        let text = emit_function_expression_body(&module, &mut ctx, &[], &body, false, true).unwrap();
        assert!(text.starts_with("__async_generator(function("));
        assert!(ctx.needs_async_generator());
    }
}
