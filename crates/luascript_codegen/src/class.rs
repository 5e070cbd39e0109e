//! Re-synthesizes Lua's colon-method class idiom from the lowerer's
//! class-statement-run shape: a `class_like` constructor `FunctionDeclaration`
//! immediately followed by a `C.__index = Super` assignment, then zero or
//! more `C.m = fn` (static) / `C.prototype.m = fn` (instance) assignments.
//! Lua has no separate prototype object — a class table doubles as its own
//! method table via `__index` — so `C.prototype.m` collapses to `C:m`
//! directly; the `prototype` segment never appears in the emitted output.

use luascript_diagnostic::CompileError;
use luascript_ir::{IrModule, NodeId, NodeKind};

use crate::context::EmitContext;
use crate::expr::emit_expr;
use crate::function::{block_statements, emit_function_expression_body, emit_params};
use crate::stmt::emit_statement_list;

/// If `ids[start]` begins a class-statement run, emits the whole run as
/// Lua and returns how many entries of `ids` it consumed. Returns `None`
/// (emitting nothing) if `ids[start]` isn't a class_like constructor.
pub fn try_emit_class_run(
    module: &IrModule,
    ctx: &mut EmitContext,
    ids: &[NodeId],
    start: usize,
) -> Result<Option<usize>, CompileError> {
    let Some(ctor_node) = module.node(&ids[start]) else {
        return Ok(None);
    };
    if !ctor_node.meta.class_like {
        return Ok(None);
    }
    let NodeKind::FunctionDeclaration { id, params, body, .. } = &ctor_node.kind else {
        return Ok(None);
    };
    let class_name = match module.node(id).map(|n| &n.kind) {
        Some(NodeKind::Identifier { name }) => name.clone(),
        _ => return Ok(None),
    };

    let Some(index_id) = ids.get(start + 1) else {
        return Ok(None);
    };
    let Some(super_text) = extract_index_assignment(module, ctx, index_id, &class_name)? else {
        return Ok(None);
    };

    ctx.writeln(&format!("local {class_name} = {{}}"));
    ctx.writeln(&format!("{class_name}.__index = {super_text}"));
    emit_constructor(module, ctx, &class_name, params, body)?;

    let mut consumed = 2;
    let mut i = start + 2;
    while let Some(stmt_id) = ids.get(i) {
        match extract_method_assignment(module, &class_name, stmt_id)? {
            Some((method_name, is_static, fn_id)) => {
                emit_method(module, ctx, &class_name, &method_name, is_static, &fn_id)?;
                consumed += 1;
                i += 1;
            }
            None => break,
        }
    }
    Ok(Some(consumed))
}

fn extract_index_assignment(
    module: &IrModule,
    ctx: &mut EmitContext,
    stmt_id: &NodeId,
    class_name: &str,
) -> Result<Option<String>, CompileError> {
    let Some(NodeKind::ExpressionStatement { expression }) = module.node(stmt_id).map(|n| &n.kind) else {
        return Ok(None);
    };
    let Some(NodeKind::AssignmentExpression { left, right, .. }) = module.node(expression).map(|n| &n.kind) else {
        return Ok(None);
    };
    let Some(NodeKind::MemberExpression { object, property, computed: false, .. }) = module.node(left).map(|n| &n.kind) else {
        return Ok(None);
    };
    if !is_identifier_named(module, object, class_name) || !is_identifier_named(module, property, "__index") {
        return Ok(None);
    }
    Ok(Some(emit_expr(module, ctx, right)?))
}

fn extract_method_assignment(module: &IrModule, class_name: &str, stmt_id: &NodeId) -> Result<Option<(String, bool, NodeId)>, CompileError> {
    let Some(NodeKind::ExpressionStatement { expression }) = module.node(stmt_id).map(|n| &n.kind) else {
        return Ok(None);
    };
    let Some(NodeKind::AssignmentExpression { left, right, .. }) = module.node(expression).map(|n| &n.kind) else {
        return Ok(None);
    };
    let Some(NodeKind::MemberExpression { object, property, computed: false, .. }) = module.node(left).map(|n| &n.kind) else {
        return Ok(None);
    };
    let method_name = match module.node(property).map(|n| &n.kind) {
        Some(NodeKind::Identifier { name }) => name.clone(),
        _ => return Ok(None),
    };
    if !matches!(module.node(right).map(|n| &n.kind), Some(NodeKind::FunctionExpression { .. })) {
        return Ok(None);
    }

    if is_identifier_named(module, object, class_name) {
        return Ok(Some((method_name, true, right.clone())));
    }
    if let Some(NodeKind::MemberExpression { object: inner_object, property: inner_property, computed: false, .. }) =
        module.node(object).map(|n| &n.kind)
    {
        if is_identifier_named(module, inner_object, class_name) && is_identifier_named(module, inner_property, "prototype") {
            return Ok(Some((method_name, false, right.clone())));
        }
    }
    Ok(None)
}

fn is_identifier_named(module: &IrModule, id: &NodeId, name: &str) -> bool {
    matches!(module.node(id).map(|n| &n.kind), Some(NodeKind::Identifier { name: n }) if n == name)
}

fn emit_constructor(module: &IrModule, ctx: &mut EmitContext, class_name: &str, params: &[NodeId], body: &NodeId) -> Result<(), CompileError> {
    let emission = emit_params(module, ctx, params)?;
    let statements = block_statements(module, body)?.to_vec();

    ctx.writeln(&format!("function {class_name}.new({})", emission.signature));
    ctx.indent();
    ctx.writeln(&format!("local self = setmetatable({{}}, {class_name})"));
    for line in &emission.prologue {
        ctx.writeln(line);
    }
    emit_statement_list(module, ctx, &statements)?;
    ctx.writeln("return self");
    ctx.dedent();
    ctx.writeln("end");
    Ok(())
}

fn emit_method(
    module: &IrModule,
    ctx: &mut EmitContext,
    class_name: &str,
    method_name: &str,
    is_static: bool,
    fn_id: &NodeId,
) -> Result<(), CompileError> {
    let Some(NodeKind::FunctionExpression { params, body, is_async, is_generator, .. }) = module.node(fn_id).map(|n| &n.kind) else {
        return Err(CompileError::UnsupportedKind { kind: "class method value that is not a FunctionExpression".to_string() });
    };

    if *is_async || *is_generator {
        let body_text = emit_function_expression_body(module, ctx, params, body, *is_async, *is_generator)?;
        let body_text = if is_static { body_text } else { prepend_self_param(&body_text) };
        let target = if is_static {
            format!("{class_name}.{method_name}")
        } else {
            format!("{class_name}.{method_name}")
        };
        ctx.writeln(&format!("{target} = {body_text}"));
        return Ok(());
    }

    let emission = emit_params(module, ctx, params)?;
    let statements = block_statements(module, body)?.to_vec();
    let separator = if is_static { "." } else { ":" };
    ctx.writeln(&format!("function {class_name}{separator}{method_name}({})", emission.signature));
    ctx.indent();
    for line in &emission.prologue {
        ctx.writeln(line);
    }
    emit_statement_list(module, ctx, &statements)?;
    ctx.dedent();
    ctx.writeln("end");
    Ok(())
}

/// `function(...)` -> `function(self, ...)`, for the async/generator
/// method fallback path that can't use colon-call sugar (the method value
/// is a plain assigned function expression, not a `function C:m()`
/// declaration).
fn prepend_self_param(function_text: &str) -> String {
    match function_text.find("function(") {
        Some(idx) => {
            let insert_at = idx + "function(".len();
            let mut out = String::with_capacity(function_text.len() + 6);
            out.push_str(&function_text[..insert_at]);
            if function_text[insert_at..].starts_with(')') {
                out.push_str("self");
            } else {
                out.push_str("self, ");
            }
            out.push_str(&function_text[insert_at..]);
            out
        }
        None => function_text.to_string(),
    }
}
