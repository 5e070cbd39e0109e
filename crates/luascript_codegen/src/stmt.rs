//! Statement emission. Writes directly into the shared [`EmitContext`]
//! output buffer at the context's current indentation, mirroring the
//! teacher's own write/writeln-driven codegen context rather than building
//! up and returning strings per statement.

use luascript_diagnostic::CompileError;
use luascript_ir::{IrModule, NodeId, NodeKind};

use crate::class::try_emit_class_run;
use crate::context::EmitContext;
use crate::destructure::emit_pattern_bindings;
use crate::expr::emit_expr;
use crate::function::{block_statements, emit_params};

/// Emits a statement list, recognizing and re-synthesizing a class
/// statement run (`class.rs`) wherever one begins rather than emitting its
/// constituent statements individually.
pub fn emit_statement_list(module: &IrModule, ctx: &mut EmitContext, ids: &[NodeId]) -> Result<(), CompileError> {
    let mut i = 0;
    while i < ids.len() {
        if let Some(consumed) = try_emit_class_run(module, ctx, ids, i)? {
            i += consumed;
            continue;
        }
        emit_statement(module, ctx, &ids[i])?;
        i += 1;
    }
    Ok(())
}

pub fn emit_statement(module: &IrModule, ctx: &mut EmitContext, id: &NodeId) -> Result<(), CompileError> {
    let node = module
        .node(id)
        .ok_or_else(|| CompileError::BrokenReference { id: id.clone() })?;

    if ctx.options.emit_debug_info {
        if let Some(span) = &node.span {
            ctx.writeln(&format!("-- {}:{}", span.start, span.end));
        }
    }

    match &node.kind {
        NodeKind::VariableDeclaration { declarations, .. } => emit_variable_declaration(module, ctx, declarations)?,
        NodeKind::BlockStatement { body } => {
            ctx.writeln("do");
            ctx.indent();
            emit_statement_list(module, ctx, body)?;
            ctx.dedent();
            ctx.writeln("end");
        }
        NodeKind::ExpressionStatement { expression } => {
            let text = emit_expr(module, ctx, expression)?;
            ctx.writeln(&text);
        }
        NodeKind::ReturnStatement { argument } => match argument {
            Some(a) => {
                let text = parenthesize_if_binary_like(module, a, emit_expr(module, ctx, a)?);
                ctx.writeln(&format!("return {text}"));
            }
            None => ctx.writeln("return"),
        },
        NodeKind::IfStatement { .. } => emit_if(module, ctx, id)?,
        NodeKind::SwitchStatement { discriminant, cases } => emit_switch(module, ctx, discriminant, cases)?,
        NodeKind::ForStatement { init, test, update, body } => emit_for(module, ctx, init, test, update, body)?,
        NodeKind::ForOfStatement { left, right, body, is_await } => emit_for_of(module, ctx, left, right, body, *is_await)?,
        NodeKind::ForInStatement { left, right, body } => emit_for_in(module, ctx, left, right, body)?,
        NodeKind::WhileStatement { test, body } => emit_while(module, ctx, test, body, false)?,
        NodeKind::DoWhileStatement { test, body } => emit_while(module, ctx, test, body, true)?,
        NodeKind::BreakStatement { .. } => ctx.writeln("break"),
        NodeKind::ContinueStatement { .. } => {
            let label = ctx.current_loop_label().unwrap_or("continue_loop_0").to_string();
            ctx.writeln(&format!("goto {label}"));
        }
        NodeKind::ThrowStatement { argument } => {
            let text = emit_expr(module, ctx, argument)?;
            ctx.writeln(&format!("error({text})"));
        }
        NodeKind::TryStatement { block, handler, finalizer } => emit_try(module, ctx, block, handler, finalizer)?,
        NodeKind::FunctionDeclaration { id: name_id, params, body, .. } => {
            emit_function_declaration(module, ctx, name_id, params, body, false, false)?;
        }
        NodeKind::AsyncFunctionDeclaration { id: name_id, params, body, is_generator, .. } => {
            emit_function_declaration(module, ctx, name_id, params, body, true, *is_generator)?;
        }
        NodeKind::GeneratorDeclaration { id: name_id, params, body, .. } => {
            emit_function_declaration(module, ctx, name_id, params, body, false, true)?;
        }
        other => return Err(CompileError::UnsupportedKind { kind: other.tag().to_string() }),
    }
    Ok(())
}

/// Wraps `text` in parentheses when `id` is itself a top-level
/// binary/logical expression: `return a + b` reads ambiguously next to
/// Lua's own unparenthesized precedence rules, so a binary/logical result
/// value is always parenthesized at the point it's returned or bound.
fn parenthesize_if_binary_like(module: &IrModule, id: &NodeId, text: String) -> String {
    match module.node(id).map(|n| &n.kind) {
        Some(NodeKind::BinaryExpression { .. }) | Some(NodeKind::LogicalExpression { .. }) => format!("({text})"),
        _ => text,
    }
}

fn emit_variable_declaration(module: &IrModule, ctx: &mut EmitContext, declarations: &[NodeId]) -> Result<(), CompileError> {
    for decl_id in declarations {
        let Some(NodeKind::VariableDeclarator { name, init, .. }) = module.node(decl_id).map(|n| &n.kind) else {
            return Err(CompileError::UnsupportedKind { kind: "non-VariableDeclarator in VariableDeclaration".to_string() });
        };
        match (module.node(name).map(|n| &n.kind), init) {
            (Some(NodeKind::Identifier { name }), Some(init_id)) => {
                let text = parenthesize_if_binary_like(module, init_id, emit_expr(module, ctx, init_id)?);
                ctx.writeln(&format!("local {name} = {text}"));
            }
            (Some(NodeKind::Identifier { name }), None) => ctx.writeln(&format!("local {name}")),
            (_, Some(init_id)) => {
                let source = emit_expr(module, ctx, init_id)?;
                for line in emit_pattern_bindings(module, ctx, name, &source, true)? {
                    ctx.writeln(&line);
                }
            }
            (_, None) => {
                return Err(CompileError::Validation {
                    message: "destructuring declaration without an initializer".to_string(),
                })
            }
        }
    }
    Ok(())
}

fn emit_if(module: &IrModule, ctx: &mut EmitContext, id: &NodeId) -> Result<(), CompileError> {
    let Some(NodeKind::IfStatement { test, consequent, alternate }) = module.node(id).map(|n| &n.kind) else {
        return Err(CompileError::Internal("emit_if called with a non-IfStatement node".to_string()));
    };
    let test_text = emit_expr(module, ctx, test)?;
    ctx.writeln(&format!("if {test_text} then"));
    ctx.indent();
    emit_branch_body(module, ctx, consequent)?;
    ctx.dedent();

    let mut current_alternate = alternate.clone();
    loop {
        match current_alternate {
            None => break,
            Some(alt_id) => match module.node(&alt_id).map(|n| &n.kind) {
                Some(NodeKind::IfStatement { test, consequent, alternate }) => {
                    let test_text = emit_expr(module, ctx, test)?;
                    ctx.writeln(&format!("elseif {test_text} then"));
                    ctx.indent();
                    emit_branch_body(module, ctx, consequent)?;
                    ctx.dedent();
                    current_alternate = alternate.clone();
                }
                _ => {
                    ctx.writeln("else");
                    ctx.indent();
                    emit_branch_body(module, ctx, &alt_id)?;
                    ctx.dedent();
                    break;
                }
            },
        }
    }
    ctx.writeln("end");
    Ok(())
}

fn emit_branch_body(module: &IrModule, ctx: &mut EmitContext, id: &NodeId) -> Result<(), CompileError> {
    match module.node(id).map(|n| &n.kind) {
        Some(NodeKind::BlockStatement { body }) => emit_statement_list(module, ctx, body),
        _ => emit_statement(module, ctx, id),
    }
}

/// A hand-built/externally-supplied `SwitchStatement` is tolerated even
/// though the lowerer itself only ever emits if/else-if chains: each case
/// becomes an `elseif discriminant == test then`, with a `default` case
/// (no `test`) becoming the final `else`.
fn emit_switch(module: &IrModule, ctx: &mut EmitContext, discriminant: &NodeId, cases: &[NodeId]) -> Result<(), CompileError> {
    let discriminant_text = emit_expr(module, ctx, discriminant)?;
    let mut first = true;
    let mut emitted_default = false;
    for case_id in cases {
        let Some(NodeKind::SwitchCase { test, consequent }) = module.node(case_id).map(|n| &n.kind) else {
            return Err(CompileError::UnsupportedKind { kind: "non-SwitchCase in SwitchStatement cases".to_string() });
        };
        match test {
            Some(test_id) => {
                let test_text = emit_expr(module, ctx, test_id)?;
                let keyword = if first { "if" } else { "elseif" };
                ctx.writeln(&format!("{keyword} {discriminant_text} == {test_text} then"));
            }
            None => {
                ctx.writeln("else");
                emitted_default = true;
            }
        }
        first = false;
        ctx.indent();
        emit_statement_list(module, ctx, consequent)?;
        ctx.dedent();
    }
    let _ = emitted_default;
    if !first {
        ctx.writeln("end");
    }
    Ok(())
}

fn emit_for(
    module: &IrModule,
    ctx: &mut EmitContext,
    init: &Option<NodeId>,
    test: &Option<NodeId>,
    update: &Option<NodeId>,
    body: &NodeId,
) -> Result<(), CompileError> {
    if let Some(init_id) = init {
        emit_for_clause(module, ctx, init_id)?;
    }
    let test_text = match test {
        Some(t) => emit_expr(module, ctx, t)?,
        None => "true".to_string(),
    };
    ctx.writeln(&format!("while {test_text} do"));
    ctx.indent();
    let label = ctx.fresh_loop_label();
    ctx.push_loop_label(label.clone());
    emit_loop_body(module, ctx, body)?;
    ctx.writeln(&format!("::{label}::"));
    if let Some(update_id) = update {
        emit_for_clause(module, ctx, update_id)?;
    }
    ctx.pop_loop_label();
    ctx.dedent();
    ctx.writeln("end");
    Ok(())
}

/// A `for` loop's init/update clause may be a full `VariableDeclaration`
/// or a bare expression, unlike every other statement-list entry.
fn emit_for_clause(module: &IrModule, ctx: &mut EmitContext, id: &NodeId) -> Result<(), CompileError> {
    match module.node(id).map(|n| &n.kind) {
        Some(NodeKind::VariableDeclaration { .. }) => emit_statement(module, ctx, id),
        _ => {
            let text = emit_expr(module, ctx, id)?;
            ctx.writeln(&text);
            Ok(())
        }
    }
}

fn emit_loop_body(module: &IrModule, ctx: &mut EmitContext, body: &NodeId) -> Result<(), CompileError> {
    match module.node(body).map(|n| &n.kind) {
        Some(NodeKind::BlockStatement { body }) => emit_statement_list(module, ctx, body),
        _ => emit_statement(module, ctx, body),
    }
}

fn emit_while(module: &IrModule, ctx: &mut EmitContext, test: &NodeId, body: &NodeId, is_do_while: bool) -> Result<(), CompileError> {
    let test_text = emit_expr(module, ctx, test)?;
    if is_do_while {
        ctx.writeln("repeat");
        ctx.indent();
        let label = ctx.fresh_loop_label();
        ctx.push_loop_label(label.clone());
        emit_loop_body(module, ctx, body)?;
        ctx.writeln(&format!("::{label}::"));
        ctx.pop_loop_label();
        ctx.dedent();
        ctx.writeln(&format!("until {test_text}"));
    } else {
        ctx.writeln(&format!("while {test_text} do"));
        ctx.indent();
        let label = ctx.fresh_loop_label();
        ctx.push_loop_label(label.clone());
        emit_loop_body(module, ctx, body)?;
        ctx.writeln(&format!("::{label}::"));
        ctx.pop_loop_label();
        ctx.dedent();
        ctx.writeln("end");
    }
    Ok(())
}

fn for_binding_target(module: &IrModule, left: &NodeId) -> Result<(NodeId, bool), CompileError> {
    match module.node(left).map(|n| &n.kind) {
        Some(NodeKind::VariableDeclaration { declarations, .. }) => {
            let Some(decl_id) = declarations.first() else {
                return Err(CompileError::Validation { message: "for-of/for-in binding has no declarator".to_string() });
            };
            let Some(NodeKind::VariableDeclarator { name, .. }) = module.node(decl_id).map(|n| &n.kind) else {
                return Err(CompileError::UnsupportedKind { kind: "non-VariableDeclarator for-of/for-in binding".to_string() });
            };
            Ok((name.clone(), true))
        }
        _ => Ok((left.clone(), false)),
    }
}

fn emit_for_of(module: &IrModule, ctx: &mut EmitContext, left: &NodeId, right: &NodeId, body: &NodeId, is_await: bool) -> Result<(), CompileError> {
    let (binding, declare) = for_binding_target(module, left)?;
    let right_text = emit_expr(module, ctx, right)?;
    let iter_var = ctx.fresh_temp();
    ctx.writeln(&format!("for _, {iter_var} in ipairs({right_text}) do"));
    ctx.indent();
    let label = ctx.fresh_loop_label();
    ctx.push_loop_label(label.clone());

    let value_expr = if is_await {
        ctx.mark_needs_await_value();
        format!("__await_value({iter_var})")
    } else {
        iter_var
    };
    for line in emit_pattern_bindings(module, ctx, &binding, &value_expr, declare)? {
        ctx.writeln(&line);
    }
    emit_loop_body(module, ctx, body)?;
    ctx.writeln(&format!("::{label}::"));
    ctx.pop_loop_label();
    ctx.dedent();
    ctx.writeln("end");
    Ok(())
}

fn emit_for_in(module: &IrModule, ctx: &mut EmitContext, left: &NodeId, right: &NodeId, body: &NodeId) -> Result<(), CompileError> {
    let (binding, declare) = for_binding_target(module, left)?;
    let right_text = emit_expr(module, ctx, right)?;
    let key_var = ctx.fresh_temp();
    ctx.writeln(&format!("for {key_var} in pairs({right_text}) do"));
    ctx.indent();
    let label = ctx.fresh_loop_label();
    ctx.push_loop_label(label.clone());
    for line in emit_pattern_bindings(module, ctx, &binding, &key_var, declare)? {
        ctx.writeln(&line);
    }
    emit_loop_body(module, ctx, body)?;
    ctx.writeln(&format!("::{label}::"));
    ctx.pop_loop_label();
    ctx.dedent();
    ctx.writeln("end");
    Ok(())
}

/// `try`/`catch`/`finally` via `pcall`, matching the `__try_<id>` wrapper
/// pattern: the guarded block becomes a local function, called through
/// `pcall` so a thrown `error()` is captured instead of propagating.
fn emit_try(
    module: &IrModule,
    ctx: &mut EmitContext,
    block: &NodeId,
    handler: &Option<NodeId>,
    finalizer: &Option<NodeId>,
) -> Result<(), CompileError> {
    let try_fn = ctx.fresh_temp();
    let statements = block_statements(module, block)?.to_vec();
    ctx.writeln(&format!("local function {try_fn}()"));
    ctx.indent();
    emit_statement_list(module, ctx, &statements)?;
    ctx.dedent();
    ctx.writeln("end");

    let ok_var = format!("{try_fn}_ok");
    let err_var = format!("{try_fn}_err");
    ctx.writeln(&format!("local {ok_var}, {err_var} = pcall({try_fn})"));

    if let Some(handler_id) = handler {
        let Some(NodeKind::CatchClause { param, body }) = module.node(handler_id).map(|n| &n.kind) else {
            return Err(CompileError::UnsupportedKind { kind: "try handler that is not a CatchClause".to_string() });
        };
        ctx.writeln(&format!("if not {ok_var} then"));
        ctx.indent();
        if let Some(param_id) = param {
            for line in emit_pattern_bindings(module, ctx, param_id, &err_var, true)? {
                ctx.writeln(&line);
            }
        }
        let handler_statements = block_statements(module, body)?.to_vec();
        emit_statement_list(module, ctx, &handler_statements)?;
        ctx.dedent();
        ctx.writeln("end");
    }

    if let Some(finalizer_id) = finalizer {
        let finalizer_statements = block_statements(module, finalizer_id)?.to_vec();
        emit_statement_list(module, ctx, &finalizer_statements)?;
    }

    // With no handler, the caught error must still propagate once any
    // finalizer has run.
    if handler.is_none() {
        ctx.writeln(&format!("if not {ok_var} then error({err_var}) end"));
    }
    Ok(())
}

fn emit_function_declaration(
    module: &IrModule,
    ctx: &mut EmitContext,
    name_id: &NodeId,
    params: &[NodeId],
    body: &NodeId,
    is_async: bool,
    is_generator: bool,
) -> Result<(), CompileError> {
    let name = match module.node(name_id).map(|n| &n.kind) {
        Some(NodeKind::Identifier { name }) => name.clone(),
        _ => return Err(CompileError::UnsupportedKind { kind: "function declaration id that is not an Identifier".to_string() }),
    };

    if is_async || is_generator {
        let body_text = crate::function::emit_function_expression_body(module, ctx, params, body, is_async, is_generator)?;
        ctx.writeln(&format!("local {name} = {body_text}"));
        return Ok(());
    }

    let emission = emit_params(module, ctx, params)?;
    let statements = block_statements(module, body)?.to_vec();
    ctx.writeln(&format!("local function {name}({})", emission.signature));
    ctx.indent();
    for line in &emission.prologue {
        ctx.writeln(line);
    }
    emit_statement_list(module, ctx, &statements)?;
    ctx.dedent();
    ctx.writeln("end");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use luascript_ir::Builder;

    fn new_ctx(options: &crate::context::EmitOptions) -> EmitContext<'_> {
        EmitContext::new(options)
    }

    #[test]
    fn plain_variable_declaration_emits_local_assignment() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = new_ctx(&options);
        let mut b = Builder::new();
        let name = b.make_node(NodeKind::Identifier { name: "x".into() });
        let init = b.make_node(NodeKind::Literal { value: luascript_ir::LiteralValue::Number(1.0), type_annotation: None });
        let decl = b.make_node(NodeKind::VariableDeclarator { name, init: Some(init), var_kind: "let".into() });
        let declaration = b.make_node(NodeKind::VariableDeclaration { declarations: vec![decl], declaration_kind: "let".into() });
        let module = b.finish();
        emit_statement(&module, &mut ctx, &declaration).unwrap();
        assert_eq!(ctx.take_output(), "local x = 1\n");
    }

    #[test]
    fn binary_variable_init_is_parenthesized() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = new_ctx(&options);
        let mut b = Builder::new();
        let name = b.make_node(NodeKind::Identifier { name: "s".into() });
        let x = b.make_node(NodeKind::Literal { value: luascript_ir::LiteralValue::Str("x".into()), type_annotation: None });
        let y = b.make_node(NodeKind::Identifier { name: "y".into() });
        let init = b.make_node(NodeKind::BinaryExpression { operator: "+".into(), left: x, right: y });
        let decl = b.make_node(NodeKind::VariableDeclarator { name, init: Some(init), var_kind: "let".into() });
        let declaration = b.make_node(NodeKind::VariableDeclaration { declarations: vec![decl], declaration_kind: "let".into() });
        let module = b.finish();
        emit_statement(&module, &mut ctx, &declaration).unwrap();
        assert_eq!(ctx.take_output(), "local s = (\"x\" .. y)\n");
    }

    #[test]
    fn binary_return_value_is_parenthesized() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = new_ctx(&options);
        let mut b = Builder::new();
        let a = b.make_node(NodeKind::Identifier { name: "a".into() });
        let c = b.make_node(NodeKind::Identifier { name: "b".into() });
        let sum = b.make_node(NodeKind::BinaryExpression { operator: "+".into(), left: a, right: c });
        let ret = b.make_node(NodeKind::ReturnStatement { argument: Some(sum) });
        let module = b.finish();
        emit_statement(&module, &mut ctx, &ret).unwrap();
        assert_eq!(ctx.take_output(), "return (a + b)\n");
    }

    #[test]
    fn if_else_chain_emits_elseif() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = new_ctx(&options);
        let mut b = Builder::new();
        let test1 = b.make_node(NodeKind::Identifier { name: "a".into() });
        let consequent1 = b.make_node(NodeKind::BlockStatement { body: vec![] });
        let test2 = b.make_node(NodeKind::Identifier { name: "b".into() });
        let consequent2 = b.make_node(NodeKind::BlockStatement { body: vec![] });
        let else_block = b.make_node(NodeKind::BlockStatement { body: vec![] });
        let inner_if = b.make_node(NodeKind::IfStatement { test: test2, consequent: consequent2, alternate: Some(else_block) });
        let outer_if = b.make_node(NodeKind::IfStatement { test: test1, consequent: consequent1, alternate: Some(inner_if) });
        let module = b.finish();
        emit_statement(&module, &mut ctx, &outer_if).unwrap();
        let out = ctx.take_output();
        assert!(out.contains("if a then"));
        assert!(out.contains("elseif b then"));
        assert!(out.contains("else"));
    }

    #[test]
    fn continue_statement_gotos_current_loop_label() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = new_ctx(&options);
        let mut b = Builder::new();
        let test = b.make_node(NodeKind::Literal { value: luascript_ir::LiteralValue::Bool(true), type_annotation: None });
        let cont = b.make_node(NodeKind::ContinueStatement { label: None });
        let body = b.make_node(NodeKind::BlockStatement { body: vec![cont] });
        let while_stmt = b.make_node(NodeKind::WhileStatement { test, body });
        let module = b.finish();
        emit_statement(&module, &mut ctx, &while_stmt).unwrap();
        let out = ctx.take_output();
        assert!(out.contains("goto continue_loop_0"));
        assert!(out.contains("::continue_loop_0::"));
    }

    #[test]
    fn throw_statement_becomes_error_call() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = new_ctx(&options);
        let mut b = Builder::new();
        let arg = b.make_node(NodeKind::Literal { value: luascript_ir::LiteralValue::Str("bad".into()), type_annotation: None });
        let throw_stmt = b.make_node(NodeKind::ThrowStatement { argument: arg });
        let module = b.finish();
        emit_statement(&module, &mut ctx, &throw_stmt).unwrap();
        assert_eq!(ctx.take_output(), "error(\"bad\")\n");
    }

    #[test]
    fn try_catch_uses_pcall() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = new_ctx(&options);
        let mut b = Builder::new();
        let block = b.make_node(NodeKind::BlockStatement { body: vec![] });
        let catch_body = b.make_node(NodeKind::BlockStatement { body: vec![] });
        let handler = b.make_node(NodeKind::CatchClause { param: None, body: catch_body });
        let try_stmt = b.make_node(NodeKind::TryStatement { block, handler: Some(handler), finalizer: None });
        let module = b.finish();
        emit_statement(&module, &mut ctx, &try_stmt).unwrap();
        let out = ctx.take_output();
        assert!(out.contains("pcall"));
        assert!(out.contains("if not"));
    }
}
