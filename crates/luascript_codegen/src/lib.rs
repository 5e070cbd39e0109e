//! IR module to Lua source text.

mod class;
mod context;
mod destructure;
mod expr;
mod function;
mod literal;
mod operators;
mod prelude;
mod stmt;

pub use context::{EmitContext, EmitOptions};

use luascript_diagnostic::CompileError;
use luascript_ir::IrModule;

use prelude::{ASYNC_GENERATOR_HELPER, AWAIT_VALUE_HELPER};
use stmt::emit_statement_list;

/// Lowers `module`'s statement list to a single Lua source string,
/// prepending the `__await_value`/`__async_generator` prelude helpers only
/// when the emitted body actually ends up needing them.
pub fn emit_module(module: &IrModule, options: &EmitOptions) -> Result<String, CompileError> {
    let mut ctx = EmitContext::new(options);
    emit_statement_list(module, &mut ctx, &module.module.body)?;
    let body = ctx.take_output();

    let mut out = String::with_capacity(body.len() + 256);
    if ctx.needs_async_generator() {
        out.push_str(ASYNC_GENERATOR_HELPER);
        out.push('\n');
    }
    if ctx.needs_await_value() {
        out.push_str(AWAIT_VALUE_HELPER);
        out.push('\n');
    }
    out.push_str(&body);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use luascript_ir::{Builder, LiteralValue, NodeKind};

    #[test]
    fn emits_a_single_top_level_variable_declaration() {
        let mut b = Builder::new();
        let lit = b.make_node(NodeKind::Literal { value: LiteralValue::Number(1.0), type_annotation: None });
        let name = b.make_node(NodeKind::Identifier { name: "x".into() });
        let decl = b.make_node(NodeKind::VariableDeclarator { name, init: Some(lit), var_kind: "let".into() });
        let declaration = b.make_node(NodeKind::VariableDeclaration { declarations: vec![decl], declaration_kind: "let".into() });
        b.set_module_body(vec![declaration]);
        let module = b.finish();

        let options = EmitOptions::default();
        let lua = emit_module(&module, &options).unwrap();
        assert_eq!(lua, "local x = 1\n");
    }

    #[test]
    fn await_expression_injects_prelude_helper_exactly_once() {
        let mut b = Builder::new();
        let arg = b.make_node(NodeKind::Identifier { name: "p".into() });
        let await_id = b.make_node(NodeKind::AwaitExpression { argument: arg });
        let stmt = b.make_node(NodeKind::ExpressionStatement { expression: await_id });
        b.set_module_body(vec![stmt]);
        let module = b.finish();

        let options = EmitOptions::default();
        let lua = emit_module(&module, &options).unwrap();
        assert!(lua.starts_with("local function __await_value"));
        assert_eq!(lua.matches("local function __await_value").count(), 1);
    }

    #[test]
    fn module_with_no_async_features_carries_no_prelude() {
        let mut b = Builder::new();
        let lit = b.make_node(NodeKind::Literal { value: LiteralValue::Bool(true), type_annotation: None });
        let stmt = b.make_node(NodeKind::ExpressionStatement { expression: lit });
        b.set_module_body(vec![stmt]);
        let module = b.finish();

        let options = EmitOptions::default();
        let lua = emit_module(&module, &options).unwrap();
        assert_eq!(lua, "true\n");
    }

    #[test]
    fn class_declaration_statements_collapse_into_colon_methods() {
        let mut b = Builder::new();
        let ctor_name = b.make_node(NodeKind::Identifier { name: "Point".into() });
        let ctor_body = b.make_node(NodeKind::BlockStatement { body: vec![] });
        let ctor = b.make_node(NodeKind::FunctionDeclaration { id: ctor_name, params: vec![], body: ctor_body, return_type: None });
        b.set_meta(&ctor, luascript_ir::Meta { class_like: true, ..Default::default() });

        let class_id = b.make_node(NodeKind::Identifier { name: "Point".into() });
        let index_key = b.make_node(NodeKind::Identifier { name: "__index".into() });
        let index_lhs = b.make_node(NodeKind::MemberExpression { object: class_id, property: index_key, computed: false, optional: false });
        let index_rhs = b.make_node(NodeKind::Identifier { name: "Point".into() });
        let index_assign = b.make_node(NodeKind::AssignmentExpression { operator: "=".into(), left: index_lhs, right: index_rhs });
        let index_stmt = b.make_node(NodeKind::ExpressionStatement { expression: index_assign });

        b.set_module_body(vec![ctor, index_stmt]);
        let module = b.finish();

        let options = EmitOptions::default();
        let lua = emit_module(&module, &options).unwrap();
        assert!(lua.contains("local Point = {}"));
        assert!(lua.contains("Point.__index = Point"));
        assert!(lua.contains("function Point.new()"));
        assert!(lua.contains("setmetatable({}, Point)"));
        assert!(lua.contains("return self"));
    }
}
