//! Core compilation pipeline: normalize -> lower -> transform -> validate
//! -> emit.
//!
//! Portable (no IO, no lexer/parser — `source` is already a raw,
//! dynamically-typed parse tree handed over by an external collaborator,
//! per the input-AST contract). Single synchronous function call in, a
//! [`CompileResult`] out.

use luascript_ast::{normalize, RawRef};
use luascript_codegen::EmitOptions;
use luascript_ext::{ExtensionRegistry, RunMode};
use luascript_ir::IrModule;

use crate::options::CompileOptions;
use crate::output::{CompileResult, ErrorPhase};

/// Compiles a raw parse tree to Lua source text.
///
/// `extensions` is an optional, caller-supplied registry of IR->IR
/// transforms run between lowering and emission; pass `None` to skip the
/// extension stage entirely.
#[tracing::instrument(skip(root, extensions), fields(validate = options.validate, strict = options.strict_mode))]
pub fn compile(root: &RawRef, options: &CompileOptions, extensions: Option<&ExtensionRegistry>) -> CompileResult {
    if let Err(e) = options.validate_self() {
        return CompileResult::failure(ErrorPhase::Normalize, vec![e.to_string()]);
    }

    let program = match normalize(root) {
        Ok(p) => p,
        Err(e) => return CompileResult::failure(ErrorPhase::Normalize, vec![e.to_string()]),
    };

    let mut module = match luascript_lower::lower_program(&program) {
        Ok(m) => m,
        Err(e) => return CompileResult::failure(ErrorPhase::Lower, vec![e.to_string()]),
    };

    let mut warnings = Vec::new();

    if let Some(registry) = extensions {
        if !registry.is_empty() {
            let run_mode = if options.strict_mode { RunMode::Strict } else { RunMode::Compatibility };
            let (rewritten, queue) = registry.run(module, run_mode);
            module = rewritten;
            let (errors, mut transform_warnings) = queue.into_messages();
            if !errors.is_empty() {
                return CompileResult::failure(ErrorPhase::Transform, errors);
            }
            warnings.append(&mut transform_warnings);
        }
    }

    if options.validate {
        let report = luascript_validate::validate_module(&module);
        let (errors, mut validate_warnings) = report.into_queue().into_messages();
        if !errors.is_empty() {
            return CompileResult::failure(ErrorPhase::Validate, errors);
        }
        warnings.append(&mut validate_warnings);
    }

    let emit_options = EmitOptions { indent: options.indent.clone(), emit_debug_info: options.emit_debug_info };
    let code = match luascript_codegen::emit_module(&module, &emit_options) {
        Ok(c) => c,
        Err(e) => return CompileResult::failure(ErrorPhase::Emit, vec![e.to_string()]),
    };

    CompileResult {
        success: true,
        code,
        errors: Vec::new(),
        warnings,
        error_phase: None,
        ast: Some(program),
        ir: Some(module),
    }
}

/// Lowers a raw parse tree through normalize + lower only, without
/// transforms, validation, or emission. Used by the golden harness, which
/// compares IR shape, not emitted text.
pub fn lower_to_ir(root: &RawRef) -> Result<IrModule, luascript_diagnostic::CompileError> {
    let program = normalize(root)?;
    luascript_lower::lower_program(&program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use luascript_ast::{RawField, RawNode};

    fn ident(name: &str) -> RawRef {
        RawNode::new("Identifier").with_field("name", RawField::Str(name.into()))
    }

    fn simple_program() -> RawRef {
        let decl = RawNode::new("VariableDeclarator")
            .with_field("id", RawField::node(ident("x")))
            .with_field("init", RawField::node(
                RawNode::new("Literal").with_field("value", RawField::Num(1.0)),
            ));
        let declaration = RawNode::new("VariableDeclaration")
            .with_field("kind", RawField::Str("let".into()))
            .with_field("declarations", RawField::List(vec![RawField::node(decl)]));
        RawNode::new("Program").with_field("body", RawField::List(vec![RawField::node(declaration)]))
    }

    #[test]
    fn compiles_a_trivial_program_end_to_end() {
        let root = simple_program();
        let result = compile(&root, &CompileOptions::default(), None);
        assert!(result.success, "errors: {:?}", result.errors);
        assert_eq!(result.code, "local x = 1\n");
        assert!(result.ir.is_some());
        assert!(result.ast.is_some());
    }

    #[test]
    fn invalid_options_fail_before_normalization_runs() {
        let root = simple_program();
        let opts = CompileOptions { strict_mode: true, compatibility_mode: false, ..CompileOptions::default() };
        let result = compile(&root, &opts, None);
        assert!(!result.success);
        assert_eq!(result.error_phase, Some(ErrorPhase::Normalize));
    }

    #[test]
    fn non_program_root_fails_at_normalize() {
        let root = ident("x");
        let result = compile(&root, &CompileOptions::default(), None);
        assert!(!result.success);
        assert_eq!(result.error_phase, Some(ErrorPhase::Normalize));
    }
}
