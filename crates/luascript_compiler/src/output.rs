//! Result types for the portable compile pipeline: the public interface
//! between the driver and its consumers (CLI, tests, embedders).

use luascript_ast::Program;
use luascript_ir::IrModule;

/// Which stage produced a fatal error, when `success` is `false`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPhase {
    Normalize,
    Lower,
    Transform,
    Validate,
    Emit,
}

/// `compile(source, options) -> {code, errors, warnings, ir?, ast?}`.
#[derive(Clone, Debug)]
pub struct CompileResult {
    pub success: bool,
    pub code: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub error_phase: Option<ErrorPhase>,
    pub ast: Option<Program>,
    pub ir: Option<IrModule>,
}

impl CompileResult {
    pub(crate) fn failure(phase: ErrorPhase, errors: Vec<String>) -> Self {
        CompileResult {
            success: false,
            code: String::new(),
            errors,
            warnings: Vec::new(),
            error_phase: Some(phase),
            ast: None,
            ir: None,
        }
    }
}
