//! AST → IR lowering state and entry point.

use luascript_ast::Program;
use luascript_diagnostic::CompileError;
use luascript_ir::{Builder, IrModule, NodeId};

use crate::scope::ScopeStack;

pub struct Lowerer {
    pub(crate) builder: Builder,
    pub(crate) scopes: ScopeStack,
}

impl Lowerer {
    pub fn new() -> Self {
        Lowerer {
            builder: Builder::new(),
            scopes: ScopeStack::new(),
        }
    }

    pub(crate) fn node(&self, id: &str) -> Option<&luascript_ir::Node> {
        self.builder.node(id)
    }
}

impl Default for Lowerer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowers a normalized program into a complete IR module.
pub fn lower_program(program: &Program) -> Result<IrModule, CompileError> {
    let mut lowerer = Lowerer::new();
    let body = lowerer.lower_stmt_list(&program.body)?;
    lowerer.builder.set_module_body(body);
    Ok(lowerer.builder.finish())
}

/// Helper shared by statement-list lowering contexts (`Program.body`,
/// `BlockStatement.body`): a single source statement may expand into more
/// than one IR statement (classes become a constructor plus method
/// assignments), so callers collect `Vec<NodeId>` rather than one-to-one.
pub(crate) fn flatten(groups: Vec<Vec<NodeId>>) -> Vec<NodeId> {
    groups.into_iter().flatten().collect()
}
