//! Validates a lowered IR module without ever panicking on malformed
//! input: malformed IR is an expected, reportable condition (bad input, a
//! misbehaving transform), not an internal bug, so every check here
//! collects into a [`DiagnosticQueue`] instead of asserting.
//!
//! Two passes run independently and their results are merged:
//! - [`structural`]: per-node-kind field and arity checks.
//! - [`module`]: whole-module checks that need the node table — schema
//!   version, referential integrity and acyclicity, CFG linkage, span
//!   validity, rest-element placement, assignment-target addressability,
//!   and `var_kind`/`declaration_kind` agreement.

mod module;
mod structural;

use luascript_diagnostic::DiagnosticQueue;
use luascript_ir::IrModule;

/// The outcome of validating a module: whether it's safe to hand to the
/// emitter, plus everything worth telling the caller either way.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub ok: bool,
    queue: DiagnosticQueue,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &luascript_diagnostic::Diagnostic> {
        self.queue.errors()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &luascript_diagnostic::Diagnostic> {
        self.queue.warnings()
    }

    pub fn all(&self) -> &[luascript_diagnostic::Diagnostic] {
        self.queue.all()
    }

    pub fn into_queue(self) -> DiagnosticQueue {
        self.queue
    }
}

/// Runs every structural and referential check against `module` and
/// reports the combined result. Always returns a report — there is no
/// error path, since "the IR is invalid" is itself a valid, expected
/// outcome of validation.
pub fn validate_module(module: &IrModule) -> ValidationReport {
    let mut queue = DiagnosticQueue::new();
    queue.extend(module::check_schema_version(module));
    queue.extend(structural::check_structural(module));
    queue.extend(module::check_referential_integrity(module));
    queue.extend(module::check_cfg_linkage(module));
    queue.extend(module::check_span_validity(module));
    queue.extend(module::check_rest_placement(module));
    queue.extend(module::check_assignment_targets(module));
    queue.extend(module::check_var_kind_agreement(module));

    let ok = !queue.has_errors();
    tracing::debug!(ok, error_count = queue.errors().count(), "validated IR module");
    ValidationReport { ok, queue }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luascript_ir::{Builder, NodeKind};

    #[test]
    fn empty_module_is_valid() {
        let module = Builder::new().finish();
        let report = validate_module(&module);
        assert!(report.ok);
    }

    #[test]
    fn broken_reference_in_body_fails_validation() {
        let mut b = Builder::new();
        b.set_module_body(vec!["node_missing".into()]);
        let module = b.finish();
        let report = validate_module(&module);
        assert!(!report.ok);
        assert!(report.errors().count() >= 1);
    }

    #[test]
    fn well_formed_program_passes_every_check() {
        let mut b = Builder::new();
        let name = b.make_node(NodeKind::Identifier { name: "x".into() });
        let init = b.make_node(NodeKind::Literal {
            value: luascript_ir::LiteralValue::Number(1.0),
            type_annotation: None,
        });
        let declarator = b.make_node(NodeKind::VariableDeclarator {
            name,
            init: Some(init),
            var_kind: "const".into(),
        });
        let decl = b.make_node(NodeKind::VariableDeclaration {
            declarations: vec![declarator],
            declaration_kind: "const".into(),
        });
        b.set_module_body(vec![decl]);
        let module = b.finish();
        assert!(validate_module(&module).ok);
    }
}
