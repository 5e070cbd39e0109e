//! Per-kind structural checks: required fields and arity constraints that
//! can be decided by looking only at a node's own fields, not the rest of
//! the module. Checks that need to resolve a child id's kind (rest-element
//! placement, assignment-target addressability) live in [`crate::module`]
//! alongside the other referential checks, since they need the node table.

use luascript_diagnostic::{Diagnostic, DiagnosticQueue, Label};
use luascript_ir::{IrModule, Node, NodeKind};

/// Walks every interned node and checks kind-specific constraints
/// (identifier names non-empty, variable declarations non-empty, template
/// literal quasi/expression arity). Unlike a panic-based invariant check,
/// this never aborts: every violation is pushed as a diagnostic and the
/// walk continues, so a single malformed node doesn't hide the rest.
pub fn check_structural(module: &IrModule) -> DiagnosticQueue {
    let mut queue = DiagnosticQueue::new();
    for node in module.nodes.values() {
        check_node(node, &mut queue);
    }
    queue
}

fn check_node(node: &Node, queue: &mut DiagnosticQueue) {
    match &node.kind {
        NodeKind::Identifier { name } => {
            if name.is_empty() {
                queue.push(error_at(node, "Identifier.name must not be empty"));
            }
        }
        NodeKind::VariableDeclaration { declarations, .. } => {
            if declarations.is_empty() {
                queue.push(error_at(node, "VariableDeclaration must declare at least one binding"));
            }
        }
        NodeKind::FunctionDeclaration { id, .. } => {
            if id.is_empty() {
                queue.push(error_at(node, "FunctionDeclaration.id must not be empty"));
            }
        }
        NodeKind::TemplateLiteral { quasis, expressions } => {
            if quasis.len() != expressions.len() + 1 {
                queue.push(error_at(
                    node,
                    format!(
                        "TemplateLiteral must have one more quasi than expression, got {} quasis and {} expressions",
                        quasis.len(),
                        expressions.len()
                    ),
                ));
            }
        }
        _ => {}
    }
}

fn error_at(node: &Node, message: impl Into<String>) -> Diagnostic {
    let mut diag = Diagnostic::error(message).with_note(format!("node id: {}", node.id));
    if let Some(span) = node.span {
        diag = diag.with_label(Label::primary(span, "here"));
    }
    diag
}
