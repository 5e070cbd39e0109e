//! Whole-module checks: schema version, referential integrity of
//! `module.body` and every child id reference, CFG linkage, span validity,
//! and the agreement between a `VariableDeclarator`'s `var_kind` and its
//! parent `VariableDeclaration`'s `declaration_kind`.
//!
//! These checks need the full node table (to resolve what a referenced id
//! points at), unlike the purely local checks in [`crate::structural`].

use rustc_hash::FxHashSet;

use luascript_diagnostic::{Diagnostic, DiagnosticQueue};
use luascript_ir::{is_valid_id_shape, IrModule, NodeId, NodeKind, SCHEMA_VERSION};

pub fn check_schema_version(module: &IrModule) -> DiagnosticQueue {
    let mut queue = DiagnosticQueue::new();
    if module.schema_version != SCHEMA_VERSION {
        queue.push(Diagnostic::error(format!(
            "unsupported schema version {:?}, expected {SCHEMA_VERSION:?}",
            module.schema_version
        )));
    }
    queue
}

/// Walks every id reachable from `module.body`, checking that it resolves
/// to a node in the table and that the reachable set contains no cycles.
/// A cycle can't arise from ordinary lowering (ids only ever reference
/// earlier-built nodes) but a hand-constructed or transform-mutated module
/// could introduce one, and a cyclic IR would hang any naive recursive
/// emitter, so this is checked explicitly rather than assumed.
pub fn check_referential_integrity(module: &IrModule) -> DiagnosticQueue {
    let mut queue = DiagnosticQueue::new();
    let mut visited: FxHashSet<&NodeId> = FxHashSet::default();
    let mut on_stack: FxHashSet<&NodeId> = FxHashSet::default();

    for root in &module.module.body {
        walk(module, root, &mut visited, &mut on_stack, &mut queue);
    }

    queue
}

fn walk<'a>(
    module: &'a IrModule,
    id: &'a NodeId,
    visited: &mut FxHashSet<&'a NodeId>,
    on_stack: &mut FxHashSet<&'a NodeId>,
    queue: &mut DiagnosticQueue,
) {
    if !is_valid_id_shape(id) {
        queue.push(Diagnostic::error(format!("malformed node id {id:?}")));
        return;
    }
    let Some(node) = module.node(id) else {
        queue.push(Diagnostic::error(format!(
            "broken reference: node id {id:?} does not exist"
        )));
        return;
    };
    if on_stack.contains(id) {
        queue.push(Diagnostic::error(format!("cycle detected through node id {id:?}")));
        return;
    }
    if !visited.insert(id) {
        // Already fully walked via another path — sharing a subtree (a DAG,
        // not a tree) is legal, so this is not itself an error.
        return;
    }
    on_stack.insert(id);
    for child in node.kind.child_ids() {
        walk(module, child, visited, on_stack, queue);
    }
    on_stack.remove(id);
}

/// Checks each node with a `meta.cfg` attachment: the referenced CFG
/// exists, its entry and exit block ids are among its own blocks, and the
/// entry block's statements are a subset of the function body's statement
/// ids (the one nontrivial structural invariant the trivial entry/exit
/// shape still has to uphold).
pub fn check_cfg_linkage(module: &IrModule) -> DiagnosticQueue {
    let mut queue = DiagnosticQueue::new();
    for node in module.nodes.values() {
        let Some(cfg_ref) = node.meta.cfg.as_ref() else {
            continue;
        };
        let Some(cfg) = module.cfg(&cfg_ref.id) else {
            queue.push(Diagnostic::error(format!(
                "node {} references missing control-flow graph {:?}",
                node.id, cfg_ref.id
            )));
            continue;
        };
        if cfg.block(&cfg_ref.entry).is_none() {
            queue.push(Diagnostic::error(format!(
                "control-flow graph {:?} entry {:?} is not one of its own blocks",
                cfg.id, cfg_ref.entry
            )));
        }
        if cfg.block(&cfg_ref.exit).is_none() {
            queue.push(Diagnostic::error(format!(
                "control-flow graph {:?} exit {:?} is not one of its own blocks",
                cfg.id, cfg_ref.exit
            )));
        }

        let Some(body_ids) = function_body_statement_ids(module, node) else {
            continue;
        };
        let Some(entry_block) = cfg.block(&cfg.entry) else {
            continue;
        };
        let body_set: FxHashSet<&NodeId> = body_ids.iter().collect();
        for stmt in &entry_block.statements {
            if !body_set.contains(stmt) {
                queue.push(Diagnostic::error(format!(
                    "control-flow graph {:?} entry block statement {:?} is not in the function body",
                    cfg.id, stmt
                )));
            }
        }
    }
    queue
}

/// Resolves the statement list of a function-shaped node's body, looking
/// through the one level of indirection (`body` points at a
/// `BlockStatement`).
fn function_body_statement_ids<'a>(module: &'a IrModule, node: &luascript_ir::Node) -> Option<&'a Vec<NodeId>> {
    let body_id = match &node.kind {
        NodeKind::FunctionDeclaration { body, .. }
        | NodeKind::AsyncFunctionDeclaration { body, .. }
        | NodeKind::GeneratorDeclaration { body, .. }
        | NodeKind::FunctionExpression { body, .. }
        | NodeKind::ArrowFunctionExpression { body, .. } => body,
        _ => return None,
    };
    match &module.node(body_id)?.kind {
        NodeKind::BlockStatement { body } => Some(body),
        _ => None,
    }
}

/// Verifies every `VariableDeclarator.var_kind` equals the
/// `declaration_kind` of its enclosing `VariableDeclaration`. The lowerer
/// guarantees this by construction, but the validator has to check it
/// independently since IR handed to it may not have come through the
/// lowerer at all (a hand-built fixture, or a transform that rewrote one
/// side without the other).
pub fn check_var_kind_agreement(module: &IrModule) -> DiagnosticQueue {
    let mut queue = DiagnosticQueue::new();
    for node in module.nodes.values() {
        let NodeKind::VariableDeclaration { declarations, declaration_kind } = &node.kind else {
            continue;
        };
        for decl_id in declarations {
            let Some(decl_node) = module.node(decl_id) else {
                continue; // already reported by check_referential_integrity
            };
            let NodeKind::VariableDeclarator { var_kind, .. } = &decl_node.kind else {
                queue.push(Diagnostic::error(format!(
                    "VariableDeclaration {} references {decl_id:?} which is not a VariableDeclarator",
                    node.id
                )));
                continue;
            };
            if var_kind != declaration_kind {
                queue.push(Diagnostic::error(format!(
                    "VariableDeclarator {decl_id:?} has var_kind {var_kind:?}, but its VariableDeclaration {} declares {declaration_kind:?}",
                    node.id
                )));
            }
        }
    }
    queue
}

/// Checks that every present span has `start <= end`.
pub fn check_span_validity(module: &IrModule) -> DiagnosticQueue {
    let mut queue = DiagnosticQueue::new();
    for node in module.nodes.values() {
        if let Some(span) = node.span {
            if !span.is_valid() {
                queue.push(Diagnostic::error(format!(
                    "node {} has an invalid span ({}..{})",
                    node.id, span.start, span.end
                )));
            }
        }
    }
    queue
}

/// Checks that `RestElement`/`SpreadElement` only ever sits as the final
/// entry of a call's arguments, an object's properties, or an array
/// pattern's elements.
pub fn check_rest_placement(module: &IrModule) -> DiagnosticQueue {
    let mut queue = DiagnosticQueue::new();
    for node in module.nodes.values() {
        let ids: Vec<&NodeId> = match &node.kind {
            NodeKind::CallExpression { arguments, .. } | NodeKind::NewExpression { arguments, .. } => {
                arguments.iter().collect()
            }
            NodeKind::ArrayPattern { elements } => elements.iter().filter_map(|e| e.as_ref()).collect(),
            NodeKind::ObjectExpression { properties } | NodeKind::ObjectPattern { properties } => {
                properties.iter().collect()
            }
            _ => continue,
        };
        for (i, id) in ids.iter().enumerate() {
            let is_rest = module
                .node(id)
                .is_some_and(|n| matches!(n.kind, NodeKind::RestElement { .. } | NodeKind::SpreadElement { .. }));
            if is_rest && i + 1 != ids.len() {
                queue.push(Diagnostic::error(format!(
                    "rest/spread element {id:?} must be the last entry, found at position {i} of {}",
                    ids.len()
                )));
            }
        }
    }
    queue
}

/// Checks that every `AssignmentExpression.left` resolves to an
/// addressable shape: an identifier, a member access, or a destructuring
/// pattern. Anything else (a literal, a call result, ...) can't be an
/// assignment target in Lua any more than it can in the source language.
pub fn check_assignment_targets(module: &IrModule) -> DiagnosticQueue {
    let mut queue = DiagnosticQueue::new();
    for node in module.nodes.values() {
        let NodeKind::AssignmentExpression { left, .. } = &node.kind else {
            continue;
        };
        let Some(target) = module.node(left) else {
            continue; // already reported by check_referential_integrity
        };
        let addressable = matches!(
            target.kind,
            NodeKind::Identifier { .. } | NodeKind::MemberExpression { .. } | NodeKind::ArrayPattern { .. } | NodeKind::ObjectPattern { .. }
        );
        if !addressable {
            queue.push(Diagnostic::error(format!(
                "assignment target {left:?} is not addressable (found {:?})",
                target.kind.tag()
            )));
        }
    }
    queue
}
