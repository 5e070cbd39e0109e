//! The `Transform` contract: an IR→IR rewrite registered with the
//! registry and run between lowering and emission.

use luascript_diagnostic::CompileError;
use luascript_ir::{Builder, Node, NodeKind};

/// The mutable handle a transform gets while rewriting one node. Wraps the
/// module's `Builder` so a transform can synthesize helper nodes (a new
/// temp identifier, a wrapped expression) that its replacement `NodeKind`
/// then references.
pub struct TransformContext<'a> {
    pub builder: &'a mut Builder,
}

impl<'a> TransformContext<'a> {
    pub fn new(builder: &'a mut Builder) -> Self {
        TransformContext { builder }
    }
}

/// The result of re-checking a transform's own output. Distinct from a
/// `transform()` error: `transform()` failing means the rewrite itself
/// couldn't be computed, while an invalid `TransformOutcome` means the
/// rewrite ran but produced something the transform's own author doesn't
/// trust (e.g. it changed a node's arity in a way its invariants forbid).
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl TransformOutcome {
    pub fn ok() -> Self {
        TransformOutcome { valid: true, errors: Vec::new() }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        TransformOutcome { valid: false, errors }
    }
}

/// An IR→IR transform, canProcess(node),
/// transform(node, context), validate(original, transformed)}`).
///
/// A transform never replaces a node's id — only its `NodeKind` payload —
/// so every other node's references to it stay valid without a
/// module-wide rewrite pass (see [`luascript_ir::Builder::replace_kind`]).
pub trait Transform {
    fn name(&self) -> &str;
    fn version(&self) -> &str;

    /// Ascending: lower runs first.
    fn priority(&self) -> i32;

    fn tags(&self) -> &[&str] {
        &[]
    }

    fn enabled(&self) -> bool {
        true
    }

    fn describe(&self) -> &str;

    /// Whether this transform applies to `node` at all. Checked before
    /// `transform` is ever called, so a transform that only cares about
    /// (say) `ForOfStatement` nodes doesn't need a catch-all no-op arm.
    fn can_process(&self, node: &Node) -> bool;

    /// Computes the replacement payload for `node`. Returning `Err` means
    /// the rewrite couldn't be computed at all and is treated the same as
    /// a failed `validate` (warning in compatibility mode, fatal in strict
    /// mode).
    fn transform(&self, node: &Node, context: &mut TransformContext) -> Result<NodeKind, CompileError>;

    /// Re-checks `transformed` (the node as it will read after `transform`
    /// is applied) against `original`. Runs immediately after `transform`,
    /// before the replacement is committed.
    fn validate(&self, original: &Node, transformed: &Node) -> TransformOutcome;
}
