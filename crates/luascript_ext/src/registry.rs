//! Orders registered transforms by ascending priority and runs each one
//! sequentially against every node it applies to.

use luascript_diagnostic::{CompileError, Diagnostic, DiagnosticQueue};
use luascript_ir::{Builder, IrModule, Node};

use crate::transform::{Transform, TransformContext};

/// Whether a failed transform application becomes a warning (its output is
/// discarded, the node reverts to its pre-transform state) or a fatal
/// error that stops the whole run.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RunMode {
    Compatibility,
    Strict,
}

/// Holds registered transforms, keyed uniquely by name. Not `Sync`/`Send`
/// by design — the core is single-threaded and synchronous, so a registry
/// never needs to be shared across threads.
#[derive(Default)]
pub struct ExtensionRegistry {
    transforms: Vec<Box<dyn Transform>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transform. Rejects a duplicate name with
    /// `ConflictingName` and a transform whose own metadata is malformed
    /// (an empty name or version) with `InvalidTransform`.
    pub fn register(&mut self, transform: Box<dyn Transform>) -> Result<(), CompileError> {
        if transform.name().is_empty() || transform.version().is_empty() {
            return Err(CompileError::InvalidTransform {
                name: transform.name().to_string(),
                reason: "name and version must both be non-empty".to_string(),
            });
        }
        if self.transforms.iter().any(|t| t.name() == transform.name()) {
            return Err(CompileError::ConflictingName { name: transform.name().to_string() });
        }
        self.transforms.push(transform);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Runs every enabled transform, in ascending priority order, against
    /// `module`. Each transform observes the IR as it stood after the
    /// previous transform committed.
    ///
    /// Returns the (possibly rewritten) module alongside every diagnostic
    /// collected along the way. In [`RunMode::Strict`], the first failed
    /// transform application stops the run immediately and the module
    /// reflects only the transforms that fully succeeded up to that point.
    pub fn run(&self, module: IrModule, mode: RunMode) -> (IrModule, DiagnosticQueue) {
        let mut queue = DiagnosticQueue::new();
        let mut builder = Builder::from_module(module);

        let mut ordered: Vec<&Box<dyn Transform>> = self.transforms.iter().filter(|t| t.enabled()).collect();
        ordered.sort_by_key(|t| t.priority());

        for transform in ordered {
            let candidate_ids: Vec<String> = builder
                .module()
                .nodes
                .iter()
                .filter(|(_, node)| transform.can_process(node))
                .map(|(id, _)| id.clone())
                .collect();

            let mut aborted = false;
            for id in candidate_ids {
                let Some(original) = builder.node(&id).cloned() else {
                    continue;
                };
                let outcome = apply_one(transform.as_ref(), &original, &mut builder);
                match outcome {
                    Ok(()) => {}
                    Err(message) => {
                        match mode {
                            RunMode::Compatibility => {
                                builder.replace_kind(&id, original.kind.clone());
                                queue.push(
                                    Diagnostic::warning(format!(
                                        "transform {:?} discarded on node {id}: {message}",
                                        transform.name()
                                    ))
                                    .with_note(format!("transform version {}", transform.version())),
                                );
                            }
                            RunMode::Strict => {
                                builder.replace_kind(&id, original.kind.clone());
                                queue.push(Diagnostic::error(format!(
                                    "transform {:?} failed on node {id}: {message}",
                                    transform.name()
                                )));
                                aborted = true;
                            }
                        }
                    }
                }
                if aborted {
                    break;
                }
            }
            if aborted {
                break;
            }
        }

        (builder.finish(), queue)
    }
}

/// Runs one transform against one node: computes the replacement, installs
/// it, re-validates, and reports the outcome as a single `Result` so the
/// caller's commit/revert logic doesn't need to know whether the failure
/// came from `transform()` itself or from `validate()`.
fn apply_one(transform: &dyn Transform, original: &Node, builder: &mut Builder) -> Result<(), String> {
    let mut ctx = TransformContext::new(builder);
    let new_kind = transform.transform(original, &mut ctx).map_err(|e| e.to_string())?;

    builder.replace_kind(&original.id, new_kind);
    let transformed = builder
        .node(&original.id)
        .cloned()
        .expect("node just written by replace_kind must exist");

    let outcome = transform.validate(original, &transformed);
    if outcome.valid {
        Ok(())
    } else {
        Err(if outcome.errors.is_empty() {
            "validate() reported the transformed node as invalid".to_string()
        } else {
            outcome.errors.join("; ")
        })
    }
}
