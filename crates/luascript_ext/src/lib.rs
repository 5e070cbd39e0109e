//! Priority-ordered registry of IR→IR transforms, run between lowering
//! and emission. A transform is opt-in and self-describing (name,
//! version, priority, tags) and re-checks its own output before the
//! registry commits it — see [`Transform`] for the contract and
//! [`ExtensionRegistry`] for how failures are handled in compatibility vs.
//! strict mode.

mod registry;
mod transform;

pub use registry::{ExtensionRegistry, RunMode};
pub use transform::{Transform, TransformContext, TransformOutcome};
