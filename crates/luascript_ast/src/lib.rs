//! Converts a parser's raw, loosely-typed tree into the canonical
//! ESTree-shaped AST that the lowerer consumes.

mod ast;
mod normalizer;
mod raw;
mod regex_fallback;
mod rewrite;

pub use ast::{CanonicalNode, Program};
pub use normalizer::{AlternativeParser, Normalizer, DEFAULT_MAX_DEPTH};
pub use raw::{identity, RawField, RawNode, RawRef};
pub use regex_fallback::MAX_FALLBACK_SOURCE_LEN;

/// Convenience entry point: normalizes `root` with default settings and no
/// fallback recovery.
pub fn normalize(root: &RawRef) -> Result<Program, luascript_diagnostic::CompileError> {
    Normalizer::new().normalize(root)
}
