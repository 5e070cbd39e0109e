//! Portable compiler driver.
//!
//! Wires `luascript_ast` -> `luascript_lower` -> `luascript_ext` ->
//! `luascript_validate` -> `luascript_codegen` behind a single
//! `compile()` entry point, plus a structural golden/parity harness for
//! regression testing.
//!
//! Provides no lexer or parser of its own: `compile()`'s `source` is an
//! already-parsed raw tree, per the input-AST contract. [`json::from_json`]
//! converts an externally-parsed JSON tree into that shape for callers
//! (such as `luascriptc`) that read source from a file on disk.

mod golden;
mod json;
mod options;
mod output;
mod pipeline;

pub use golden::{diff, summarize, ShapeDiff, ShapeSummary};
pub use json::from_json;
pub use options::CompileOptions;
pub use output::{CompileResult, ErrorPhase};
pub use pipeline::{compile, lower_to_ir};

pub use luascript_ast::RawRef;
pub use luascript_ext::{ExtensionRegistry, RunMode};
