//! Diagnostic and error plumbing shared by every stage of the compiler core.
//!
//! - Each stage returns a structured result carrying errors and warnings.
//! - The pipeline short-circuits on validator failure before emission.
//! - The emitter never writes to stderr; the caller formats diagnostics.

mod diagnostic;
mod error;
mod queue;
mod span;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error::CompileError;
pub use queue::DiagnosticQueue;
pub use span::Span;
