use thiserror::Error;

/// The error taxonomy for the compiler core.
///
/// Every stage returns `Result<_, CompileError>` (or collects these into a
/// `DiagnosticQueue`); panics are reserved for `InternalError`-class bugs
/// that the caller can never legitimately trigger.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CompileError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported construct: {type_name}")]
    UnsupportedConstruct { type_name: String },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("broken reference: node id {id} does not exist")]
    BrokenReference { id: String },

    #[error("unsupported IR kind: {kind}")]
    UnsupportedKind { kind: String },

    #[error("conflicting transform name: {name}")]
    ConflictingName { name: String },

    #[error("invalid transform: {name}: {reason}")]
    InvalidTransform { name: String, reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl CompileError {
    /// Whether this error class is always a bug in the core itself, never
    /// something a caller can trigger by supplying bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, CompileError::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_human_readable() {
        let e = CompileError::UnsupportedConstruct {
            type_name: "BigIntLiteral".to_string(),
        };
        assert_eq!(e.to_string(), "unsupported construct: BigIntLiteral");
    }

    #[test]
    fn internal_errors_are_flagged() {
        assert!(CompileError::Internal("scope stack underflow".into()).is_internal());
        assert!(!CompileError::InvalidInput("not a Program".into()).is_internal());
    }
}
