use crate::{Diagnostic, Severity};

/// Accumulates diagnostics across a single compile call without
/// short-circuiting on the first one.
///
/// Short-circuiting is still explicit where it's needed: the pipeline
/// checks `queue.has_errors()` itself after validation and stops before
/// emission rather than relying on the queue to abort anything.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, other: DiagnosticQueue) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_messages(self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        for d in self.diagnostics {
            match d.severity {
                Severity::Error => errors.push(d.message),
                Severity::Warning => warnings.push(d.message),
                Severity::Note => {}
            }
        }
        (errors, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_errors_ignores_warnings() {
        let mut q = DiagnosticQueue::new();
        q.push(Diagnostic::warning("careful"));
        assert!(!q.has_errors());
        q.push(Diagnostic::error("boom"));
        assert!(q.has_errors());
    }

    #[test]
    fn into_messages_splits_by_severity() {
        let mut q = DiagnosticQueue::new();
        q.push(Diagnostic::error("e1"));
        q.push(Diagnostic::warning("w1"));
        q.push(Diagnostic::note("n1"));
        let (errors, warnings) = q.into_messages();
        assert_eq!(errors, vec!["e1".to_string()]);
        assert_eq!(warnings, vec!["w1".to_string()]);
    }
}
