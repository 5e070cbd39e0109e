//! `CompileOptions`: a plain, validated-at-construction config struct.
//! Config *loading* (file discovery, env merging) is out of scope — the
//! caller builds one of these directly.

use luascript_diagnostic::CompileError;

const MAX_INDENT_LEN: usize = 8;

#[derive(Clone, Debug)]
pub struct CompileOptions {
    pub validate: bool,
    pub emit_debug_info: bool,
    pub indent: String,
    pub compatibility_mode: bool,
    pub strict_mode: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            validate: true,
            emit_debug_info: false,
            indent: "  ".to_string(),
            compatibility_mode: true,
            strict_mode: false,
        }
    }
}

impl CompileOptions {
    /// Rejects configurations that can't be acted on consistently: an
    /// oversized indent string, or `strictMode` paired with
    /// `compatibilityMode` turned off (strict mode's whole point is to
    /// promote compatibility-mode warnings to errors, so it's meaningless
    /// without compatibility mode enabled).
    pub fn validate_self(&self) -> Result<(), CompileError> {
        if self.indent.len() > MAX_INDENT_LEN {
            return Err(CompileError::InvalidInput(format!(
                "indent string longer than {MAX_INDENT_LEN} characters: {:?}",
                self.indent
            )));
        }
        if self.strict_mode && !self.compatibility_mode {
            return Err(CompileError::InvalidInput(
                "strictMode requires compatibilityMode (strict mode promotes compatibility-mode warnings to errors)".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        assert!(CompileOptions::default().validate_self().is_ok());
    }

    #[test]
    fn oversized_indent_is_rejected() {
        let opts = CompileOptions { indent: "         ".to_string(), ..CompileOptions::default() };
        assert!(opts.validate_self().is_err());
    }

    #[test]
    fn strict_without_compatibility_is_rejected() {
        let opts = CompileOptions { strict_mode: true, compatibility_mode: false, ..CompileOptions::default() };
        assert!(opts.validate_self().is_err());
    }

    #[test]
    fn strict_with_compatibility_is_accepted() {
        let opts = CompileOptions { strict_mode: true, compatibility_mode: true, ..CompileOptions::default() };
        assert!(opts.validate_self().is_ok());
    }
}
