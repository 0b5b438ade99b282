//! Error types for the preview pipeline

use crate::pipeline::Diagnostic;
use folio_renderer::RenderError;
use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Compiler panicked: {0}")]
    Panicked(String),
}

impl CompileError {
    /// Diagnostic shown in the preview banner
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Render(err) => Diagnostic::at_line(err.to_string(), err.line()),
            CompileError::Panicked(message) => Diagnostic::new(message.clone()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid base font size {0}pt: must be a positive number")]
    InvalidFontSize(f64),

    #[error("Base font family must not be empty")]
    EmptyFontFamily,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_diagnostic_carries_line() {
        let err = CompileError::from(RenderError::EmptyFontFamily { line: 3 });
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.line, Some(3));
        assert_eq!(diagnostic.message, "Empty font family for block at line 4");
    }

    #[test]
    fn test_panic_diagnostic_has_no_line() {
        let diagnostic = CompileError::Panicked("boom".to_string()).to_diagnostic();
        assert_eq!(diagnostic.message, "boom");
        assert_eq!(diagnostic.line, None);
    }
}
