use thiserror::Error;

pub type DirectiveResult<T> = Result<T, DirectiveError>;

/// Why a directive argument list could not be parsed.
///
/// These never surface as diagnostics: a directive that fails to parse simply
/// has no effect on the document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectiveError {
    #[error("Unexpected token at {pos}: expected {expected}, found {found}")]
    UnexpectedToken {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Unclosed group starting before {pos}")]
    UnclosedGroup { pos: usize },

    #[error("Missing value for argument '{name}' at {pos}")]
    MissingValue { pos: usize, name: String },

    #[error("'{target}' has no argument list")]
    MissingArguments { target: String },
}

impl DirectiveError {
    pub fn pos(&self) -> Option<usize> {
        match self {
            DirectiveError::UnexpectedToken { pos, .. } => Some(*pos),
            DirectiveError::UnclosedGroup { pos } => Some(*pos),
            DirectiveError::MissingValue { pos, .. } => Some(*pos),
            DirectiveError::MissingArguments { .. } => None,
        }
    }
}
