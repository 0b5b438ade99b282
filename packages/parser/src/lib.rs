pub mod ast;
pub mod classifier;
pub mod directive;
pub mod error;
pub mod incremental;
pub mod lexer;
pub mod token;

pub use ast::{Block, BlockKind, Classification, DocumentStyle};
pub use classifier::{classify, classify_with_style};
pub use error::{DirectiveError, DirectiveResult};
pub use incremental::{CacheStats, LineCache};
pub use lexer::{tokenize, tokenize_line, tokenize_line_at};
pub use token::{line_text, Token, TokenKind};
