//! Token types produced by the line lexer

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a lexed run of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Keyword,
    FunctionCall,
    StringLiteral,
    NumberLiteral,
    Comment,
    EmphasisMarkup,
    MathInline,
    Heading,
    PlainText,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::FunctionCall => "function",
            TokenKind::StringLiteral => "string",
            TokenKind::NumberLiteral => "number",
            TokenKind::Comment => "comment",
            TokenKind::EmphasisMarkup => "markup",
            TokenKind::MathInline => "math",
            TokenKind::Heading => "heading",
            TokenKind::PlainText => "text",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified slice of one source line.
///
/// `line` and `column` are 0-based; `column` counts characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    pub fn is_plain(&self) -> bool {
        self.kind == TokenKind::PlainText
    }

    /// Plain text made only of whitespace (or nothing at all)
    pub fn is_blank(&self) -> bool {
        self.is_plain() && self.text.trim().is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} @{}:{}", self.kind, self.text, self.line, self.column)
    }
}

/// Reassemble a line from its tokens
pub fn line_text(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_json_shape() {
        let token = Token::new(TokenKind::MathInline, "$x$", 2, 5);
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["kind"], "math_inline");
        assert_eq!(json["text"], "$x$");
        assert_eq!(json["column"], 5);
    }

    #[test]
    fn test_blank_tokens() {
        assert!(Token::new(TokenKind::PlainText, "  \t", 0, 0).is_blank());
        assert!(!Token::new(TokenKind::PlainText, " a", 0, 0).is_blank());
        assert!(!Token::new(TokenKind::Comment, "//", 0, 0).is_blank());
    }

    #[test]
    fn test_line_text_reassembles() {
        let tokens = vec![
            Token::new(TokenKind::PlainText, "a ", 0, 0),
            Token::new(TokenKind::EmphasisMarkup, "*b*", 0, 2),
        ];
        assert_eq!(line_text(&tokens), "a *b*");
    }
}
