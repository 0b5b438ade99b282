//! Line lexer for folio markup
//!
//! Lexing is line-local: every line is scanned on its own and no token depends
//! on a neighbouring line. Each scan position tries the rules in a fixed order:
//!
//! 1. `//` comment to end of line
//! 2. heading line (`=` at column 0)
//! 3. inline math `$...$`
//! 4. reserved `#keyword`
//! 5. generic `#name`
//! 6. built-in function name followed by `(`
//! 7. quoted string
//! 8. number with optional unit
//! 9. `*bold*` / `_italic_`
//! 10. one character of plain text
//!
//! Rules 3-9 never compete for the same leading character except 4 and 5, so
//! the candidate at a position is found with a logos DFA and the keyword rule
//! is resolved from the `#name` match afterwards. Every iteration consumes at
//! least one character and the concatenated token texts always reproduce the
//! line.

use crate::token::{Token, TokenKind};
use logos::Logos;

/// `#` directives recognised as keywords (whole words only)
pub const KEYWORDS: &[&str] = &[
    "set", "let", "show", "import", "include", "if", "else", "for", "while", "break", "continue",
    "return", "none", "auto", "true", "false",
];

/// Bare function names recognised when directly followed by `(`
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "page", "text", "par", "figure", "table", "image", "box", "block", "grid", "stack", "align",
    "h", "v", "rect", "circle", "line", "path", "polygon", "place", "move", "scale", "rotate",
    "link", "ref", "cite", "footnote", "heading", "outline", "list", "enum", "terms", "raw",
    "code", "emph", "strong", "underline", "strike", "overline", "highlight", "smallcaps", "sub",
    "super", "lorem",
];

/// Candidate lexemes for rules 3 through 9
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    #[regex(r"\$[^$]*\$")]
    Math,

    // Keyword or function reference, decided in `classify_hashed`
    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_-]*")]
    Hashed,

    #[regex(r"(page|text|par|figure|table|image|box|block|grid|stack|align|h|v|rect|circle|line|path|polygon|place|move|scale|rotate|link|ref|cite|footnote|heading|outline|list|enum|terms|raw|code|emph|strong|underline|strike|overline|highlight|smallcaps|sub|super|lorem)\s*\(")]
    Builtin,

    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    Str,

    #[regex(r"-?[0-9]+(\.[0-9]+)?(em|pt|cm|mm|in|%)?")]
    Number,

    #[regex(r"\*[^*]+\*")]
    #[regex(r"_[^_]+_")]
    Emphasis,
}

/// Lexeme found at a scan position: the kind and its byte length
struct Lexeme {
    kind: TokenKind,
    len: usize,
}

/// Accumulates tokens for one line, coalescing adjacent plain text
struct LineTokens {
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl LineTokens {
    fn new(line: usize) -> Self {
        Self {
            line,
            column: 0,
            tokens: Vec::new(),
        }
    }

    fn push(&mut self, kind: TokenKind, text: &str) {
        let width = text.chars().count();
        if kind == TokenKind::PlainText {
            if let Some(last) = self.tokens.last_mut().filter(|t| t.is_plain()) {
                last.text.push_str(text);
                self.column += width;
                return;
            }
        }
        self.tokens.push(Token::new(kind, text, self.line, self.column));
        self.column += width;
    }

    fn finish(self) -> Vec<Token> {
        self.tokens
    }
}

/// Tokenize a single line (tokens are stamped with line 0)
pub fn tokenize_line(line: &str) -> Vec<Token> {
    tokenize_line_at(line, 0)
}

/// Tokenize a single line, stamping tokens with `line_index`
pub fn tokenize_line_at(line: &str, line_index: usize) -> Vec<Token> {
    let mut out = LineTokens::new(line_index);
    let mut pos = 0;

    while pos < line.len() {
        let rest = &line[pos..];

        if rest.starts_with("//") {
            out.push(TokenKind::Comment, rest);
            break;
        }

        if pos == 0 && rest.starts_with('=') {
            out.push(TokenKind::Heading, rest);
            break;
        }

        match scan(rest) {
            Some(lexeme) if lexeme.kind == TokenKind::FunctionCall && rest[..lexeme.len].ends_with('(') => {
                // Built-in call: the name (plus any spacing) and the paren are separate tokens
                let paren = lexeme.len - 1;
                out.push(TokenKind::FunctionCall, &rest[..paren]);
                out.push(TokenKind::PlainText, "(");
                pos += lexeme.len;
            }
            Some(lexeme) => {
                out.push(lexeme.kind, &rest[..lexeme.len]);
                pos += lexeme.len;
            }
            None => {
                let width = rest.chars().next().map_or(1, char::len_utf8);
                out.push(TokenKind::PlainText, &rest[..width]);
                pos += width;
            }
        }
    }

    out.finish()
}

/// Tokenize a whole source text, one token vector per `\n`-separated line
pub fn tokenize(source: &str) -> Vec<Vec<Token>> {
    source
        .split('\n')
        .enumerate()
        .map(|(index, line)| tokenize_line_at(line, index))
        .collect()
}

/// Find the rule 3-9 lexeme starting at the beginning of `rest`
fn scan(rest: &str) -> Option<Lexeme> {
    let mut lexer = Candidate::lexer(rest);
    let candidate = match lexer.next()? {
        Ok(candidate) => candidate,
        Err(()) => return None,
    };
    let len = lexer.span().end;

    let lexeme = match candidate {
        Candidate::Math => Lexeme {
            kind: TokenKind::MathInline,
            len,
        },
        Candidate::Hashed => classify_hashed(rest, len),
        Candidate::Builtin => Lexeme {
            kind: TokenKind::FunctionCall,
            len,
        },
        Candidate::Str => Lexeme {
            kind: TokenKind::StringLiteral,
            len,
        },
        Candidate::Number => Lexeme {
            kind: TokenKind::NumberLiteral,
            len,
        },
        Candidate::Emphasis => Lexeme {
            kind: TokenKind::EmphasisMarkup,
            len,
        },
    };
    Some(lexeme)
}

/// Split a `#name` match into keyword or function reference.
///
/// A keyword wins when it is followed by a non-word character, even if the
/// generic name match runs further (`#set-x` lexes as `#set` + `-x`).
fn classify_hashed(rest: &str, matched: usize) -> Lexeme {
    let name = &rest[1..];
    for keyword in KEYWORDS {
        if !name.starts_with(keyword) {
            continue;
        }
        let end = 1 + keyword.len();
        let at_boundary = rest[end..]
            .chars()
            .next()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_'));
        if at_boundary {
            return Lexeme {
                kind: TokenKind::Keyword,
                len: end,
            };
        }
    }
    Lexeme {
        kind: TokenKind::FunctionCall,
        len: matched,
    }
}

/// Whether `name` is one of the bare built-in function names
pub fn is_builtin_function(name: &str) -> bool {
    BUILTIN_FUNCTIONS.contains(&name)
}
