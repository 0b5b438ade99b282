//! Argument parsing for `#set` directives
//!
//! A directive's argument list is re-lexed with a small logos lexer and parsed
//! into named/positional arguments. Only `#set text(size: .., font: ..)` has an
//! effect on the document style; everything else parses (or fails to parse)
//! without consequence.

use crate::ast::DocumentStyle;
use crate::error::{DirectiveError, DirectiveResult};
use logos::Logos;
use std::ops::Range;
use tracing::debug;

/// Tokens of a directive argument list
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum ArgToken<'src> {
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*", |lex| lex.slice())]
    Ident(&'src str),

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    String(&'src str),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice())]
    Number(&'src str),

    #[regex(r"-?[0-9]+(\.[0-9]+)?(em|pt|cm|mm|in|%)", |lex| lex.slice())]
    Length(&'src str),

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,
}

/// Any character outside the argument grammar (operators, `#`, `.`) lexes as opaque
#[derive(Debug, Clone, PartialEq)]
enum Lexed<'src> {
    Token(ArgToken<'src>),
    Opaque,
}

fn lex(source: &str) -> Vec<(Lexed<'_>, Range<usize>)> {
    ArgToken::lexer(source)
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => (Lexed::Token(token), span),
            Err(()) => (Lexed::Opaque, span),
        })
        .collect()
}

/// Net number of `(`/`[` groups left open by `source` (strings are skipped)
pub fn open_groups(source: &str) -> isize {
    lex(source).iter().fold(0, |depth, (token, _)| match token {
        Lexed::Token(ArgToken::LParen | ArgToken::LBracket) => depth + 1,
        Lexed::Token(ArgToken::RParen | ArgToken::RBracket) => depth - 1,
        _ => depth,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Pt,
    Mm,
    Cm,
    In,
    Em,
    Percent,
}

impl LengthUnit {
    fn parse(suffix: &str) -> Option<Self> {
        match suffix {
            "pt" => Some(LengthUnit::Pt),
            "mm" => Some(LengthUnit::Mm),
            "cm" => Some(LengthUnit::Cm),
            "in" => Some(LengthUnit::In),
            "em" => Some(LengthUnit::Em),
            "%" => Some(LengthUnit::Percent),
            _ => None,
        }
    }
}

/// A length literal, resolved against the current font size when relative
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub fn parse(literal: &str) -> Option<Self> {
        let split = literal
            .find(|c: char| c.is_ascii_alphabetic() || c == '%')
            .unwrap_or(literal.len());
        let (number, suffix) = literal.split_at(split);
        Some(Self {
            value: number.parse().ok()?,
            unit: LengthUnit::parse(suffix)?,
        })
    }

    pub fn to_points(&self, current_pt: f64) -> f64 {
        match self.unit {
            LengthUnit::Pt => self.value,
            LengthUnit::Mm => self.value * 2.83465,
            LengthUnit::Cm => self.value * 28.3465,
            LengthUnit::In => self.value * 72.0,
            LengthUnit::Em => self.value * current_pt,
            LengthUnit::Percent => self.value / 100.0 * current_pt,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Length(Length),
    Number(f64),
    Str(String),
    Ident(String),
    Group(Vec<Argument>),
    Content,
    Opaque,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Option<String>,
    /// Atoms of the value expression; only single-atom values are interpreted
    pub value: Vec<ArgValue>,
}

impl Argument {
    fn single(&self) -> Option<&ArgValue> {
        match self.value.as_slice() {
            [value] => Some(value),
            _ => None,
        }
    }
}

/// A parsed `#set target(args)` directive
#[derive(Debug, Clone, PartialEq)]
pub struct SetRule {
    pub target: String,
    pub args: Vec<Argument>,
}

impl SetRule {
    pub fn named(&self, name: &str) -> Option<&Argument> {
        self.args
            .iter()
            .rev()
            .find(|arg| arg.name.as_deref() == Some(name))
    }
}

/// Parse the text following a `#set` keyword (`" text(size: 14pt)"`)
pub fn parse_set_rule(source: &str) -> DirectiveResult<SetRule> {
    ArgParser::new(source).parse_set_rule()
}

/// Apply a set rule to `style`, returning whether anything changed.
///
/// Arguments with unknown names or values of the wrong shape are skipped.
pub fn apply_set_rule(rule: &SetRule, style: &mut DocumentStyle) -> bool {
    if rule.target != "text" {
        return false;
    }
    let mut changed = false;

    if let Some(ArgValue::Length(length)) = rule.named("size").and_then(Argument::single) {
        style.font_size_pt = length.to_points(style.font_size_pt);
        changed = true;
    }

    match rule.named("font").and_then(Argument::single) {
        Some(ArgValue::Str(family)) => {
            style.font_family = family.clone();
            changed = true;
        }
        Some(ArgValue::Group(fallbacks)) => {
            if let Some(ArgValue::Str(family)) = fallbacks.first().and_then(Argument::single) {
                style.font_family = family.clone();
                changed = true;
            }
        }
        _ => {}
    }

    debug!(
        set_target = %rule.target,
        changed,
        font_family = %style.font_family,
        font_size_pt = style.font_size_pt,
        "Applied set rule"
    );
    changed
}

/// Recursive-descent parser over directive argument tokens
struct ArgParser<'src> {
    tokens: Vec<(Lexed<'src>, Range<usize>)>,
    pos: usize,
}

impl<'src> ArgParser<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            tokens: lex(source),
            pos: 0,
        }
    }

    fn parse_set_rule(&mut self) -> DirectiveResult<SetRule> {
        let target = match self.advance() {
            Some(Lexed::Token(ArgToken::Ident(name))) => name.to_string(),
            other => return Err(self.unexpected("set target", other)),
        };

        if !self.check(&ArgToken::LParen) {
            return Err(DirectiveError::MissingArguments { target });
        }
        self.advance();
        let args = self.parse_arguments()?;

        Ok(SetRule { target, args })
    }

    /// Arguments up to and including the closing `)`
    fn parse_arguments(&mut self) -> DirectiveResult<Vec<Argument>> {
        let mut args = Vec::new();
        loop {
            if self.check(&ArgToken::RParen) {
                self.advance();
                return Ok(args);
            }
            if self.is_at_end() {
                return Err(DirectiveError::UnclosedGroup { pos: self.end_pos() });
            }
            args.push(self.parse_argument()?);
            match self.peek() {
                Some(Lexed::Token(ArgToken::Comma)) => {
                    self.advance();
                }
                Some(Lexed::Token(ArgToken::RParen)) => {}
                None => return Err(DirectiveError::UnclosedGroup { pos: self.end_pos() }),
                _ => {
                    let found = self.describe_current();
                    return Err(DirectiveError::UnexpectedToken {
                        pos: self.current_pos(),
                        expected: "',' or ')'".to_string(),
                        found,
                    });
                }
            }
        }
    }

    fn parse_argument(&mut self) -> DirectiveResult<Argument> {
        let name = match (self.peek(), self.peek_ahead(1)) {
            (Some(Lexed::Token(ArgToken::Ident(name))), Some(Lexed::Token(ArgToken::Colon))) => {
                let name = name.to_string();
                self.pos += 2;
                Some(name)
            }
            _ => None,
        };

        let mut value = Vec::new();
        while let Some(token) = self.peek() {
            let atom = match token {
                Lexed::Token(ArgToken::Comma | ArgToken::RParen) => break,
                Lexed::Token(ArgToken::Colon | ArgToken::RBracket) => {
                    let found = self.describe_current();
                    return Err(DirectiveError::UnexpectedToken {
                        pos: self.current_pos(),
                        expected: "argument value".to_string(),
                        found,
                    });
                }
                Lexed::Token(ArgToken::LParen) => {
                    self.advance();
                    ArgValue::Group(self.parse_arguments()?)
                }
                Lexed::Token(ArgToken::LBracket) => {
                    self.skip_content()?;
                    ArgValue::Content
                }
                Lexed::Token(ArgToken::Length(literal)) => {
                    let atom = Length::parse(literal).map_or(ArgValue::Opaque, ArgValue::Length);
                    self.advance();
                    atom
                }
                Lexed::Token(ArgToken::Number(literal)) => {
                    let atom = literal.parse().map_or(ArgValue::Opaque, ArgValue::Number);
                    self.advance();
                    atom
                }
                Lexed::Token(ArgToken::String(s)) => {
                    let atom = ArgValue::Str(s.to_string());
                    self.advance();
                    atom
                }
                Lexed::Token(ArgToken::Ident(s)) => {
                    let atom = ArgValue::Ident(s.to_string());
                    self.advance();
                    atom
                }
                Lexed::Opaque => {
                    self.advance();
                    ArgValue::Opaque
                }
            };
            value.push(atom);
        }

        if value.is_empty() {
            return Err(DirectiveError::MissingValue {
                pos: self.current_pos(),
                name: name.unwrap_or_default(),
            });
        }
        Ok(Argument { name, value })
    }

    /// Skip a `[...]` content block, honouring nesting
    fn skip_content(&mut self) -> DirectiveResult<()> {
        let start = self.current_pos();
        let mut depth = 0usize;
        while let Some(token) = self.advance() {
            match token {
                Lexed::Token(ArgToken::LBracket) => depth += 1,
                Lexed::Token(ArgToken::RBracket) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(DirectiveError::UnclosedGroup { pos: start })
    }

    fn peek(&self) -> Option<&Lexed<'src>> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn peek_ahead(&self, offset: usize) -> Option<&Lexed<'src>> {
        self.tokens.get(self.pos + offset).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<Lexed<'src>> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        self.pos += 1;
        token
    }

    fn check(&self, token: &ArgToken) -> bool {
        match self.peek() {
            Some(Lexed::Token(t)) => std::mem::discriminant(t) == std::mem::discriminant(token),
            _ => false,
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn current_pos(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or_else(|| self.end_pos(), |(_, span)| span.start)
    }

    fn end_pos(&self) -> usize {
        self.tokens.last().map_or(0, |(_, span)| span.end)
    }

    fn describe_current(&self) -> String {
        describe(self.peek())
    }

    fn unexpected(&self, expected: &str, found: Option<Lexed<'src>>) -> DirectiveError {
        DirectiveError::UnexpectedToken {
            pos: self.current_pos(),
            expected: expected.to_string(),
            found: describe(found.as_ref()),
        }
    }
}

fn describe(token: Option<&Lexed<'_>>) -> String {
    match token {
        None => "end of directive".to_string(),
        Some(Lexed::Opaque) => "unrecognized character".to_string(),
        Some(Lexed::Token(token)) => format!("{:?}", token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(source: &str) -> (bool, DocumentStyle) {
        let mut style = DocumentStyle::default();
        let changed = parse_set_rule(source)
            .map(|rule| apply_set_rule(&rule, &mut style))
            .unwrap_or(false);
        (changed, style)
    }

    #[test]
    fn test_size_in_points() {
        let (changed, style) = apply(" text(size: 14pt)");
        assert!(changed);
        assert_eq!(style.font_size_pt, 14.0);
        assert_eq!(style.font_family, "serif");
    }

    #[test]
    fn test_font_and_size_together() {
        let (_, style) = apply(r#" text(font: "Fira Sans", size: 20pt)"#);
        assert_eq!(style.font_family, "Fira Sans");
        assert_eq!(style.font_size_pt, 20.0);
    }

    #[test]
    fn test_single_quoted_font() {
        let (changed, style) = apply(" text(font: 'Arial')");
        assert!(changed);
        assert_eq!(style.font_family, "Arial");
    }

    #[test]
    fn test_relative_sizes() {
        let (_, style) = apply(" text(size: 1.5em)");
        assert_eq!(style.font_size_pt, 18.0);
        let (_, style) = apply(" text(size: 50%)");
        assert_eq!(style.font_size_pt, 6.0);
    }

    #[test]
    fn test_absolute_units_convert_to_points() {
        let (_, style) = apply(" text(size: 1in)");
        assert_eq!(style.font_size_pt, 72.0);
        let (_, style) = apply(" text(size: 1cm)");
        assert!((style.font_size_pt - 28.3465).abs() < 1e-9);
    }

    #[test]
    fn test_font_fallback_list_uses_first_entry() {
        let (_, style) = apply(r#" text(font: ("Libertinus Serif", "Noto Serif"))"#);
        assert_eq!(style.font_family, "Libertinus Serif");
    }

    #[test]
    fn test_unknown_arguments_are_ignored() {
        let (changed, style) = apply(r#" text(weight: "bold", fill: gray.lighten(20%), size: 9pt)"#);
        assert!(changed);
        assert_eq!(style.font_size_pt, 9.0);
    }

    #[test]
    fn test_unitless_size_is_ignored() {
        let (changed, style) = apply(" text(size: 14)");
        assert!(!changed);
        assert_eq!(style.font_size_pt, 12.0);
    }

    #[test]
    fn test_positional_argument_is_ignored() {
        let (changed, _) = apply(" text(8pt)");
        assert!(!changed);
    }

    #[test]
    fn test_other_targets_have_no_effect() {
        let (changed, style) = apply(r#" page(paper: "a4", margin: (x: 2.5cm, y: 3cm))"#);
        assert!(!changed);
        assert_eq!(style, DocumentStyle::default());
    }

    #[test]
    fn test_multiline_argument_list() {
        let (_, style) = apply(" text(\n  font: \"New Computer Modern\",\n  size: 11pt,\n)");
        assert_eq!(style.font_family, "New Computer Modern");
        assert_eq!(style.font_size_pt, 11.0);
    }

    #[test]
    fn test_content_block_argument_is_skipped() {
        let rule = parse_set_rule(" text(size: 10pt)[*body* here]").unwrap();
        assert_eq!(rule.args.len(), 1);
    }

    #[test]
    fn test_malformed_lists_are_errors() {
        assert!(matches!(
            parse_set_rule(" text(size: 14pt"),
            Err(DirectiveError::UnclosedGroup { .. })
        ));
        assert!(matches!(
            parse_set_rule(" text(size: , font: \"x\")"),
            Err(DirectiveError::MissingValue { .. })
        ));
        assert!(matches!(
            parse_set_rule(" text(: 12pt)"),
            Err(DirectiveError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse_set_rule(" text"),
            Err(DirectiveError::MissingArguments { .. })
        ));
    }

    #[test]
    fn test_open_groups() {
        assert_eq!(open_groups(" text("), 1);
        assert_eq!(open_groups(" text(size: 1pt)"), 0);
        assert_eq!(open_groups(r#" text(font: "(")"#), 0);
        assert_eq!(open_groups(" text(font: '[')"), 0);
        assert_eq!(open_groups(")"), -1);
    }

    #[test]
    fn test_length_parse() {
        assert_eq!(
            Length::parse("-4pt"),
            Some(Length {
                value: -4.0,
                unit: LengthUnit::Pt
            })
        );
        assert_eq!(Length::parse("12"), None);
    }
}
