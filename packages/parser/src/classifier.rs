//! Block classifier
//!
//! Folds lexed lines into block-level units. The fold carries the current
//! `DocumentStyle` as its accumulator: a `#set text(...)` directive changes
//! the style for blocks opened after it, and every block keeps the snapshot
//! it was opened with, so style changes are never retroactive.
//!
//! Line shapes, decided by the line's lead token (the first token after any
//! leading whitespace):
//!
//! - heading token: closes the open block and forms a one-line heading block
//! - nothing / whitespace only: closes the open paragraph
//! - directive keyword: closes the open block and forms a directive block,
//!   extended over following lines while its argument list is still open
//! - lone display math `$ ... $`: closes the open block and forms a math block
//! - anything else: extends the open paragraph, opening one if needed

use crate::ast::{split_heading, Block, BlockKind, Classification, DocumentStyle};
use crate::directive::{apply_set_rule, open_groups, parse_set_rule};
use crate::token::{Token, TokenKind};
use tracing::{debug, instrument};

/// Keywords whose lines are directives rather than content
pub const DIRECTIVE_KEYWORDS: &[&str] = &["#set", "#let", "#show", "#import", "#include"];

/// Classify lexed lines starting from the default style
pub fn classify(lines: &[Vec<Token>]) -> Classification {
    classify_with_style(lines, DocumentStyle::default())
}

/// Classify lexed lines starting from `initial`
#[instrument(skip_all, fields(lines = lines.len()))]
pub fn classify_with_style(lines: &[Vec<Token>], initial: DocumentStyle) -> Classification {
    let mut classifier = Classifier::new(initial);
    let mut index = 0;
    while index < lines.len() {
        index = classifier.step(lines, index);
    }
    let classification = classifier.finish();
    debug!(blocks = classification.blocks.len(), "Classification complete");
    classification
}

/// Shape of a single line as seen by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineShape {
    Blank,
    Heading { level: usize },
    /// Directive led by the token at this index
    Directive { lead: usize },
    MathBlock,
    Content,
}

impl LineShape {
    fn of(tokens: &[Token]) -> Self {
        let Some(lead) = tokens.iter().position(|t| !t.is_blank()) else {
            return LineShape::Blank;
        };
        let token = &tokens[lead];

        match token.kind {
            TokenKind::Heading => LineShape::Heading {
                level: split_heading(&token.text).0,
            },
            TokenKind::Keyword if DIRECTIVE_KEYWORDS.contains(&token.text.as_str()) => {
                LineShape::Directive { lead }
            }
            TokenKind::MathInline if is_display_math(tokens, lead) => LineShape::MathBlock,
            _ => LineShape::Content,
        }
    }
}

/// `$ ... $` alone on its line, with whitespace just inside both delimiters
fn is_display_math(tokens: &[Token], lead: usize) -> bool {
    if tokens[lead + 1..].iter().any(|t| !t.is_blank()) {
        return false;
    }
    let text = &tokens[lead].text;
    let inner = &text[1..text.len() - 1];
    inner.starts_with(char::is_whitespace) && inner.ends_with(char::is_whitespace)
}

struct Classifier {
    blocks: Vec<Block>,
    paragraph: Option<Block>,
    style: DocumentStyle,
}

impl Classifier {
    fn new(style: DocumentStyle) -> Self {
        Self {
            blocks: Vec::new(),
            paragraph: None,
            style,
        }
    }

    /// Consume the line at `index` (and any continuation lines), returning the next index
    fn step(&mut self, lines: &[Vec<Token>], index: usize) -> usize {
        let tokens = &lines[index];

        match LineShape::of(tokens) {
            LineShape::Blank => {
                self.close_paragraph();
                index + 1
            }
            LineShape::Heading { level } => {
                self.close_paragraph();
                self.push_block(BlockKind::Heading { level }, index, tokens);
                index + 1
            }
            LineShape::MathBlock => {
                self.close_paragraph();
                self.push_block(BlockKind::MathBlock, index, tokens);
                index + 1
            }
            LineShape::Directive { lead } => {
                self.close_paragraph();
                self.directive(lines, index, lead)
            }
            LineShape::Content => {
                match self.paragraph.as_mut() {
                    Some(paragraph) => paragraph.push_line(tokens.clone()),
                    None => {
                        self.paragraph = Some(Block::new(
                            BlockKind::Paragraph,
                            index,
                            tokens.clone(),
                            self.style.clone(),
                        ))
                    }
                }
                index + 1
            }
        }
    }

    fn directive(&mut self, lines: &[Vec<Token>], index: usize, lead: usize) -> usize {
        let tokens = &lines[index];
        let keyword = tokens[lead].text.as_str();
        let arguments = directive_text(&tokens[lead + 1..]);
        let end = directive_end(lines, index, lead);

        let mut block = Block::new(BlockKind::Directive, index, tokens.clone(), self.style.clone());
        let mut source = arguments;
        for line in &lines[index + 1..=end] {
            block.push_line(line.clone());
            source.push('\n');
            source.push_str(&directive_text(line));
        }

        if keyword == "#set" {
            match parse_set_rule(&source) {
                Ok(rule) => {
                    apply_set_rule(&rule, &mut self.style);
                }
                Err(e) => {
                    debug!(line = index, pos = ?e.pos(), error = %e, "Ignoring malformed set rule");
                }
            }
        }

        self.blocks.push(block);
        end + 1
    }

    fn push_block(&mut self, kind: BlockKind, index: usize, tokens: &[Token]) {
        self.blocks
            .push(Block::new(kind, index, tokens.to_vec(), self.style.clone()));
    }

    fn close_paragraph(&mut self) {
        if let Some(paragraph) = self.paragraph.take() {
            self.blocks.push(paragraph);
        }
    }

    fn finish(mut self) -> Classification {
        self.close_paragraph();
        Classification {
            blocks: self.blocks,
            style: self.style,
        }
    }
}

/// Directive source of `tokens` with comments dropped
fn directive_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Comment)
        .map(|t| t.text.as_str())
        .collect()
}

/// Groups left open by `tokens`; brackets inside comments and strings don't count
fn line_groups(tokens: &[Token]) -> isize {
    let text: String = tokens
        .iter()
        .filter(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::StringLiteral))
        .map(|t| t.text.as_str())
        .collect();
    open_groups(&text)
}

/// Last line of a directive starting at `index`.
///
/// A directive whose argument list is left open continues until the group
/// closes; if it never closes, the directive is just its first line.
fn directive_end(lines: &[Vec<Token>], index: usize, lead: usize) -> usize {
    let mut depth = line_groups(&lines[index][lead + 1..]);
    if depth <= 0 {
        return index;
    }
    for (offset, line) in lines[index + 1..].iter().enumerate() {
        depth += line_groups(line);
        if depth <= 0 {
            return index + 1 + offset;
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn blocks(source: &str) -> Classification {
        classify(&tokenize(source))
    }

    fn kinds(classification: &Classification) -> Vec<BlockKind> {
        classification.blocks.iter().map(|b| b.kind).collect()
    }

    #[test]
    fn test_single_heading() {
        let result = blocks("= Introduction");
        assert_eq!(kinds(&result), vec![BlockKind::Heading { level: 1 }]);
        assert_eq!(result.blocks[0].lines, 0..1);
    }

    #[test]
    fn test_heading_level_counts_equals() {
        let result = blocks("=== Deep");
        assert_eq!(result.blocks[0].heading_level(), Some(3));
    }

    #[test]
    fn test_blank_line_splits_paragraphs() {
        let result = blocks("one\ntwo\n\nthree");
        assert_eq!(kinds(&result), vec![BlockKind::Paragraph, BlockKind::Paragraph]);
        assert_eq!(result.blocks[0].lines, 0..2);
        assert_eq!(result.blocks[1].lines, 3..4);
    }

    #[test]
    fn test_whitespace_line_is_blank() {
        let result = blocks("one\n   \ntwo");
        assert_eq!(result.blocks.len(), 2);
    }

    #[test]
    fn test_heading_closes_paragraph() {
        let result = blocks("intro text\n= Next\nbody");
        assert_eq!(
            kinds(&result),
            vec![
                BlockKind::Paragraph,
                BlockKind::Heading { level: 1 },
                BlockKind::Paragraph
            ]
        );
    }

    #[test]
    fn test_set_text_applies_forward_only() {
        let result = blocks("Before\n#set text(size: 14pt)\nHello");
        assert_eq!(
            kinds(&result),
            vec![BlockKind::Paragraph, BlockKind::Directive, BlockKind::Paragraph]
        );
        assert_eq!(result.blocks[0].style.font_size_pt, 12.0);
        assert_eq!(result.blocks[2].style.font_size_pt, 14.0);
        assert_eq!(result.style.font_size_pt, 14.0);
    }

    #[test]
    fn test_directive_closes_open_paragraph() {
        let result = blocks("a\n#let x = 1\nb");
        assert_eq!(
            kinds(&result),
            vec![BlockKind::Paragraph, BlockKind::Directive, BlockKind::Paragraph]
        );
    }

    #[test]
    fn test_non_directive_keywords_are_content() {
        let result = blocks("#if true [x]");
        assert_eq!(kinds(&result), vec![BlockKind::Paragraph]);
    }

    #[test]
    fn test_indented_directive() {
        let result = blocks("  #set text(size: 8pt)\nsmall");
        assert_eq!(result.blocks[0].kind, BlockKind::Directive);
        assert_eq!(result.blocks[1].style.font_size_pt, 8.0);
    }

    #[test]
    fn test_multiline_directive_spans_lines() {
        let source = "#set text(\n  font: \"New Computer Modern\",\n  size: 11pt,\n)\nBody";
        let result = blocks(source);
        assert_eq!(kinds(&result), vec![BlockKind::Directive, BlockKind::Paragraph]);
        assert_eq!(result.blocks[0].lines, 0..4);
        assert_eq!(result.blocks[1].style.font_family, "New Computer Modern");
        assert_eq!(result.blocks[1].style.font_size_pt, 11.0);
    }

    #[test]
    fn test_unclosed_directive_only_takes_its_line() {
        let result = blocks("#set text(size: 20pt\nstill visible");
        assert_eq!(kinds(&result), vec![BlockKind::Directive, BlockKind::Paragraph]);
        assert_eq!(result.blocks[1].style.font_size_pt, 12.0);
    }

    #[test]
    fn test_paren_in_trailing_comment_does_not_extend_directive() {
        let result = blocks("#set text(size: 14pt) // (\nHello\n)\nAfter");
        assert_eq!(kinds(&result), vec![BlockKind::Directive, BlockKind::Paragraph]);
        assert_eq!(result.blocks[0].lines, 0..1);
        assert_eq!(result.blocks[1].lines, 1..4);
        assert_eq!(result.blocks[1].style.font_size_pt, 14.0);
    }

    #[test]
    fn test_paren_in_string_does_not_extend_directive() {
        let result = blocks("#set text(font: 'Fira (')\nHello");
        assert_eq!(kinds(&result), vec![BlockKind::Directive, BlockKind::Paragraph]);
        assert_eq!(result.blocks[1].lines, 1..2);
        assert_eq!(result.blocks[1].style.font_family, "Fira (");
    }

    #[test]
    fn test_comment_inside_multiline_directive() {
        let source = "#set text(\n  size: 9pt, // was (10pt\n)\nBody";
        let result = blocks(source);
        assert_eq!(kinds(&result), vec![BlockKind::Directive, BlockKind::Paragraph]);
        assert_eq!(result.blocks[0].lines, 0..3);
        assert_eq!(result.blocks[1].style.font_size_pt, 9.0);
    }

    #[test]
    fn test_malformed_set_is_silently_ignored() {
        let result = blocks("#set text(size: , font)\nx");
        assert_eq!(result.style, DocumentStyle::default());
        assert_eq!(result.blocks[1].style, DocumentStyle::default());
    }

    #[test]
    fn test_display_math_block() {
        let result = blocks("text\n$ E = m c^2 $\nmore");
        assert_eq!(
            kinds(&result),
            vec![BlockKind::Paragraph, BlockKind::MathBlock, BlockKind::Paragraph]
        );
    }

    #[test]
    fn test_tight_math_line_is_paragraph() {
        let result = blocks("$x$");
        assert_eq!(kinds(&result), vec![BlockKind::Paragraph]);
    }

    #[test]
    fn test_initial_style_is_respected() {
        let style = DocumentStyle {
            font_family: "Inter".to_string(),
            font_size_pt: 10.0,
        };
        let result = classify_with_style(&tokenize("hi"), style.clone());
        assert_eq!(result.blocks[0].style, style);
    }

    #[test]
    fn test_empty_input_has_no_blocks() {
        assert!(blocks("").blocks.is_empty());
    }
}
