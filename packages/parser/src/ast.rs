//! Block-level document structure produced by the classifier

use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::ops::Range;

pub const DEFAULT_FONT_FAMILY: &str = "serif";
pub const DEFAULT_FONT_SIZE_PT: f64 = 12.0;

/// Text style in effect at a point of the document.
///
/// Only `#set text(...)` directives change it, and only for blocks that follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentStyle {
    pub font_family: String,
    pub font_size_pt: f64,
}

impl Default for DocumentStyle {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size_pt: DEFAULT_FONT_SIZE_PT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockKind {
    Heading { level: usize },
    Paragraph,
    Directive,
    MathBlock,
}

/// A contiguous run of source lines forming one semantic unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    /// Source line range (0-based, end exclusive)
    pub lines: Range<usize>,
    /// Tokens grouped by source line
    pub tokens: Vec<Vec<Token>>,
    /// Style snapshot taken when the block was opened
    pub style: DocumentStyle,
}

impl Block {
    pub fn new(kind: BlockKind, line: usize, tokens: Vec<Token>, style: DocumentStyle) -> Self {
        Self {
            kind,
            lines: line..line + 1,
            tokens: vec![tokens],
            style,
        }
    }

    pub fn push_line(&mut self, tokens: Vec<Token>) {
        self.lines.end += 1;
        self.tokens.push(tokens);
    }

    pub fn first_line(&self) -> usize {
        self.lines.start
    }

    pub fn heading_level(&self) -> Option<usize> {
        match self.kind {
            BlockKind::Heading { level } => Some(level),
            _ => None,
        }
    }

    /// All tokens of the block in source order
    pub fn iter_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().flatten()
    }
}

/// Output of the block classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub blocks: Vec<Block>,
    /// Style after the last directive of the document
    pub style: DocumentStyle,
}

/// Split a heading line into its level and text (`"== Intro"` -> `(2, "Intro")`)
pub fn split_heading(text: &str) -> (usize, &str) {
    let level = text.chars().take_while(|c| *c == '=').count();
    (level, text[level..].trim())
}
