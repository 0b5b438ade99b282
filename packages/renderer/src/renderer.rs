//! Document renderer: classified blocks to a display tree
//!
//! Rendering is a pure function of the blocks and the final style. Headings
//! are sized from a fixed table; paragraphs take the style snapshot of their
//! block. Directive blocks produce nothing.

use crate::display::{DisplayNode, DisplayTree, InlineNode};
use folio_parser::ast::split_heading;
use folio_parser::{Block, BlockKind, DocumentStyle, Token, TokenKind};
use thiserror::Error;
use tracing::{debug, instrument};

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Invalid font size {size}pt for block at line {}", line + 1)]
    InvalidFontSize { size: f64, line: usize },

    #[error("Empty font family for block at line {}", line + 1)]
    EmptyFontFamily { line: usize },
}

impl RenderError {
    /// Source line (0-based) of the block that failed
    pub fn line(&self) -> usize {
        match self {
            RenderError::InvalidFontSize { line, .. } => *line,
            RenderError::EmptyFontFamily { line } => *line,
        }
    }
}

pub const MAX_HEADING_LEVEL: usize = 6;

const HEADING_SIZES_PT: [f64; MAX_HEADING_LEVEL] = [26.0, 20.0, 16.0, 14.0, 12.0, 11.0];

/// Point size of a heading; levels past the deepest supported one are clamped
pub fn heading_size_pt(level: usize) -> f64 {
    HEADING_SIZES_PT[level.clamp(1, MAX_HEADING_LEVEL) - 1]
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, blocks, style), fields(blocks = blocks.len()))]
    pub fn render(&self, blocks: &[Block], style: &DocumentStyle) -> RenderResult<DisplayTree> {
        let mut tree = DisplayTree::new(style.clone());

        for block in blocks {
            if let Some(node) = self.render_block(block)? {
                tree.add_node(node);
            }
        }

        debug!(nodes = tree.nodes.len(), "Render complete");
        Ok(tree)
    }

    fn render_block(&self, block: &Block) -> RenderResult<Option<DisplayNode>> {
        let line = block.first_line();
        let node = match block.kind {
            BlockKind::Directive => return Ok(None),
            BlockKind::Heading { level } => {
                let level = level.clamp(1, MAX_HEADING_LEVEL);
                let text = block
                    .iter_tokens()
                    .next()
                    .map(|token| split_heading(&token.text).1.to_string())
                    .unwrap_or_default();
                DisplayNode::Heading {
                    level,
                    size_pt: heading_size_pt(level),
                    text,
                    line,
                }
            }
            BlockKind::MathBlock => {
                let content = block
                    .iter_tokens()
                    .find(|token| token.kind == TokenKind::MathInline)
                    .map(|token| delimited(&token.text).trim().to_string())
                    .unwrap_or_default();
                DisplayNode::MathBlock { content, line }
            }
            BlockKind::Paragraph => {
                validate_style(&block.style, line)?;
                DisplayNode::Paragraph {
                    font_family: block.style.font_family.clone(),
                    font_size_pt: block.style.font_size_pt,
                    children: inline_children(&block.tokens),
                    lines: block.lines.clone(),
                }
            }
        };
        Ok(Some(node))
    }
}

/// Render `blocks` with a default renderer
pub fn render(blocks: &[Block], style: &DocumentStyle) -> RenderResult<DisplayTree> {
    Renderer::new().render(blocks, style)
}

fn validate_style(style: &DocumentStyle, line: usize) -> RenderResult<()> {
    if !style.font_size_pt.is_finite() || style.font_size_pt <= 0.0 {
        return Err(RenderError::InvalidFontSize {
            size: style.font_size_pt,
            line,
        });
    }
    if style.font_family.trim().is_empty() {
        return Err(RenderError::EmptyFontFamily { line });
    }
    Ok(())
}

/// Text between the one-character delimiters of `*x*`, `_x_` or `$x$`
fn delimited(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Replay a paragraph's tokens into inline nodes
fn inline_children(lines: &[Vec<Token>]) -> Vec<InlineNode> {
    let mut inline = InlineBuilder::default();
    for tokens in lines {
        for token in tokens {
            match token.kind {
                TokenKind::EmphasisMarkup if token.text.starts_with('*') => {
                    inline.push(InlineNode::strong(delimited(&token.text)))
                }
                TokenKind::EmphasisMarkup => inline.push(InlineNode::emphasis(delimited(&token.text))),
                TokenKind::MathInline => inline.push(InlineNode::math(delimited(&token.text).trim())),
                TokenKind::PlainText
                | TokenKind::StringLiteral
                | TokenKind::NumberLiteral
                | TokenKind::Comment
                | TokenKind::Keyword
                | TokenKind::FunctionCall
                | TokenKind::Heading => inline.push_text(&token.text),
            }
        }
        inline.end_line();
    }
    inline.finish()
}

/// Collects inline nodes, merging adjacent text and joining lines with one space
struct InlineBuilder {
    nodes: Vec<InlineNode>,
    at_line_start: bool,
    pending_space: bool,
}

impl Default for InlineBuilder {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            at_line_start: true,
            pending_space: false,
        }
    }
}

impl InlineBuilder {
    fn push_text(&mut self, text: &str) {
        let text = if self.at_line_start {
            text.trim_start()
        } else {
            text
        };
        if text.is_empty() {
            return;
        }
        self.begin_content();
        self.append_text(text);
    }

    fn push(&mut self, node: InlineNode) {
        self.begin_content();
        self.nodes.push(node);
    }

    fn begin_content(&mut self) {
        if self.pending_space {
            self.append_text(" ");
        }
        self.pending_space = false;
        self.at_line_start = false;
    }

    fn append_text(&mut self, text: &str) {
        if let Some(InlineNode::Text { content }) = self.nodes.last_mut() {
            content.push_str(text);
        } else {
            self.nodes.push(InlineNode::text(text));
        }
    }

    fn end_line(&mut self) {
        if let Some(InlineNode::Text { content }) = self.nodes.last_mut() {
            let trimmed = content.trim_end().len();
            content.truncate(trimmed);
            if content.is_empty() {
                self.nodes.pop();
            }
        }
        if !self.at_line_start {
            self.pending_space = true;
        }
        self.at_line_start = true;
    }

    fn finish(self) -> Vec<InlineNode> {
        self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_parser::{classify, tokenize};

    fn render_source(source: &str) -> RenderResult<DisplayTree> {
        let classification = classify(&tokenize(source));
        render(&classification.blocks, &classification.style)
    }

    fn paragraph_children(tree: &DisplayTree, index: usize) -> Vec<InlineNode> {
        match &tree.nodes[index] {
            DisplayNode::Paragraph { children, .. } => children.clone(),
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_heading_node() {
        let tree = render_source("= Introduction").unwrap();
        assert_eq!(
            tree.nodes,
            vec![DisplayNode::Heading {
                level: 1,
                size_pt: 26.0,
                text: "Introduction".to_string(),
                line: 0,
            }]
        );
        assert_eq!(tree.page_count, 1);
    }

    #[test]
    fn test_heading_level_is_clamped() {
        let tree = render_source("======== Very deep").unwrap();
        match &tree.nodes[0] {
            DisplayNode::Heading { level, size_pt, .. } => {
                assert_eq!(*level, 6);
                assert_eq!(*size_pt, 11.0);
            }
            other => panic!("expected heading, got {:?}", other),
        }
    }

    #[test]
    fn test_heading_size_ignores_document_style() {
        let tree = render_source("#set text(size: 30pt)\n== Title").unwrap();
        match &tree.nodes[0] {
            DisplayNode::Heading { size_pt, .. } => assert_eq!(*size_pt, 20.0),
            other => panic!("expected heading, got {:?}", other),
        }
    }

    #[test]
    fn test_emphasis_replay() {
        let tree = render_source("Some *bold* and _italic_ text.").unwrap();
        assert_eq!(
            paragraph_children(&tree, 0),
            vec![
                InlineNode::text("Some "),
                InlineNode::strong("bold"),
                InlineNode::text(" and "),
                InlineNode::emphasis("italic"),
                InlineNode::text(" text."),
            ]
        );
    }

    #[test]
    fn test_code_tokens_render_as_text() {
        let tree = render_source(r#"see #link("a") at 12pt // note"#).unwrap();
        assert_eq!(
            paragraph_children(&tree, 0),
            vec![InlineNode::text(r#"see #link("a") at 12pt // note"#)]
        );
    }

    #[test]
    fn test_inline_math() {
        let tree = render_source("Area is $pi r^2$.").unwrap();
        assert_eq!(
            paragraph_children(&tree, 0),
            vec![
                InlineNode::text("Area is "),
                InlineNode::math("pi r^2"),
                InlineNode::text("."),
            ]
        );
    }

    #[test]
    fn test_paragraph_lines_join_with_single_space() {
        let tree = render_source("first line  \n   second *line*").unwrap();
        assert_eq!(
            paragraph_children(&tree, 0),
            vec![
                InlineNode::text("first line second "),
                InlineNode::strong("line"),
            ]
        );
    }

    #[test]
    fn test_paragraph_uses_block_style() {
        let tree = render_source("Before\n\n#set text(size: 14pt)\nHello").unwrap();
        let sizes: Vec<f64> = tree
            .nodes
            .iter()
            .filter_map(|node| match node {
                DisplayNode::Paragraph { font_size_pt, .. } => Some(*font_size_pt),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![12.0, 14.0]);
        assert_eq!(tree.style.font_size_pt, 14.0);
    }

    #[test]
    fn test_math_block() {
        let tree = render_source("$ E = m c^2 $").unwrap();
        assert_eq!(
            tree.nodes,
            vec![DisplayNode::MathBlock {
                content: "E = m c^2".to_string(),
                line: 0,
            }]
        );
    }

    #[test]
    fn test_negative_font_size_is_a_render_error() {
        let err = render_source("#set text(size: -4pt)\nTiny").unwrap_err();
        assert_eq!(err, RenderError::InvalidFontSize { size: -4.0, line: 1 });
        assert_eq!(err.line(), 1);
    }

    #[test]
    fn test_blank_font_family_is_a_render_error() {
        let err = render_source("#set text(font: \"  \")\nText").unwrap_err();
        assert_eq!(err, RenderError::EmptyFontFamily { line: 1 });
    }

    #[test]
    fn test_heading_sizes() {
        let sizes: Vec<f64> = (1..=7).map(heading_size_pt).collect();
        assert_eq!(sizes, vec![26.0, 20.0, 16.0, 14.0, 12.0, 11.0, 11.0]);
    }
}
