use folio_parser::DocumentStyle;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Inline content of a paragraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InlineNode {
    Text { content: String },

    /// `*bold*`
    Strong { content: String },

    /// `_italic_`
    Emphasis { content: String },

    /// Inline `$math$`, painted monospace/italic
    Math { content: String },
}

impl InlineNode {
    pub fn text(content: impl Into<String>) -> Self {
        InlineNode::Text {
            content: content.into(),
        }
    }

    pub fn strong(content: impl Into<String>) -> Self {
        InlineNode::Strong {
            content: content.into(),
        }
    }

    pub fn emphasis(content: impl Into<String>) -> Self {
        InlineNode::Emphasis {
            content: content.into(),
        }
    }

    pub fn math(content: impl Into<String>) -> Self {
        InlineNode::Math {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            InlineNode::Text { content }
            | InlineNode::Strong { content }
            | InlineNode::Emphasis { content }
            | InlineNode::Math { content } => content,
        }
    }
}

/// Block-level display node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DisplayNode {
    Heading {
        level: usize,
        size_pt: f64,
        text: String,
        /// Source line of the heading
        line: usize,
    },

    Paragraph {
        font_family: String,
        font_size_pt: f64,
        children: Vec<InlineNode>,
        /// Source line range of the paragraph
        lines: Range<usize>,
    },

    /// Display math on a line of its own
    MathBlock { content: String, line: usize },
}

impl DisplayNode {
    pub fn first_line(&self) -> usize {
        match self {
            DisplayNode::Heading { line, .. } | DisplayNode::MathBlock { line, .. } => *line,
            DisplayNode::Paragraph { lines, .. } => lines.start,
        }
    }

    /// Visible text of the node with markup removed
    pub fn plain_text(&self) -> String {
        match self {
            DisplayNode::Heading { text, .. } => text.clone(),
            DisplayNode::Paragraph { children, .. } => {
                children.iter().map(InlineNode::content).collect()
            }
            DisplayNode::MathBlock { content, .. } => content.clone(),
        }
    }
}

/// Renderer output, consumed by an HTML/SVG painter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayTree {
    pub nodes: Vec<DisplayNode>,
    pub page_count: usize,
    /// Style in effect at the end of the document
    pub style: DocumentStyle,
}

impl DisplayTree {
    pub fn new(style: DocumentStyle) -> Self {
        Self {
            nodes: Vec::new(),
            page_count: 1,
            style,
        }
    }

    pub fn add_node(&mut self, node: DisplayNode) {
        self.nodes.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for DisplayTree {
    fn default() -> Self {
        Self::new(DocumentStyle::default())
    }
}
