use folio_parser::{classify, tokenize};
use folio_renderer::{render, DisplayNode, DisplayTree, InlineNode};

fn compile(source: &str) -> DisplayTree {
    let classification = classify(&tokenize(source));
    render(&classification.blocks, &classification.style).expect("Render failed")
}

fn paragraph_sizes(tree: &DisplayTree) -> Vec<(String, f64)> {
    tree.nodes
        .iter()
        .filter_map(|node| match node {
            DisplayNode::Paragraph { font_size_pt, .. } => Some((node.plain_text(), *font_size_pt)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_introduction_heading() {
    let tree = compile("= Introduction");
    assert_eq!(tree.nodes.len(), 1);
    match &tree.nodes[0] {
        DisplayNode::Heading { level, text, .. } => {
            assert_eq!(*level, 1);
            assert_eq!(text, "Introduction");
        }
        other => panic!("expected heading, got {:?}", other),
    }
}

#[test]
fn test_bold_and_italic_paragraph() {
    let tree = compile("Some *bold* and _italic_ text.");
    match &tree.nodes[0] {
        DisplayNode::Paragraph { children, .. } => assert_eq!(
            children,
            &vec![
                InlineNode::text("Some "),
                InlineNode::strong("bold"),
                InlineNode::text(" and "),
                InlineNode::emphasis("italic"),
                InlineNode::text(" text."),
            ]
        ),
        other => panic!("expected paragraph, got {:?}", other),
    }
}

#[test]
fn test_set_text_size_applies_to_following_paragraph() {
    let tree = compile("#set text(size: 14pt)\nHello");
    assert_eq!(paragraph_sizes(&tree), vec![("Hello".to_string(), 14.0)]);
}

#[test]
fn test_style_change_is_forward_only() {
    let tree = compile("Earlier paragraph\n#set text(size: 18pt)\nLater paragraph\n\nLast one");
    assert_eq!(
        paragraph_sizes(&tree),
        vec![
            ("Earlier paragraph".to_string(), 12.0),
            ("Later paragraph".to_string(), 18.0),
            ("Last one".to_string(), 18.0),
        ]
    );
}

#[test]
fn test_font_family_flows_into_paragraphs() {
    let tree = compile("#set text(font: (\"Linux Libertine\", \"serif\"))\nBody");
    match &tree.nodes[0] {
        DisplayNode::Paragraph { font_family, .. } => assert_eq!(font_family, "Linux Libertine"),
        other => panic!("expected paragraph, got {:?}", other),
    }
}

#[test]
fn test_comment_line_renders_as_text() {
    let tree = compile("// just a note");
    assert_eq!(tree.nodes.len(), 1);
    assert_eq!(tree.nodes[0].plain_text(), "// just a note");
}
