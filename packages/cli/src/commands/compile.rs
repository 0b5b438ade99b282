use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use folio_editor::{compile_source, Diagnostic};
use folio_renderer::{DisplayNode, DisplayTree, InlineNode};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Source file to compile
    pub file: PathBuf,

    /// Print the compilation result as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn compile(args: CompileArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("Cannot read {}", args.file.display()))?;

    match compile_source(&source, &config.preview.compile_options()) {
        Ok(result) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_tree(&result.display_tree);
                println!();
                println!(
                    "{} {} nodes, {} page",
                    "✓".green(),
                    result.display_tree.nodes.len(),
                    result.page_count
                );
            }
            Ok(())
        }
        Err(err) => {
            let diagnostics = [err.to_diagnostic()];
            eprint!("{}", format_diagnostics(&source, &file_name(&args.file), &diagnostics));
            Err(anyhow!("Compilation failed"))
        }
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Print a readable outline of a display tree
pub fn print_tree(tree: &DisplayTree) {
    for node in &tree.nodes {
        match node {
            DisplayNode::Heading {
                level,
                size_pt,
                text,
                ..
            } => {
                println!(
                    "{} {} {}",
                    "=".repeat(*level).bright_blue(),
                    text.bold(),
                    format!("({}pt)", size_pt).dimmed()
                );
            }
            DisplayNode::Paragraph {
                font_family,
                font_size_pt,
                children,
                ..
            } => {
                let content: String = children.iter().map(render_inline).collect();
                println!(
                    "{} {}",
                    format!("[{} {}pt]", font_family, font_size_pt).dimmed(),
                    content
                );
            }
            DisplayNode::MathBlock { content, .. } => {
                println!("{} {}", "∑".cyan(), content.cyan().italic());
            }
        }
    }
}

fn render_inline(node: &InlineNode) -> String {
    match node {
        InlineNode::Text { content } => content.clone(),
        InlineNode::Strong { content } => content.bold().to_string(),
        InlineNode::Emphasis { content } => content.italic().to_string(),
        InlineNode::Math { content } => content.cyan().italic().to_string(),
    }
}

/// Pretty-print diagnostics with source context using ariadne
pub fn format_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let mut output = Vec::new();

    for diagnostic in diagnostics {
        let span = line_span(source, diagnostic.line);

        let mut report =
            Report::build(ReportKind::Error, filename, span.start).with_message(&diagnostic.message);
        if diagnostic.line.is_some() {
            report = report.with_label(
                Label::new((filename, span))
                    .with_color(Color::Red)
                    .with_message("while rendering this block"),
            );
        }

        if report
            .finish()
            .write((filename, Source::from(source)), &mut output)
            .is_err()
        {
            output.extend_from_slice(diagnostic.message.as_bytes());
            output.push(b'\n');
        }
    }

    String::from_utf8(output).unwrap_or_else(|_| "Error formatting failed".to_string())
}

/// Character range of a 0-based line, for labelling
fn line_span(source: &str, line: Option<usize>) -> Range<usize> {
    let Some(line) = line else {
        return 0..0;
    };
    let mut start = 0;
    for (index, text) in source.split('\n').enumerate() {
        let len = text.chars().count();
        if index == line {
            return start..start + len;
        }
        start += len + 1;
    }
    let end = source.chars().count();
    end..end
}
