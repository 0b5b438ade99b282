use anyhow::{Context, Result};
use clap::Args;
use colored::{ColoredString, Colorize};
use folio_parser::{tokenize, Token, TokenKind};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct TokensArgs {
    /// Source file to tokenize
    pub file: PathBuf,

    /// Print tokens as JSON instead of highlighted source
    #[arg(long)]
    pub json: bool,
}

pub fn tokens(args: TokensArgs) -> Result<()> {
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("Cannot read {}", args.file.display()))?;
    let lines = tokenize(&source);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
        return Ok(());
    }

    let width = lines.len().to_string().len();
    for (index, tokens) in lines.iter().enumerate() {
        let rendered: String = tokens.iter().map(|t| highlight(t).to_string()).collect();
        println!(
            "{} {} {}",
            format!("{:>width$}", index + 1, width = width).dimmed(),
            "│".dimmed(),
            rendered
        );
    }
    Ok(())
}

fn highlight(token: &Token) -> ColoredString {
    let text = token.text.as_str();
    match token.kind {
        TokenKind::Keyword => text.magenta().bold(),
        TokenKind::FunctionCall => text.blue(),
        TokenKind::StringLiteral => text.green(),
        TokenKind::NumberLiteral => text.yellow(),
        TokenKind::Comment => text.bright_black().italic(),
        TokenKind::EmphasisMarkup => text.bold(),
        TokenKind::MathInline => text.cyan().italic(),
        TokenKind::Heading => text.bright_blue().bold(),
        TokenKind::PlainText => text.normal(),
    }
}
