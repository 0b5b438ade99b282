use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

const EXAMPLE_DOCUMENT: &str = r#"#set text(font: "New Computer Modern", size: 11pt)

= Hello, Folio

Folio documents mix *bold* and _italic_ markup with inline math like $a^2 + b^2 = c^2$.

#set text(size: 1.2em)
Text after a set rule picks up the new style.

$ sum_(k=1)^n k = n(n+1)/2 $
"#;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Debounce interval for the live preview
    #[arg(long, default_value_t = folio_editor::DEFAULT_DEBOUNCE_MS)]
    pub debounce_ms: u64,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = Config::path(cwd);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Folio project...".bright_blue().bold());

    let example_file = PathBuf::from(cwd).join("example.typ");
    if !example_file.exists() {
        fs::write(&example_file, EXAMPLE_DOCUMENT)?;
        println!("  {} Created example.typ", "✓".green());
    }

    let mut config = Config::default();
    config.preview.debounce_ms = args.debounce_ms;

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: folio compile example.typ");
    println!("  2. Run: folio watch example.typ");
    println!("  3. Edit example.typ and watch the preview update");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_editor::{compile_source, CompileOptions};

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();
        init(
            InitArgs {
                debounce_ms: 250,
                force: false,
            },
            cwd,
        )
        .unwrap();

        let config = Config::load(cwd).unwrap();
        assert_eq!(config.preview.debounce_ms, 250);
        assert!(dir.path().join("example.typ").exists());
    }

    #[test]
    fn test_init_does_not_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();
        fs::write(Config::path(cwd), r#"{ "preview": { "debounceMs": 10 } }"#).unwrap();

        init(
            InitArgs {
                debounce_ms: 999,
                force: false,
            },
            cwd,
        )
        .unwrap();
        assert_eq!(Config::load(cwd).unwrap().preview.debounce_ms, 10);
    }

    #[test]
    fn test_example_document_compiles() {
        let result = compile_source(EXAMPLE_DOCUMENT, &CompileOptions::default()).unwrap();
        assert_eq!(result.display_tree.nodes.len(), 4);
    }
}
