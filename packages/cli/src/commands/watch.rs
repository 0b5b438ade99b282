use super::compile::{file_name, format_diagnostics, print_tree};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use folio_editor::{MarkupCompiler, PreviewSession, PreviewState};
use notify::{Config as NotifyConfig, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Source file to watch
    pub file: PathBuf,

    /// Debounce interval in milliseconds (overrides config)
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

pub fn watch(args: WatchArgs, cwd: &str) -> Result<()> {
    let mut config = Config::load(cwd)?;
    if let Some(debounce_ms) = args.debounce_ms {
        config.preview.debounce_ms = debounce_ms;
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(args.file, config))
}

async fn run(path: PathBuf, config: Config) -> Result<()> {
    let compiler = MarkupCompiler::new(config.preview.compile_options());
    let session = PreviewSession::new(compiler, &config.preview);
    let mut views = session.subscribe();

    let (tx_notify, mut rx_notify) = tokio::sync::mpsc::channel(100);
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                let _ = tx_notify.blocking_send(event);
            }
            Err(e) => warn!(error = %e, "File watcher error"),
        },
        NotifyConfig::default(),
    )
    .context("Failed to create file watcher")?;
    watcher
        .watch(&path, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", path.display()))?;

    println!(
        "{} {} {}",
        "👀".bright_blue(),
        "Watching".bright_blue().bold(),
        path.display()
    );
    println!(
        "{}",
        format!("(debounce {}ms, Ctrl+C to stop)", config.preview.debounce_ms).dimmed()
    );

    let mut source = read_source(&path)?;
    session.set_source(source.clone());

    loop {
        tokio::select! {
            Some(event) = rx_notify.recv() => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    continue;
                }
                match read_source(&path) {
                    Ok(text) if text != source => {
                        debug!(bytes = text.len(), "Source changed");
                        source = text;
                        session.set_source(source.clone());
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "Cannot read watched file"),
                }
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                print_view(&view, &source, &path);
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    session.shutdown();
    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}

fn print_view(view: &PreviewState, source: &str, path: &Path) {
    if view.is_compiling {
        println!("{}", "📝 Compiling...".dimmed());
        return;
    }

    println!("{}", "─".repeat(40).dimmed());
    if let Some(tree) = &view.display_tree {
        print_tree(tree);
    }
    if view.diagnostics.is_empty() {
        println!("{} Preview updated", "✓".green());
    } else {
        eprint!("{}", format_diagnostics(source, &file_name(path), &view.diagnostics));
        eprintln!("{} Showing last successful preview", "⚠️".yellow());
    }
}
