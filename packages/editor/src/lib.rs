//! # Folio Editor
//!
//! Live preview engine for folio documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: source → tokens → blocks            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ renderer: blocks → display tree             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: debounced, generation-stamped       │
//! │  recompilation of the latest source         │
//! │  - Scheduler: pure state machine            │
//! │  - PreviewSession: tokio timers + tasks     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{MarkupCompiler, PreviewConfig, PreviewSession};
//!
//! let config = PreviewConfig::default();
//! let session = PreviewSession::new(MarkupCompiler::new(config.compile_options()), &config);
//! let mut views = session.subscribe();
//!
//! session.set_source("= Hello\n\nSome *bold* text.");
//! views.changed().await?;
//! ```

mod config;
mod errors;
mod pipeline;
mod scheduler;
mod session;

pub use config::{PreviewConfig, DEFAULT_DEBOUNCE_MS};
pub use errors::{CompileError, CompileResult, ConfigError};
pub use pipeline::{
    compile_source, is_blank_source, CompilationResult, CompileOptions, Compiler, Diagnostic,
    MarkupCompiler,
};
pub use scheduler::{FireOutcome, Phase, PreviewState, Publication, Scheduler, Ticket};
pub use session::PreviewSession;

// Re-export common types for convenience
pub use folio_parser::DocumentStyle;
pub use folio_renderer::{DisplayNode, DisplayTree, InlineNode};
