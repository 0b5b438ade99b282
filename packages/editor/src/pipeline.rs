//! # Compile Pipeline
//!
//! Source text → lex → classify → render, as one synchronous step.
//!
//! The [`Compiler`] trait is the seam the scheduler drives; [`MarkupCompiler`]
//! implements it on top of [`compile_source`] with a shared line cache so
//! repeated compiles of an edited document only re-lex changed lines.

use crate::errors::CompileResult;
use folio_parser::{classify_with_style, tokenize, DocumentStyle, LineCache, Token};
use folio_renderer::{DisplayTree, Renderer};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, instrument};

/// A user-visible message about a compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    /// 0-based source line, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }
}

/// Output of one successful compilation. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationResult {
    pub display_tree: DisplayTree,
    pub page_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationResult {
    /// Result for an empty or whitespace-only document
    pub fn empty() -> Self {
        Self::from_tree(DisplayTree::default())
    }

    fn from_tree(display_tree: DisplayTree) -> Self {
        Self {
            page_count: display_tree.page_count,
            display_tree,
            diagnostics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileOptions {
    /// Style the classifier starts from
    pub base_style: DocumentStyle,
}

/// Whether `source` has nothing to compile
pub fn is_blank_source(source: &str) -> bool {
    source.trim().is_empty()
}

/// Compile `source` in one pass.
///
/// Blank sources short-circuit to [`CompilationResult::empty`] without lexing.
#[instrument(skip(source, options), fields(bytes = source.len()))]
pub fn compile_source(source: &str, options: &CompileOptions) -> CompileResult<CompilationResult> {
    if is_blank_source(source) {
        return Ok(CompilationResult::empty());
    }
    compile_lines(&tokenize(source), options)
}

fn compile_lines(lines: &[Vec<Token>], options: &CompileOptions) -> CompileResult<CompilationResult> {
    let classification = classify_with_style(lines, options.base_style.clone());
    let tree = Renderer::new().render(&classification.blocks, &classification.style)?;
    debug!(lines = lines.len(), nodes = tree.nodes.len(), "Compiled source");
    Ok(CompilationResult::from_tree(tree))
}

/// Anything that can turn source text into a compilation result
pub trait Compiler: Send + Sync + 'static {
    fn compile(&self, source: String) -> BoxFuture<'static, CompileResult<CompilationResult>>;
}

/// The markup compiler, with incremental lexing across compiles
#[derive(Debug, Clone, Default)]
pub struct MarkupCompiler {
    options: CompileOptions,
    cache: Arc<Mutex<LineCache>>,
}

impl MarkupCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            cache: Arc::default(),
        }
    }

    /// Compile synchronously through the line cache
    pub fn compile_now(&self, source: &str) -> CompileResult<CompilationResult> {
        if is_blank_source(source) {
            return Ok(CompilationResult::empty());
        }
        let lines = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tokenize(source);
        compile_lines(&lines, &self.options)
    }
}

impl Compiler for MarkupCompiler {
    fn compile(&self, source: String) -> BoxFuture<'static, CompileResult<CompilationResult>> {
        let compiler = self.clone();
        async move { compiler.compile_now(&source) }.boxed()
    }
}
