//! # Compilation Scheduler
//!
//! Clock-free state machine behind the live preview:
//!
//! ```text
//! Idle ──source_changed──▶ Scheduled ──fire──▶ Compiling ──complete──▶ Published
//!                              ▲                                          │
//!                              └──────────────source_changed──────────────┘
//! ```
//!
//! Every `fire` stamps the attempt with a new generation. A completion is
//! published only if its generation is not older than the last published
//! one, so a slow compile can never overwrite the output of a newer one.
//! Timers live outside this type; see [`crate::PreviewSession`].

use crate::errors::CompileResult;
use crate::pipeline::{is_blank_source, CompilationResult, Diagnostic};
use folio_renderer::DisplayTree;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Scheduled,
    Compiling,
    Published,
}

/// A compilation to run, stamped with its generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireOutcome {
    /// Run this compilation and report back with [`Scheduler::complete`]
    Compile(Ticket),
    /// The source was blank; an empty result was published without compiling
    PublishedEmpty,
    /// Nothing was scheduled
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publication {
    Published,
    /// A newer generation was already published
    Discarded,
}

/// What the preview pane shows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewState {
    pub display_tree: Option<DisplayTree>,
    pub diagnostics: Vec<Diagnostic>,
    pub is_compiling: bool,
}

#[derive(Debug)]
pub struct Scheduler {
    latest_source: String,
    pending: bool,
    phase: Phase,
    /// Most recently issued generation (0 before the first fire)
    issued_generation: u64,
    last_published_generation: u64,
    last_result: Option<CompilationResult>,
    last_error: Option<Diagnostic>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            latest_source: String::new(),
            pending: false,
            phase: Phase::Idle,
            issued_generation: 0,
            last_published_generation: 0,
            last_result: None,
            last_error: None,
        }
    }

    /// Record new source text; the caller (re)arms its debounce timer
    pub fn source_changed(&mut self, source: impl Into<String>) {
        self.latest_source = source.into();
        self.pending = true;
        self.phase = Phase::Scheduled;
    }

    /// Debounce timer expired: start a compilation of the latest source
    pub fn fire(&mut self) -> FireOutcome {
        if !self.pending {
            return FireOutcome::Idle;
        }
        self.pending = false;
        self.issued_generation += 1;
        let generation = self.issued_generation;

        if is_blank_source(&self.latest_source) {
            self.publish(generation, Ok(CompilationResult::empty()));
            return FireOutcome::PublishedEmpty;
        }

        self.phase = Phase::Compiling;
        FireOutcome::Compile(Ticket {
            generation,
            source: self.latest_source.clone(),
        })
    }

    /// Report the outcome of the compilation stamped `generation`
    pub fn complete(
        &mut self,
        generation: u64,
        result: CompileResult<CompilationResult>,
    ) -> Publication {
        if generation < self.last_published_generation {
            debug!(
                generation,
                last_published = self.last_published_generation,
                "Discarding stale compilation"
            );
            return Publication::Discarded;
        }
        self.publish(generation, result);
        Publication::Published
    }

    fn publish(&mut self, generation: u64, result: CompileResult<CompilationResult>) {
        match result {
            Ok(result) => {
                self.last_result = Some(result);
                self.last_error = None;
            }
            // The previous result stays visible behind the error
            Err(err) => self.last_error = Some(err.to_diagnostic()),
        }
        self.last_published_generation = generation;

        self.phase = if self.pending {
            Phase::Scheduled
        } else if self.is_compiling() {
            Phase::Compiling
        } else {
            Phase::Published
        };
    }

    /// Drop any scheduled (not yet fired) compilation
    pub fn cancel_pending(&mut self) {
        if !self.pending {
            return;
        }
        self.pending = false;
        self.phase = if self.is_compiling() {
            Phase::Compiling
        } else if self.last_published_generation > 0 {
            Phase::Published
        } else {
            Phase::Idle
        };
    }

    /// True while the most recently issued generation has not completed
    pub fn is_compiling(&self) -> bool {
        self.issued_generation > self.last_published_generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn latest_source(&self) -> &str {
        &self.latest_source
    }

    pub fn issued_generation(&self) -> u64 {
        self.issued_generation
    }

    pub fn last_published_generation(&self) -> u64 {
        self.last_published_generation
    }

    pub fn last_result(&self) -> Option<&CompilationResult> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&Diagnostic> {
        self.last_error.as_ref()
    }

    pub fn view(&self) -> PreviewState {
        let diagnostics = match (&self.last_error, &self.last_result) {
            (Some(error), _) => vec![error.clone()],
            (None, Some(result)) => result.diagnostics.clone(),
            (None, None) => Vec::new(),
        };
        PreviewState {
            display_tree: self.last_result.as_ref().map(|r| r.display_tree.clone()),
            diagnostics,
            is_compiling: self.is_compiling(),
        }
    }
}
