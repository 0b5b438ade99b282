//! # Preview Session
//!
//! Async driver for the [`Scheduler`]. Each edit aborts the pending debounce
//! timer task and arms a new one. When a timer expires the scheduler fires
//! and the compilation runs as its own task, so in-flight work is never
//! cancelled; a stale completion is simply not published.
//!
//! Published views go out on a `watch` channel.

use crate::config::PreviewConfig;
use crate::errors::CompileError;
use crate::pipeline::Compiler;
use crate::scheduler::{FireOutcome, Phase, PreviewState, Publication, Scheduler, Ticket};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

const PANIC_FALLBACK_MESSAGE: &str = "Compilation failed";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Shared {
    scheduler: Mutex<Scheduler>,
    compiler: Arc<dyn Compiler>,
    debounce: Duration,
    views: watch::Sender<PreviewState>,
}

impl Shared {
    fn fire(self: &Arc<Self>) {
        let ticket = {
            let mut scheduler = lock(&self.scheduler);
            match scheduler.fire() {
                FireOutcome::Compile(ticket) => {
                    self.broadcast(&scheduler);
                    Some(ticket)
                }
                FireOutcome::PublishedEmpty => {
                    debug!("Source is blank, published empty result");
                    self.broadcast(&scheduler);
                    None
                }
                FireOutcome::Idle => None,
            }
        };
        if let Some(ticket) = ticket {
            let shared = Arc::clone(self);
            tokio::spawn(async move { shared.run(ticket).await });
        }
    }

    #[instrument(skip(self, ticket), fields(generation = ticket.generation))]
    async fn run(self: Arc<Self>, ticket: Ticket) {
        let compile = self.compiler.compile(ticket.source);
        let result = match AssertUnwindSafe(compile).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(CompileError::Panicked(panic_message(payload.as_ref()))),
        };
        if let Err(e) = &result {
            warn!(error = %e, "Compilation failed");
        }

        let mut scheduler = lock(&self.scheduler);
        if scheduler.complete(ticket.generation, result) == Publication::Published {
            self.broadcast(&scheduler);
        }
    }

    /// Send the scheduler's view. Callers hold the scheduler lock so views
    /// reach the channel in publication order.
    fn broadcast(&self, scheduler: &Scheduler) {
        self.views.send_replace(scheduler.view());
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        PANIC_FALLBACK_MESSAGE.to_string()
    }
}

/// One live preview, bound to one editing surface.
///
/// Must be used from within a tokio runtime.
pub struct PreviewSession {
    shared: Arc<Shared>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl PreviewSession {
    pub fn new(compiler: impl Compiler, config: &PreviewConfig) -> Self {
        Self::with_compiler(Arc::new(compiler), config.debounce())
    }

    pub fn with_compiler(compiler: Arc<dyn Compiler>, debounce: Duration) -> Self {
        let (views, _) = watch::channel(PreviewState::default());
        Self {
            shared: Arc::new(Shared {
                scheduler: Mutex::new(Scheduler::new()),
                compiler,
                debounce,
                views,
            }),
            timer: Mutex::new(None),
        }
    }

    /// Replace the source text and restart the debounce timer
    pub fn set_source(&self, source: impl Into<String>) {
        let mut timer = lock(&self.timer);
        if let Some(pending) = timer.take() {
            pending.abort();
        }
        lock(&self.shared.scheduler).source_changed(source);

        let shared = Arc::clone(&self.shared);
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(shared.debounce).await;
            shared.fire();
        }));
    }

    /// Receiver that observes every published view
    pub fn subscribe(&self) -> watch::Receiver<PreviewState> {
        self.shared.views.subscribe()
    }

    /// Latest published view
    pub fn current(&self) -> PreviewState {
        self.shared.views.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        lock(&self.shared.scheduler).phase()
    }

    /// Cancel the pending debounce timer. In-flight compilations still
    /// complete but nothing new is scheduled.
    pub fn shutdown(&self) {
        if let Some(pending) = lock(&self.timer).take() {
            pending.abort();
        }
        lock(&self.shared.scheduler).cancel_pending();
    }
}

impl Drop for PreviewSession {
    fn drop(&mut self) {
        if let Some(pending) = lock(&self.timer).take() {
            pending.abort();
        }
    }
}
