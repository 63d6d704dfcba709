//! Evaluation view state machine.
//!
//! ```text
//! Idle ──open──▶ Streaming ──ok──▶ Complete ──retry──▶ Streaming
//!                    │
//!                    └──err──▶ Error ──retry──▶ Streaming
//! any ──close──▶ Idle
//! ```
//!
//! Every run carries a generation number. Opening a new run or closing the
//! view bumps the generation and cancels the previous run's token; callbacks
//! from an older generation are ignored rather than the run being torn down.

use crate::builder;
use crate::error::EvalResult;
use crate::model::EvaluationResult;
use crate::normalize::{NormalizedEvaluationView, first_category_name, normalize};
use crate::options::Options;
use crate::source::StreamSource;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Streaming,
    Complete,
    Error,
}

#[derive(Debug, Clone)]
enum ViewState {
    Idle,
    Streaming {
        partial: Option<NormalizedEvaluationView>,
    },
    Complete {
        result: EvaluationResult,
    },
    Error {
        message: String,
    },
}

#[derive(Debug)]
struct Shared {
    generation: u64,
    state: ViewState,
    focal: Option<String>,
    /// Set once the focal category has been chosen for the current run,
    /// automatically or by the user.
    focal_settled: bool,
    subject: Option<String>,
    cancel: CancellationToken,
}

impl Shared {
    fn reset(&mut self, state: ViewState) -> u64 {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.generation += 1;
        self.state = state;
        self.focal = None;
        self.focal_settled = false;
        self.generation
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A point-in-time copy of what the view should render.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub phase: Phase,
    pub generation: u64,
    pub partial: Option<NormalizedEvaluationView>,
    pub result: Option<EvaluationResult>,
    pub error: Option<String>,
    pub focal: Option<String>,
}

impl ViewSnapshot {
    /// The record the display surface renders, if any.
    pub fn view(&self) -> Option<NormalizedEvaluationView> {
        match self.phase {
            Phase::Complete => self.result.as_ref().map(NormalizedEvaluationView::from),
            Phase::Streaming => self.partial.clone(),
            Phase::Idle | Phase::Error => None,
        }
    }
}

pub struct EvaluationController<S: ?Sized> {
    source: Arc<S>,
    opts: Options,
    shared: Arc<Mutex<Shared>>,
}

impl<S> EvaluationController<S>
where
    S: StreamSource + ?Sized + 'static,
{
    pub fn new(source: Arc<S>, opts: Options) -> Self {
        Self {
            source,
            opts,
            shared: Arc::new(Mutex::new(Shared {
                generation: 0,
                state: ViewState::Idle,
                focal: None,
                focal_settled: false,
                subject: None,
                cancel: CancellationToken::new(),
            })),
        }
    }

    /// Start a new run for `subject`, superseding any run in flight.
    ///
    /// The view moves to `Streaming` immediately; the returned run does the
    /// work when driven.
    pub fn open(&self, subject: impl Into<String>) -> EvaluationRun<S> {
        let subject = subject.into();
        let mut shared = lock(&self.shared);
        let generation = shared.reset(ViewState::Streaming { partial: None });
        shared.subject = Some(subject.clone());
        tracing::debug!(generation, subject_len = subject.len(), "evaluation opened");
        EvaluationRun {
            generation,
            subject,
            source: Arc::clone(&self.source),
            opts: self.opts.clone(),
            shared: Arc::clone(&self.shared),
            cancel: shared.cancel.clone(),
        }
    }

    /// Re-run the last subject. `None` if nothing was ever opened.
    pub fn retry(&self) -> Option<EvaluationRun<S>> {
        let subject = lock(&self.shared).subject.clone()?;
        Some(self.open(subject))
    }

    /// Close the view: back to `Idle`, abandoning the current run.
    pub fn close(&self) {
        let mut shared = lock(&self.shared);
        let generation = shared.reset(ViewState::Idle);
        tracing::debug!(generation, "evaluation view closed");
    }

    /// Explicit user selection; always wins over automatic selection.
    pub fn select_category(&self, name: impl Into<String>) {
        let mut shared = lock(&self.shared);
        shared.focal = Some(name.into());
        shared.focal_settled = true;
    }

    /// Feed a rebuilt value for run `generation` into the view.
    ///
    /// Returns `false` when the run has been superseded or the view is no
    /// longer streaming; the value is then dropped.
    pub fn apply_partial(&self, generation: u64, value: &Value) -> bool {
        apply_partial(&self.shared, generation, value)
    }

    pub fn phase(&self) -> Phase {
        match lock(&self.shared).state {
            ViewState::Idle => Phase::Idle,
            ViewState::Streaming { .. } => Phase::Streaming,
            ViewState::Complete { .. } => Phase::Complete,
            ViewState::Error { .. } => Phase::Error,
        }
    }

    pub fn focal_category(&self) -> Option<String> {
        lock(&self.shared).focal.clone()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let shared = lock(&self.shared);
        let mut snap = ViewSnapshot {
            phase: Phase::Idle,
            generation: shared.generation,
            partial: None,
            result: None,
            error: None,
            focal: shared.focal.clone(),
        };
        match &shared.state {
            ViewState::Idle => {}
            ViewState::Streaming { partial } => {
                snap.phase = Phase::Streaming;
                snap.partial = partial.clone();
            }
            ViewState::Complete { result } => {
                snap.phase = Phase::Complete;
                snap.result = Some(result.clone());
            }
            ViewState::Error { message } => {
                snap.phase = Phase::Error;
                snap.error = Some(message.clone());
            }
        }
        snap
    }
}

/// One evaluation run, created by [`EvaluationController::open`].
pub struct EvaluationRun<S: ?Sized> {
    generation: u64,
    subject: String,
    source: Arc<S>,
    opts: Options,
    shared: Arc<Mutex<Shared>>,
    cancel: CancellationToken,
}

impl<S> EvaluationRun<S>
where
    S: StreamSource + ?Sized + 'static,
{
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drive the run to completion and settle the view.
    ///
    /// The run's own outcome is returned even when it was superseded, in
    /// which case the view is left untouched.
    pub async fn drive(self) -> EvalResult<EvaluationResult> {
        let generation = self.generation;
        let shared = &self.shared;
        let outcome = builder::run(
            self.source.as_ref(),
            &self.subject,
            &self.opts,
            &self.cancel,
            |value| {
                apply_partial(shared, generation, value);
            },
        )
        .await;

        let mut guard = lock(shared);
        if guard.generation != generation {
            tracing::debug!(generation, current = guard.generation, "stale run finished");
            return outcome;
        }
        match &outcome {
            Ok(result) => {
                guard.state = ViewState::Complete {
                    result: result.clone(),
                };
            }
            Err(e) => {
                guard.state = ViewState::Error {
                    message: e.user_message(),
                };
                guard.focal = None;
            }
        }
        drop(guard);
        outcome
    }
}

fn apply_partial(shared: &Mutex<Shared>, generation: u64, value: &Value) -> bool {
    let mut guard = lock(shared);
    if guard.generation != generation {
        return false;
    }
    if !matches!(guard.state, ViewState::Streaming { .. }) {
        return false;
    }
    if !guard.focal_settled
        && let Some(name) = first_category_name(value)
    {
        guard.focal = Some(name.to_string());
        guard.focal_settled = true;
        tracing::debug!(generation, focal = name, "focal category selected");
    }
    guard.state = ViewState::Streaming {
        partial: Some(normalize(Some(value))),
    };
    true
}
