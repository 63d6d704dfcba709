use crate::error::{EvalResult, MalformedResultError};
use crate::fence::strip_fences;
use crate::model::EvaluationResult;
use crate::options::Options;
use crate::repair::{RepairLogEntry, into_object, repair_prefix, repair_prefix_with_log};
use crate::source::StreamSource;
use futures_util::StreamExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// What a single fragment produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentOutcome {
    /// The cleaned buffer parsed strictly as an object.
    Complete(Value),
    /// The buffer only parsed after closing the truncated prefix.
    Partial(Value),
    /// Nothing parseable yet; keep accumulating.
    NoUpdate,
}

impl FragmentOutcome {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Complete(v) | Self::Partial(v) => Some(v),
            Self::NoUpdate => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Complete(v) | Self::Partial(v) => Some(v),
            Self::NoUpdate => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Complete(_) => "complete",
            Self::Partial(_) => "partial",
            Self::NoUpdate => "no_update",
        }
    }
}

fn clean_text(accumulated: &str, fenced: bool) -> &str {
    if fenced {
        strip_fences(accumulated)
    } else {
        accumulated.trim()
    }
}

/// Accumulates fragments and rebuilds the best available value after each one.
///
/// The accumulated buffer is append-only; fence stripping and repair work on
/// borrowed slices and fresh copies of it.
pub struct ResultBuilder {
    opts: Options,
    accumulated: String,
    fragments: usize,
    repair_log: Vec<RepairLogEntry>,
}

impl ResultBuilder {
    pub fn new(opts: Options) -> Self {
        Self {
            opts,
            accumulated: String::new(),
            fragments: 0,
            repair_log: Vec::new(),
        }
    }

    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Fragments pushed so far, empty ones included.
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Drain the repair log collected while `Options::logging` is set.
    pub fn take_repair_log(&mut self) -> Vec<RepairLogEntry> {
        std::mem::take(&mut self.repair_log)
    }

    /// Append one fragment and try strict parse, then repair-parse.
    pub fn push(&mut self, fragment: &str) -> FragmentOutcome {
        self.fragments += 1;
        if fragment.is_empty() {
            return FragmentOutcome::NoUpdate;
        }
        self.accumulated.push_str(fragment);
        let cleaned = clean_text(&self.accumulated, self.opts.fenced_code_blocks);

        if let Some(v) = into_object(cleaned) {
            return FragmentOutcome::Complete(v);
        }

        let repaired = if self.opts.logging {
            repair_prefix_with_log(cleaned, self.opts.log_context_window).map(|(text, log)| {
                self.repair_log.extend(log);
                text
            })
        } else {
            repair_prefix(cleaned)
        };
        match repaired.as_deref().and_then(into_object) {
            Some(v) => FragmentOutcome::Partial(v),
            None => FragmentOutcome::NoUpdate,
        }
    }

    /// Strictly parse and validate the whole buffer. No repair is attempted.
    ///
    /// Returns the typed result together with the decoded value it came from.
    pub fn finish(&self) -> Result<(EvaluationResult, Value), MalformedResultError> {
        let cleaned = clean_text(&self.accumulated, self.opts.fenced_code_blocks);
        let value: Value = serde_json::from_str(cleaned)
            .map_err(|e| MalformedResultError::parse(e, self.accumulated.as_str()))?;
        let result: EvaluationResult = serde_json::from_value(value.clone())
            .map_err(|e| MalformedResultError::parse(e, self.accumulated.as_str()))?;
        result
            .validate()
            .map_err(|e| MalformedResultError::shape(e, self.accumulated.as_str()))?;
        Ok((result, value))
    }
}

/// Run one evaluation against `source`, reporting every rebuilt value to `on_partial`.
///
/// Once `cancel` fires, `on_partial` is no longer invoked; the stream is still
/// drained and the final parse still decides the return value.
pub async fn run<S, F>(
    source: &S,
    subject: &str,
    opts: &Options,
    cancel: &CancellationToken,
    mut on_partial: F,
) -> EvalResult<EvaluationResult>
where
    S: StreamSource + ?Sized,
    F: FnMut(&Value),
{
    let request = opts.prompt.render(subject, opts.max_subject_len);
    let mut stream = source.open(request).await?;
    let mut builder = ResultBuilder::new(opts.clone());

    while let Some(item) = stream.next().await {
        let fragment = match item {
            Ok(fragment) => fragment,
            Err(e) => {
                tracing::warn!(
                    fragments = builder.fragments(),
                    error = %e,
                    "evaluation stream failed"
                );
                return Err(e.into());
            }
        };
        let outcome = builder.push(&fragment);
        tracing::trace!(
            fragment = builder.fragments(),
            buffered = builder.accumulated().len(),
            outcome = outcome.kind(),
            "fragment processed"
        );
        if cancel.is_cancelled() {
            continue;
        }
        if let Some(v) = outcome.value() {
            on_partial(v);
        }
    }

    let (result, value) = builder.finish().inspect_err(|e| {
        tracing::warn!(
            fragments = builder.fragments(),
            error = %e,
            "final evaluation result rejected"
        );
    })?;
    tracing::debug!(
        fragments = builder.fragments(),
        bytes = builder.accumulated().len(),
        overall_score = result.overall_score,
        "evaluation stream complete"
    );
    if !cancel.is_cancelled() {
        on_partial(&value);
    }
    Ok(result)
}
