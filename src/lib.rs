mod classify;
pub mod builder;
pub mod cli;
pub mod controller;
pub mod error;
pub mod fence;
pub mod model;
pub mod normalize;
pub mod options;
pub mod prompt;
pub mod repair;
pub mod source;
pub mod style;

pub use builder::{FragmentOutcome, ResultBuilder, run};
pub use controller::{EvaluationController, EvaluationRun, Phase, ViewSnapshot};
pub use error::{EvalError, MalformedReason, MalformedResultError, ShapeError, StreamError};
pub use model::{Category, EvaluationResult, Tip};
pub use normalize::{NormalizedCategory, NormalizedEvaluationView, NormalizedTip, normalize};
pub use options::Options;
pub use prompt::PromptTemplate;
pub use repair::RepairLogEntry;
pub use source::{EvaluationRequest, FragmentStream, ScriptedSource, StreamSource};

use serde_json::Value;

/// Best-effort value for a possibly truncated serialization: strict parse
/// first, then repair-parse. Fences are stripped when `opts.fenced_code_blocks`.
pub fn parse_partial_to_value(input: &str, opts: &Options) -> Option<Value> {
    let mut b = ResultBuilder::new(opts.clone());
    b.push(input).into_value()
}

/// Convenience: feed a sequence of fragments through a [`ResultBuilder`] and
/// collect the outcome of each one, in order.
pub fn replay_chunks<'a, I>(chunks: I, opts: &Options) -> Vec<FragmentOutcome>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut b = ResultBuilder::new(opts.clone());
    chunks.into_iter().map(|c| b.push(c)).collect()
}

/// Convenience: strictly parse a complete transcript into an [`EvaluationResult`].
pub fn parse_result(input: &str, opts: &Options) -> Result<EvaluationResult, MalformedResultError> {
    let mut b = ResultBuilder::new(opts.clone());
    b.push(input);
    b.finish().map(|(result, _)| result)
}

#[cfg(test)]
mod tests;
