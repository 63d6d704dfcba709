use thiserror::Error;

/// Shown when a failure carries no description of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong while evaluating. Please try again.";

/// Transport failure from the stream source, before or during streaming.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("failed to open evaluation stream: {0}")]
    Open(String),
    #[error("evaluation stream interrupted: {0}")]
    Interrupted(String),
}

impl StreamError {
    pub fn open(msg: impl Into<String>) -> Self {
        Self::Open(msg.into())
    }

    pub fn interrupted(msg: impl Into<String>) -> Self {
        Self::Interrupted(msg.into())
    }

    /// The transport's own message, without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Open(m) | Self::Interrupted(m) => m,
        }
    }
}

/// A terminal result that parsed but does not have the expected shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("overallScore {0} is outside 0..=100")]
    OverallScoreOutOfRange(u32),
    #[error("summary is blank")]
    BlankSummary,
    #[error("expected {expected} categories, got {actual}")]
    CategoryCount { expected: usize, actual: usize },
    #[error("category #{0} has a blank name")]
    BlankCategoryName(usize),
    #[error("category name {0:?} appears more than once")]
    DuplicateCategoryName(String),
    #[error("category {name:?} score {score} is outside 0..=10")]
    CategoryScoreOutOfRange { name: String, score: f64 },
    #[error("category {0:?} has a blank label")]
    BlankLabel(String),
    #[error("category {name:?} has {count} tips, expected 3 or 4")]
    TipCount { name: String, count: usize },
    #[error("category {name:?} tip #{index} has blank text")]
    BlankTipText { name: String, index: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedReason {
    #[error("invalid JSON: {0}")]
    Parse(String),
    #[error("unexpected shape: {0}")]
    Shape(#[from] ShapeError),
}

/// The final buffer could not be turned into an `EvaluationResult`.
///
/// `raw` holds the complete accumulated buffer for diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("evaluation result is malformed ({reason})")]
pub struct MalformedResultError {
    pub reason: MalformedReason,
    pub raw: String,
}

impl MalformedResultError {
    pub fn parse(err: serde_json::Error, raw: impl Into<String>) -> Self {
        Self {
            reason: MalformedReason::Parse(err.to_string()),
            raw: raw.into(),
        }
    }

    pub fn shape(err: ShapeError, raw: impl Into<String>) -> Self {
        Self {
            reason: MalformedReason::Shape(err),
            raw: raw.into(),
        }
    }
}

/// Everything that can end an evaluation run unsuccessfully.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    Transport(#[from] StreamError),
    #[error(transparent)]
    Malformed(#[from] MalformedResultError),
}

impl EvalError {
    /// Text for the error state of the view.
    pub fn user_message(&self) -> String {
        let descriptive = match self {
            Self::Transport(e) => !e.detail().trim().is_empty(),
            Self::Malformed(_) => true,
        };
        if descriptive {
            self.to_string()
        } else {
            GENERIC_ERROR_MESSAGE.to_string()
        }
    }
}

pub type EvalResult<T> = Result<T, EvalError>;
