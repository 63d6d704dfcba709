//! Stream source boundary
//!
//! The text-generation service is an external collaborator. It is reached
//! through [`StreamSource`], which turns one request into an ordered stream of
//! text fragments. The stream ending signals completion; an `Err` item is a
//! transport failure mid-stream.

use crate::error::StreamError;
use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use std::sync::{Mutex, PoisonError};

pub type FragmentStream = BoxStream<'static, Result<String, StreamError>>;

/// System instructions plus the task prompt with the subject interpolated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    pub system: String,
    pub prompt: String,
}

#[async_trait]
pub trait StreamSource: Send + Sync {
    /// Open a fragment stream for `request`.
    ///
    /// Errors here are failures before the first fragment (connection refused,
    /// request rejected).
    async fn open(&self, request: EvaluationRequest) -> Result<FragmentStream, StreamError>;
}

/// Replays a fixed list of fragments, optionally failing on open or partway.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    fragments: Vec<String>,
    open_error: Option<String>,
    fail_after: Option<(usize, String)>,
    requests: Mutex<Vec<EvaluationRequest>>,
}

impl ScriptedSource {
    pub fn new<I, T>(fragments: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Reject every `open` call with `message`.
    pub fn failing_open(message: impl Into<String>) -> Self {
        Self {
            open_error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Deliver `count` fragments, then fail with `message` instead of completing.
    pub fn fail_after(mut self, count: usize, message: impl Into<String>) -> Self {
        self.fail_after = Some((count, message.into()));
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<EvaluationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl StreamSource for ScriptedSource {
    async fn open(&self, request: EvaluationRequest) -> Result<FragmentStream, StreamError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        if let Some(msg) = &self.open_error {
            return Err(StreamError::open(msg.clone()));
        }
        let mut items: Vec<Result<String, StreamError>> = match &self.fail_after {
            Some((count, _)) => self.fragments.iter().take(*count).cloned().map(Ok).collect(),
            None => self.fragments.iter().cloned().map(Ok).collect(),
        };
        if let Some((_, msg)) = &self.fail_after {
            items.push(Err(StreamError::interrupted(msg.clone())));
        }
        Ok(stream::iter(items).boxed())
    }
}
