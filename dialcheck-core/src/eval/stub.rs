//! Scripted LLM backend for deterministic runs
//!
//! Replies are returned in the order they were queued, one per call, so a
//! batch can be replayed offline with known replies, failures, and delays.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::error::{DialcheckError, Result};
use crate::llm::{LLMProvider, LLMRequest, LLMResponse, ModelInfo};

/// One predetermined backend reply
#[derive(Debug, Clone)]
pub enum StubReply {
    /// Successful completion with this content
    Content(String),
    /// Non-success status
    Status { status: u16, message: String },
    /// Network-level failure
    Transport(String),
    /// Successful completion after a delay
    Delayed { content: String, delay: Duration },
}

impl StubReply {
    pub fn content(content: impl Into<String>) -> Self {
        StubReply::Content(content.into())
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        StubReply::Status {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        StubReply::Transport(message.into())
    }

    pub fn delayed(content: impl Into<String>, delay: Duration) -> Self {
        StubReply::Delayed {
            content: content.into(),
            delay,
        }
    }
}

/// LLM provider returning queued replies
#[derive(Debug, Default)]
pub struct StubLLMProvider {
    replies: Mutex<VecDeque<StubReply>>,
    requests: Mutex<Vec<LLMRequest>>,
}

impl StubLLMProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stub with replies returned in order
    pub fn with_replies(replies: impl IntoIterator<Item = StubReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue another reply
    pub async fn push(&self, reply: StubReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Requests received so far
    pub async fn requests(&self) -> Vec<LLMRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl LLMProvider for StubLLMProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        self.requests.lock().await.push(request.clone());

        let reply = self.replies.lock().await.pop_front();
        match reply {
            Some(StubReply::Content(content)) => Ok(LLMResponse { content }),
            Some(StubReply::Status { status, message }) => {
                Err(DialcheckError::Backend { status, message })
            }
            Some(StubReply::Transport(message)) => Err(DialcheckError::Transport(message)),
            Some(StubReply::Delayed { content, delay }) => {
                tokio::time::sleep(delay).await;
                Ok(LLMResponse { content })
            }
            None => Err(DialcheckError::Transport(
                "stub provider has no reply queued".to_string(),
            )),
        }
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "stub".to_string(),
            model_name: "scripted".to_string(),
        }
    }
}
