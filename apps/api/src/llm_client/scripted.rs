//! Scripted completion backend for tests.
//!
//! Queue replies with the builder methods; each `complete()` consumes one in order
//! and records the prompt it was given. An exhausted script answers 503.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm_client::{CompletionBackend, LlmError};

enum Reply {
    Text(String),
    Error(LlmError),
    Stall,
}

#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Reply::Text(text.into()))
    }

    pub fn reply_json(self, value: Value) -> Self {
        self.reply(value.to_string())
    }

    pub fn fail(self, err: LlmError) -> Self {
        self.push(Reply::Error(err))
    }

    /// Never answers; pair with a paused clock to exercise timeouts.
    pub fn stall(self) -> Self {
        self.push(Reply::Stall)
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn push(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Error(err)) => Err(err),
            Some(Reply::Stall) => std::future::pending().await,
            None => Err(LlmError::Api {
                status: 503,
                message: "script exhausted".to_string(),
            }),
        }
    }
}
