//! Refinement and summarization over an OpenAI-compatible
//! `chat/completions` endpoint.
//!
//! Docs: https://platform.openai.com/docs/api-reference/chat/create

use crate::defaults;
use crate::error::{Result, ScribaError};
use crate::pipeline::types::ContextDigest;
use crate::refine::refiner::{Refiner, Summarizer};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize, Deserialize, Debug)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize, Debug)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Shared chat-completions client backing both the refiner and the
/// abstractive summarizer.
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(base_url: &str, api_key: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ScribaError::Other(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One chat completion. Returns the first choice's content, trimmed.
    ///
    /// Errors are plain messages; callers wrap them in their own variant so
    /// a refinement failure and a summary failure stay distinguishable.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> std::result::Result<String, String> {
        let request_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error response".to_string());
            return Err(format!("server returned {}: {}", status, body));
        }

        let response_body: ChatResponse = response
            .json()
            .await
            .map_err(|e| format!("failed to parse response: {}", e))?;

        match response_body.choices.first() {
            Some(choice) => Ok(choice.message.content.trim().to_string()),
            None => Err("response has no choices".to_string()),
        }
    }
}

/// Fold a non-empty context digest into the refinement instruction.
fn build_system_message(instruction: &str, context: &ContextDigest) -> String {
    if context.is_empty() {
        instruction.to_string()
    } else {
        format!(
            "{}\n\nContext from the previous section:\n{}",
            instruction,
            context.as_str()
        )
    }
}

/// Refiner backed by a chat-completions model.
pub struct ApiRefiner {
    chat: ChatClient,
    instruction: String,
}

impl ApiRefiner {
    pub fn new(chat: ChatClient, instruction: String) -> Self {
        Self { chat, instruction }
    }
}

#[async_trait]
impl Refiner for ApiRefiner {
    async fn refine(&self, batch_text: &str, context: &ContextDigest) -> Result<String> {
        let system = build_system_message(&self.instruction, context);
        self.chat
            .complete(&system, batch_text, 0.5, None)
            .await
            .map_err(|message| ScribaError::Refinement { message })
    }

    fn name(&self) -> &str {
        self.chat.model()
    }
}

/// Abstractive summarizer backed by the same chat-completions endpoint,
/// bounded by a token cap.
pub struct ApiSummarizer {
    chat: ChatClient,
    instruction: String,
    max_tokens: u32,
}

impl ApiSummarizer {
    pub fn new(chat: ChatClient, instruction: String, max_tokens: u32) -> Self {
        Self {
            chat,
            instruction,
            max_tokens,
        }
    }
}

#[async_trait]
impl Summarizer for ApiSummarizer {
    async fn summarize(&self, material: &str) -> Result<String> {
        self.chat
            .complete(&self.instruction, material, 0.7, Some(self.max_tokens))
            .await
            .map_err(|message| ScribaError::Summary { message })
    }
}
