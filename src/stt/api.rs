//! Speech-to-text over an OpenAI-compatible `audio/transcriptions` endpoint.

use crate::config::SttConfig;
use crate::defaults;
use crate::error::{Result, ScribaError};
use crate::pipeline::types::Segment;
use crate::stt::transcriber::Transcriber;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

/// Transcriber backed by an OpenAI-compatible transcription API.
///
/// Each segment's audio file is uploaded as multipart form data; the
/// response is plain text (`response_format=text`).
pub struct ApiTranscriber {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    language: String,
    prompt: String,
}

impl ApiTranscriber {
    pub fn new(base_url: &str, api_key: String, config: &SttConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ScribaError::Transcription {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/audio/transcriptions", base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            language: config.language.clone(),
            prompt: config.prompt.clone(),
        })
    }

    fn build_form(&self, file_name: String, audio: Vec<u8>) -> Result<Form> {
        let part = Part::bytes(audio)
            .file_name(file_name)
            .mime_str("audio/mpeg")
            .map_err(|e| ScribaError::Transcription {
                message: format!("failed to build audio part: {}", e),
            })?;

        let mut form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "text")
            .text("temperature", "0");

        if !self.language.is_empty() && self.language != defaults::LANGUAGE {
            form = form.text("language", self.language.clone());
        }
        if !self.prompt.is_empty() {
            form = form.text("prompt", self.prompt.clone());
        }

        Ok(form)
    }
}

#[async_trait]
impl Transcriber for ApiTranscriber {
    async fn transcribe(&self, segment: &Segment) -> Result<String> {
        let audio =
            tokio::fs::read(&segment.path)
                .await
                .map_err(|e| ScribaError::Transcription {
                    message: format!("failed to read {}: {}", segment.path.display(), e),
                })?;

        let form = self.build_form(segment.file_name(), audio)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ScribaError::Transcription {
                message: format!("HTTP request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error response".to_string());
            return Err(ScribaError::Transcription {
                message: format!("server returned {}: {}", status, body),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ScribaError::Transcription {
                message: format!("failed to read response body: {}", e),
            })?;

        Ok(text.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.model
    }
}
