//! HTTP-backed collaborators
//!
//! Blocking `ureq` clients with a global per-request timeout. Every failure
//! surfaces as a [`CollaboratorError`] and is absorbed by the caller's
//! fallback.

use crate::collaborators::{CaptionGenerator, ImageGenerator};
use crate::error::CollaboratorError;
use crate::prompt::{caption_prompt, CAPTION_SYSTEM_PROMPT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use ureq::Agent;

fn agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// Text-to-image over `GET {base}/prompt/{prompt}`
#[derive(Debug, Clone)]
pub struct PollinationsImageGenerator {
    agent: Agent,
    base_url: String,
}

impl PollinationsImageGenerator {
    /// Client for `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: agent(timeout),
            base_url: base_url.into(),
        }
    }

    fn url(&self, prompt: &str) -> String {
        format!(
            "{}/prompt/{}",
            self.base_url.trim_end_matches('/'),
            urlencoded(prompt)
        )
    }
}

impl ImageGenerator for PollinationsImageGenerator {
    fn generate(&self, prompt: &str) -> Result<Vec<u8>, CollaboratorError> {
        let url = self.url(prompt);
        tracing::debug!(%url, "requesting image");
        let bytes = self.agent.get(&url).call()?.into_body().read_to_vec()?;
        if bytes.is_empty() {
            return Err(CollaboratorError::InvalidResponse("empty body".to_string()));
        }
        Ok(bytes)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

/// Caption generation over a local chat endpoint (`POST {base}/api/chat`)
#[derive(Debug, Clone)]
pub struct OllamaCaptionGenerator {
    agent: Agent,
    base_url: String,
    model: String,
}

impl OllamaCaptionGenerator {
    /// Client for `model` served at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: agent(timeout),
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

impl CaptionGenerator for OllamaCaptionGenerator {
    fn generate(
        &self,
        product: &str,
        audience: &str,
        tone: &str,
    ) -> Result<String, CollaboratorError> {
        let user = caption_prompt(product, audience, tone);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: CAPTION_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            stream: false,
        };
        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));

        let response: ChatResponse = self
            .agent
            .post(&url)
            .send_json(&request)?
            .into_body()
            .read_json()?;

        response
            .message
            .map(|reply| reply.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| CollaboratorError::InvalidResponse("no message content".to_string()))
    }
}

/// Percent-encode a URL path segment
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => out.push(ch),
            ' ' => out.push_str("%20"),
            _ => {
                let mut buf = [0u8; 4];
                for byte in ch.encode_utf8(&mut buf).as_bytes() {
                    out.push_str(&format!("%{byte:02X}"));
                }
            }
        }
    }
    out
}
