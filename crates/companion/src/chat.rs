//! Chat boundary

use crate::ChatError;
use async_trait::async_trait;
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reply used when no language model is configured
pub const LISTENING_REPLY: &str = "I'm here to listen. As an AI assistant, I'm designed to provide support and guidance. How are you feeling today?";

/// Reply used when the language model fails
pub const FALLBACK_REPLY: &str = "I'm here with you. Sometimes it helps to just talk about what's on your mind. Would you like to share more about how you're feeling?";

const SYSTEM_PROMPT: &str = "You are SIFRA, a compassionate AI mental health companion. \
Respond to the user with empathy and care. Keep responses concise but supportive. \
If the user seems distressed, gently suggest breathing exercises or professional help. \
Respond directly without any prefixes like \"SIFRA:\" or \"Assistant:\".";

static SPEAKER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)(sifra|assistant)\s*:\s*").expect("valid prefix pattern"));

/// Chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Base URL of an OpenAI-compatible API
    pub api_base: String,
    /// API key; without one the companion only gives the listening reply
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Request timeout (milliseconds)
    pub timeout_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 150,
            temperature: 0.7,
            timeout_ms: 15_000,
        }
    }
}

/// Free-text request/response chat backend
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn reply(&self, message: &str) -> Result<String, ChatError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

/// Chat-completions client
pub struct OpenAiChatClient {
    http: reqwest::Client,
    config: ChatConfig,
}

impl OpenAiChatClient {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ChatError::Upstream(e.to_string()))?;

        info!("Chat client for model {} at {}", config.model, config.api_base);
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatService for OpenAiChatClient {
    async fn reply(&self, message: &str) -> Result<String, ChatError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ChatError::MissingApiKey)?;

        let request = CompletionRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Upstream(format!("status {}", status)));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Upstream(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ChatError::Upstream("no choices in completion".to_string()))?;

        let reply = SPEAKER_PREFIX.replace(content.trim(), "").trim().to_string();
        if reply.is_empty() {
            return Err(ChatError::Upstream("blank completion".to_string()));
        }
        Ok(reply)
    }
}

/// Companion reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    /// Whether a pre-written reply stood in for the model
    pub fallback: bool,
}

/// Chat front that never surfaces upstream failures
#[derive(Clone)]
pub struct Companion {
    service: Arc<dyn ChatService>,
}

impl Companion {
    pub fn new(service: Arc<dyn ChatService>) -> Self {
        Self { service }
    }

    /// Answer one user message.
    ///
    /// Only an empty message is an error; anything going wrong upstream
    /// yields a pre-written reply instead.
    pub async fn respond(&self, message: &str) -> Result<ChatReply, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        match self.service.reply(message).await {
            Ok(reply) => {
                debug!("Chat reply of {} chars", reply.len());
                Ok(ChatReply {
                    reply,
                    fallback: false,
                })
            }
            Err(ChatError::MissingApiKey) => {
                warn!("No chat API key configured, using listening reply");
                counter!("chat_fallbacks_total").increment(1);
                Ok(ChatReply {
                    reply: LISTENING_REPLY.to_string(),
                    fallback: true,
                })
            }
            Err(e) => {
                warn!("Chat error: {}", e);
                counter!("chat_fallbacks_total").increment(1);
                Ok(ChatReply {
                    reply: FALLBACK_REPLY.to_string(),
                    fallback: true,
                })
            }
        }
    }
}
