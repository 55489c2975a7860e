//! Companion Services
//!
//! Boundaries to the services around the stress pipeline:
//! - Chat with the language-model companion
//! - Text-to-speech with an on-device fallback plan
//! - Speech-to-text transcript assembly
//!
//! Upstream failures never reach the user: each boundary recovers with a
//! pre-written reply or a local alternative.

mod chat;
mod speech;
mod transcript;

pub use chat::{
    ChatConfig, ChatReply, ChatService, Companion, OpenAiChatClient, FALLBACK_REPLY, LISTENING_REPLY,
};
pub use speech::{
    build_ssml, plan_utterances, select_voice, HttpSpeechClient, Narration, Narrator, ProsodyProfile,
    SpeechConfig, SpeechSynthesizer, Utterance, Voice,
};
pub use transcript::{TranscriptAssembler, TranscriptSegment, VoiceSession};

use thiserror::Error;

/// Chat errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Missing message")]
    EmptyMessage,
    #[error("No API key configured")]
    MissingApiKey,
    #[error("Upstream chat service failed: {0}")]
    Upstream(String),
}

/// Speech synthesis errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("Nothing to say")]
    EmptyText,
    #[error("Speech service unavailable")]
    Unavailable,
    #[error("Upstream speech service failed: {0}")]
    Upstream(String),
}
