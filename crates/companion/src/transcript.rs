//! Speech-to-text transcript handling

use crate::{ChatError, ChatReply, Companion};
use serde::Deserialize;
use tracing::debug;

/// One recognition result as reported by the recognizer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranscriptSegment {
    pub transcript: String,
    pub is_final: bool,
}

/// Turns a stream of recognition events into one message per utterance
#[derive(Debug, Default)]
pub struct TranscriptAssembler {
    interim: String,
    finished: bool,
}

impl TranscriptAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the full result list of a recognition event.
    ///
    /// Returns the message exactly once, when the last result turns final.
    pub fn on_results(&mut self, results: &[TranscriptSegment]) -> Option<String> {
        if self.finished {
            return None;
        }

        self.interim = results
            .iter()
            .map(|r| r.transcript.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if results.last().is_some_and(|r| r.is_final) {
            self.finished = true;
            let message = self.interim.trim().to_string();
            debug!("Final transcript: {} chars", message.len());
            return (!message.is_empty()).then_some(message);
        }
        None
    }

    /// Text recognized so far
    pub fn interim(&self) -> &str {
        &self.interim
    }

    /// Start listening for a new utterance
    pub fn restart(&mut self) {
        *self = Self::default();
    }
}

/// Voice conversation: each finished utterance becomes one chat call
pub struct VoiceSession {
    companion: Companion,
    assembler: TranscriptAssembler,
}

impl VoiceSession {
    pub fn new(companion: Companion) -> Self {
        Self {
            companion,
            assembler: TranscriptAssembler::new(),
        }
    }

    /// Handle a recognition event; replies once the utterance is final
    pub async fn hear(&mut self, results: &[TranscriptSegment]) -> Result<Option<ChatReply>, ChatError> {
        match self.assembler.on_results(results) {
            Some(message) => self.companion.respond(&message).await.map(Some),
            None => Ok(None),
        }
    }

    /// Live caption while the user speaks
    pub fn caption(&self) -> &str {
        self.assembler.interim()
    }

    pub fn listen_again(&mut self) {
        self.assembler.restart();
    }
}
