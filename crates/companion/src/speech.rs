//! Text-to-speech boundary

use crate::SpeechError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

static COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*").expect("valid comma pattern"));
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?])\s+").expect("valid sentence pattern"));
static COMFORT_PHRASES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(I'm here for you|You are safe|Take a deep breath|Thank you for sharing that)")
        .expect("valid emphasis pattern")
});
static FEMALE_VOICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)female|zira|samantha|google us english female|google uk female|amelia|aria")
        .expect("valid voice pattern")
});

/// Delivery style for synthesized speech
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProsodyProfile {
    #[default]
    Warm,
    Gentle,
    Lively,
}

impl ProsodyProfile {
    /// (rate, pitch, pause after sentence, pause after comma)
    fn settings(&self) -> (&'static str, &'static str, &'static str, &'static str) {
        match self {
            ProsodyProfile::Warm => ("92%", "+6%", "450ms", "250ms"),
            ProsodyProfile::Gentle => ("95%", "+4%", "400ms", "200ms"),
            ProsodyProfile::Lively => ("100%", "+8%", "300ms", "150ms"),
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wrap text in SSML with pauses and emphasis on comforting phrases
pub fn build_ssml(text: &str, profile: ProsodyProfile) -> String {
    let (rate, pitch, sentence_pause, comma_pause) = profile.settings();
    let escaped = escape_xml(text.trim());

    let with_commas = COMMA.replace_all(&escaped, format!(", <break time=\"{}\"/> ", comma_pause).as_str());
    let with_sentences = SENTENCE_END.replace_all(
        &with_commas,
        format!("$1 <break time=\"{}\"/> ", sentence_pause).as_str(),
    );
    let emphasized = COMFORT_PHRASES.replace_all(&with_sentences, "<emphasis level=\"moderate\">$1</emphasis>");

    format!(
        "<speak><prosody rate=\"{}\" pitch=\"{}\">{}</prosody></speak>",
        rate, pitch, emphasized
    )
}

/// An on-device voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

/// Preferred on-device voice: a female voice by name, else the first
/// English voice, else whatever comes first.
pub fn select_voice(voices: &[Voice]) -> Option<&Voice> {
    voices
        .iter()
        .find(|v| FEMALE_VOICE.is_match(&v.name))
        .or_else(|| voices.iter().find(|v| v.lang.to_ascii_lowercase().starts_with("en")))
        .or_else(|| voices.first())
}

/// One sentence scheduled for on-device synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Utterance {
    pub text: String,
    /// Start offset from the first sentence (milliseconds)
    pub delay_ms: u64,
}

/// Split text into sentences and stagger their start times
pub fn plan_utterances(text: &str) -> Vec<Utterance> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        // Keep the punctuation with its sentence
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);

    let mut delay_ms = 0;
    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let utterance = Utterance {
                text: s.to_string(),
                delay_ms,
            };
            delay_ms += (s.chars().count() as u64 * 30).max(500) + 150;
            utterance
        })
        .collect()
}

/// Remote text-to-speech
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Render SSML to playable audio bytes
    async fn synthesize(&self, ssml: &str) -> Result<Vec<u8>, SpeechError>;
}

/// Speech service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// TTS endpoint; `None` means always speak on-device
    pub endpoint: Option<String>,
    /// Voice selector sent to the service
    pub voice: String,
    pub profile: ProsodyProfile,
    pub timeout_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            voice: "female".to_string(),
            profile: ProsodyProfile::Warm,
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    voice: &'a str,
    ssml: bool,
}

/// JSON-over-HTTP speech client
pub struct HttpSpeechClient {
    http: reqwest::Client,
    config: SpeechConfig,
}

impl HttpSpeechClient {
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| SpeechError::Upstream(e.to_string()))?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeechClient {
    async fn synthesize(&self, ssml: &str) -> Result<Vec<u8>, SpeechError> {
        let endpoint = self.config.endpoint.as_deref().ok_or(SpeechError::Unavailable)?;

        let response = self
            .http
            .post(endpoint)
            .json(&SpeechRequest {
                text: ssml,
                voice: &self.config.voice,
                ssml: true,
            })
            .send()
            .await
            .map_err(|e| SpeechError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SpeechError::Upstream(format!("status {}", response.status())));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SpeechError::Upstream(e.to_string()))?;
        if audio.is_empty() {
            return Err(SpeechError::Upstream("empty audio".to_string()));
        }
        Ok(audio.to_vec())
    }
}

/// How a reply will be voiced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narration {
    /// Audio rendered by the remote service
    Audio(Vec<u8>),
    /// Speak on the device with this voice and schedule
    OnDevice {
        voice: Option<Voice>,
        utterances: Vec<Utterance>,
    },
}

/// Speaks replies remotely when possible and on-device otherwise
#[derive(Clone)]
pub struct Narrator {
    remote: Arc<dyn SpeechSynthesizer>,
    profile: ProsodyProfile,
}

impl Narrator {
    pub fn new(remote: Arc<dyn SpeechSynthesizer>, profile: ProsodyProfile) -> Self {
        info!("Narrator using {:?} prosody", profile);
        Self { remote, profile }
    }

    /// Voice `text`, choosing among the device's `voices` if the remote
    /// service cannot help.
    pub async fn narrate(&self, text: &str, voices: &[Voice]) -> Result<Narration, SpeechError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeechError::EmptyText);
        }

        match self.remote.synthesize(&build_ssml(text, self.profile)).await {
            Ok(audio) => {
                debug!("Remote speech: {} bytes", audio.len());
                return Ok(Narration::Audio(audio));
            }
            Err(SpeechError::Unavailable) => debug!("No remote speech configured"),
            Err(e) => warn!("Server TTS failed, falling back to on-device speech: {}", e),
        }

        Ok(Narration::OnDevice {
            voice: select_voice(voices).cloned(),
            utterances: plan_utterances(text),
        })
    }
}
