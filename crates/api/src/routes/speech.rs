//! Speech Route

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use companion::{Narration, Utterance, Voice};
use serde::{Deserialize, Serialize};

use crate::{ApiError, SharedState};

#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    /// Voices the device can speak with
    #[serde(default)]
    pub voices: Vec<Voice>,
}

/// Instructions for speaking on the device
#[derive(Debug, Serialize)]
pub struct OnDeviceSpeech {
    pub mode: &'static str,
    pub voice: Option<Voice>,
    pub utterances: Vec<Utterance>,
}

/// Audio bytes when the speech service answers, otherwise an on-device plan
pub async fn post_speech(
    State(state): State<SharedState>,
    Json(request): Json<SpeechRequest>,
) -> Result<Response, ApiError> {
    let narration = state.narrator.narrate(&request.text, &request.voices).await?;

    Ok(match narration {
        Narration::Audio(audio) => ([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response(),
        Narration::OnDevice { voice, utterances } => Json(OnDeviceSpeech {
            mode: "on-device",
            voice,
            utterances,
        })
        .into_response(),
    })
}
