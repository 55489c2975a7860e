//! MindMate API Server
//!
//! HTTP host for the stress pipeline and the companion services: the
//! browser pushes expression probabilities and reads back the stress
//! panel, chats with the companion, and persists its settings and
//! favourite motivation cards.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use camera_capture::{CameraError, OpaqueFrameSource};
use companion::{ChatError, Companion, HttpSpeechClient, Narrator, OpenAiChatClient, SpeechError};
use emotion::{EmotionError, EmotionLabel, EmotionVector, ExpressionClassifier, PushedExpressionClassifier, ScriptStep, ScriptedClassifier};
use frame_sampler::{FrameSampler, SamplerError, SamplerHandle, StressContext};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use storage::{SettingsStore, StorageError};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub mod config;
pub mod rate_limit;
mod routes;

pub use self::config::AppConfig;
use rate_limit::{create_governor_config, ChatGovernorConfig};

/// API errors, rendered as `{"error": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Config(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::EmptyMessage => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SpeechError> for ApiError {
    fn from(e: SpeechError) -> Self {
        match e {
            SpeechError::EmptyText => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<EmotionError> for ApiError {
    fn from(e: EmotionError) -> Self {
        match e {
            EmotionError::Classifier(_) => ApiError::Internal(e.to_string()),
            other => ApiError::Unprocessable(other.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::UnknownKey(_) => ApiError::NotFound(e.to_string()),
            StorageError::InvalidValue { .. } => ApiError::Unprocessable(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SamplerError> for ApiError {
    fn from(e: SamplerError) -> Self {
        match e {
            SamplerError::Camera(CameraError::DeviceUnavailable(_)) => ApiError::Unavailable(e.to_string()),
            SamplerError::Config(_) => ApiError::Config(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<::config::ConfigError> for ApiError {
    fn from(e: ::config::ConfigError) -> Self {
        ApiError::Config(e.to_string())
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// Read side of the stress session
    pub context: StressContext,
    /// Receives expression probabilities computed in the browser
    pub expressions: Arc<PushedExpressionClassifier>,
    pub sampler: FrameSampler,
    /// Running sampler, if the camera is on
    pub sampling: Mutex<Option<SamplerHandle>>,
    pub companion: Companion,
    pub narrator: Narrator,
    pub settings: SettingsStore,
    /// Whether a chat API key is configured
    pub chat_configured: bool,
    /// Prometheus render handle, absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
    pub version: String,
    pub start_time: Instant,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create new application state
    pub fn new(config: &AppConfig, metrics: Option<PrometheusHandle>) -> Result<Self, ApiError> {
        let context = StressContext::new();
        let expressions = Arc::new(PushedExpressionClassifier::new());

        let classifier: Arc<dyn ExpressionClassifier> = if config.server.demo {
            info!("Demo mode: replaying scripted expressions");
            Arc::new(demo_classifier()?)
        } else {
            expressions.clone()
        };
        let sampler = FrameSampler::new(config.sampler.clone(), classifier, context.clone());

        let chat = OpenAiChatClient::new(config.chat.clone())?;
        let speech = HttpSpeechClient::new(config.speech.clone())?;

        Ok(Self {
            context,
            expressions,
            sampler,
            sampling: Mutex::new(None),
            companion: Companion::new(Arc::new(chat)),
            narrator: Narrator::new(Arc::new(speech), config.speech.profile),
            settings: SettingsStore::open(&config.storage.settings_path),
            chat_configured: config.chat.api_key.as_deref().is_some_and(|k| !k.is_empty()),
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        })
    }

    /// Start sampling unless already running. Returns whether it was started.
    pub async fn start_sampling(&self) -> Result<bool, ApiError> {
        let mut sampling = self.sampling.lock().await;
        if sampling.as_ref().is_some_and(|h| h.is_running()) {
            return Ok(false);
        }

        // Pixels stay in the browser; frames are only tick markers
        let handle = self.sampler.start(Arc::new(OpaqueFrameSource::new())).await?;
        *sampling = Some(handle);
        Ok(true)
    }

    /// Stop sampling if running.
    ///
    /// The slot stays locked until the loop has exited, so a concurrent
    /// start waits for the old session to be torn down.
    pub async fn stop_sampling(&self) -> Result<Option<frame_sampler::SamplerReport>, ApiError> {
        let mut sampling = self.sampling.lock().await;
        match sampling.take() {
            Some(handle) => Ok(Some(handle.stop().await?)),
            None => Ok(None),
        }
    }

    pub async fn is_sampling(&self) -> bool {
        self.sampling.lock().await.as_ref().is_some_and(|h| h.is_running())
    }
}

/// A slow drift from calm to tense and back
fn demo_classifier() -> Result<ScriptedClassifier, EmotionError> {
    let face = |label: EmotionLabel, p: f64| -> Result<ScriptStep, EmotionError> {
        Ok(ScriptStep::Face(EmotionVector::new().with(label, p)?.with(EmotionLabel::Neutral, 1.0 - p)?))
    };

    Ok(ScriptedClassifier::new([
        face(EmotionLabel::Happy, 0.8)?,
        face(EmotionLabel::Happy, 0.6)?,
        ScriptStep::NoFace,
        face(EmotionLabel::Surprised, 0.7)?,
        face(EmotionLabel::Sad, 0.65)?,
        face(EmotionLabel::Fearful, 0.75)?,
        face(EmotionLabel::Angry, 0.9)?,
        face(EmotionLabel::Sad, 0.55)?,
    ])
    .looping())
}

/// Create the application router.
///
/// `chat_limit` guards `/api/chat`; with it the router must be served with
/// peer address info.
pub fn create_router(state: SharedState, chat_limit: Option<Arc<ChatGovernorConfig>>) -> Router {
    let mut chat = Router::new().route("/api/chat", post(routes::chat::post_chat));
    if let Some(config) = chat_limit {
        chat = chat.layer(GovernorLayer { config });
    }

    Router::new()
        .route("/api/v1/health", get(routes::health::get_health))
        .route("/api/v1/stress", get(routes::stress::get_stress))
        .route("/api/v1/stress/reset", post(routes::stress::reset_stress))
        .route("/api/v1/expressions", post(routes::stress::push_expressions))
        .route("/api/v1/camera/start", post(routes::camera::start_camera))
        .route("/api/v1/camera/stop", post(routes::camera::stop_camera))
        .route("/api/v1/speech", post(routes::speech::post_speech))
        .route("/api/v1/settings", get(routes::settings::get_settings))
        .route("/api/v1/settings/:key", put(routes::settings::put_setting))
        .route("/api/v1/motivation", get(routes::motivation::get_motivation))
        .route(
            "/api/v1/motivation/favorites/:id",
            post(routes::motivation::toggle_favorite),
        )
        .route("/metrics", get(routes::health::get_metrics))
        .merge(chat)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Initialize logging. `RUST_LOG` wins over the configured level.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server until Ctrl-C
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let metrics = PrometheusBuilder::new().install_recorder()?;
    let state = Arc::new(AppState::new(&config, Some(metrics))?);
    let chat_limit = create_governor_config(&config.rate_limit)?;
    let app = create_router(state.clone(), chat_limit);

    if !state.chat_configured {
        warn!("No chat API key configured, companion will only listen");
    }
    if config.server.autostart_sampler {
        state.start_sampling().await?;
    }

    info!("Starting API server on {}", config.server.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(report) = state.stop_sampling().await? {
        info!("Final sampling run: {} samples over {} ticks", report.samples, report.ticks);
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_state(dir: &TempDir) -> SharedState {
        let mut config = AppConfig::default();
        config.storage.settings_path = dir.path().join("settings.json");
        Arc::new(AppState::new(&config, None).unwrap())
    }

    async fn call(state: &SharedState, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = create_router(state.clone(), None).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let (status, body) = call(&state, Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["components"]["sampler"]["status"], "stopped");
        assert_eq!(body["components"]["chat"]["status"], "listening-only");
    }

    #[tokio::test]
    async fn test_empty_session_view() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let (status, body) = call(&state, Method::GET, "/api/v1/stress", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sample_count"], 0);
        assert_eq!(body["color_bucket"], Value::Null);
        assert_eq!(body["recommendations"], json!(["meditation", "chat", "distraction"]));
        assert_eq!(body["sampling"], false);
    }

    #[tokio::test]
    async fn test_invalid_expressions_rejected() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let (status, _) = call(&state, Method::POST, "/api/v1/expressions", Some(json!({ "calm": 0.5 }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = call(&state, Method::POST, "/api/v1/expressions", Some(json!({ "happy": 1.5 }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        // Logits must cover every classifier channel
        let (status, _) = call(&state, Method::POST, "/api/v1/expressions", Some(json!({ "logits": [1.0, 2.0] }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!state.expressions.has_pending());
    }

    #[tokio::test]
    async fn test_logits_pushed() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        // neutral, happy, sad, angry, fearful, disgusted, surprised
        let (status, body) = call(
            &state,
            Method::POST,
            "/api/v1/expressions",
            Some(json!({ "logits": [0.0, 0.0, 0.0, 6.0, 0.0, 0.0, 0.0] })),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["accepted"], true);
        assert!(state.expressions.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pushed_expression_reaches_session() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let (status, _) = call(&state, Method::POST, "/api/v1/camera/start", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            &state,
            Method::POST,
            "/api/v1/expressions",
            Some(json!({ "sad": 0.9, "neutral": 0.1 })),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);

        // First tick lands one interval after start
        tokio::time::sleep(Duration::from_millis(1600)).await;

        let (_, body) = call(&state, Method::GET, "/api/v1/stress", None).await;
        assert_eq!(body["sample_count"], 1);
        assert_eq!(body["emotion"], "sad");
        assert_eq!(body["stress_score"], 84);
        assert_eq!(body["color_bucket"], "red");
        assert_eq!(
            body["recommendations"],
            json!(["breathing", "mood-lift", "meditation", "chat", "distraction"])
        );
        assert_eq!(body["sampling"], true);

        let (status, body) = call(&state, Method::POST, "/api/v1/camera/stop", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["samples"], 1);

        // Stopping discards the session
        let (_, body) = call(&state, Method::GET, "/api/v1/stress", None).await;
        assert_eq!(body["sample_count"], 0);
    }

    #[tokio::test]
    async fn test_stop_holds_slot_until_stopped() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        assert!(state.start_sampling().await.unwrap());

        // The stop future parks on the worker exit; the slot must stay locked
        let (report, locked_while_stopping) = tokio::join!(state.stop_sampling(), async {
            state.sampling.try_lock().is_err()
        });
        assert!(report.unwrap().is_some());
        assert!(locked_while_stopping);
        assert!(!state.is_sampling().await);

        assert!(state.start_sampling().await.unwrap());
        assert!(state.is_sampling().await);
        state.stop_sampling().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_without_start() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let (status, body) = call(&state, Method::POST, "/api/v1/camera/stop", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["running"], false);
        assert_eq!(body["report"], Value::Null);
    }

    #[tokio::test]
    async fn test_chat() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let (status, body) = call(&state, Method::POST, "/api/chat", Some(json!({ "message": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing message");

        let (status, body) = call(&state, Method::POST, "/api/chat", Some(json!({ "message": "hi" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], companion::LISTENING_REPLY);
        assert_eq!(body["fallback"], true);
    }

    #[tokio::test]
    async fn test_settings_roundtrip() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let (status, body) = call(&state, Method::GET, "/api/v1/settings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mindmate_settings"]["theme"], "Dark Purple");

        let (status, _) = call(
            &state,
            Method::PUT,
            "/api/v1/settings/mindmate_profile",
            Some(json!({ "name": "Asha", "email": "asha@example.com", "bio": "Runner" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(&state, Method::GET, "/api/v1/settings", None).await;
        assert_eq!(body["mindmate_profile"]["name"], "Asha");

        let (status, _) = call(&state, Method::PUT, "/api/v1/settings/theme", Some(json!("light"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            &state,
            Method::PUT,
            "/api/v1/settings/motivation_favorites",
            Some(json!({ "not": "a list" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        // Favourites are card ids, not texts
        let (status, _) = call(
            &state,
            Method::PUT,
            "/api/v1/settings/motivation_favorites",
            Some(json!(["You are not alone"])),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = call(
            &state,
            Method::PUT,
            "/api/v1/settings/motivation_favorites",
            Some(json!([1, 7])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([1, 7]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_motivation_rotates() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let (status, body) = call(&state, Method::GET, "/api/v1/motivation", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["featured"]["id"], 1);
        assert_eq!(body["next_rotation_ms"], 8000);
        assert_eq!(body["favorites"], json!([]));
        assert_eq!(body["cards"].as_array().map(Vec::len), Some(8));

        tokio::time::sleep(Duration::from_secs(17)).await;
        let (_, body) = call(&state, Method::GET, "/api/v1/motivation", None).await;
        assert_eq!(body["featured"]["id"], 3);
        assert_eq!(body["featured"]["title"], "Small steps matter");
        assert_eq!(body["next_rotation_ms"], 7000);
    }

    #[tokio::test]
    async fn test_toggle_favorite() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let (status, body) = call(&state, Method::POST, "/api/v1/motivation/favorites/5", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favorite"], true);
        assert_eq!(body["favorites"], json!([5]));

        call(&state, Method::POST, "/api/v1/motivation/favorites/2", None).await;
        let (_, body) = call(&state, Method::POST, "/api/v1/motivation/favorites/5", None).await;
        assert_eq!(body["favorite"], false);
        assert_eq!(body["favorites"], json!([2]));

        let (status, _) = call(&state, Method::POST, "/api/v1/motivation/favorites/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Persisted under the favourites settings key
        let reopened = SettingsStore::open(state.settings.path());
        assert_eq!(reopened.get(storage::SettingsKey::Favorites), json!([2]));
        let (_, body) = call(&state, Method::GET, "/api/v1/settings", None).await;
        assert_eq!(body["motivation_favorites"], json!([2]));
    }

    #[tokio::test]
    async fn test_speech_falls_back_to_device() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let (status, body) = call(
            &state,
            Method::POST,
            "/api/v1/speech",
            Some(json!({
                "text": "Hello there. Take a deep breath.",
                "voices": [
                    { "name": "Google Deutsch", "lang": "de-DE" },
                    { "name": "Microsoft Zira", "lang": "en-US" }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "on-device");
        assert_eq!(body["voice"]["name"], "Microsoft Zira");
        assert_eq!(body["utterances"].as_array().map(Vec::len), Some(2));

        let (status, _) = call(&state, Method::POST, "/api/v1/speech", Some(json!({ "text": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let (status, _) = call(&state, Method::GET, "/metrics", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_demo_script_builds() {
        let classifier = demo_classifier().unwrap();
        assert_eq!(classifier.calls(), 0);
    }
}
