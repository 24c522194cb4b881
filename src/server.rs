//! HTTP server for browser front-ends.
//!
//! This module provides an HTTP server that:
//! - Accepts interaction events per UI session via POST /sessions/:id/events
//! - Runs one detection engine per session and serves readings with UI hints
//! - Routes chat messages to the companion, aware of the session's state
//!
//! # Architecture
//!
//! ```text
//! Browser UI ──→ POST /sessions/:id/events ──→ engine (per session)
//!      ↑                                            │
//!      └──── GET /sessions/:id/state ◀── reading + UI adaptation
//!      └──── POST /chat ──→ companion ◀── last reading
//! ```

use crate::adaptive::UiAdaptation;
use crate::collector::types::SensorEvent;
use crate::companion::{Companion, CompanionError, CompanionReply};
use crate::config::{DetectorConfig, SourceConfig};
use crate::core::engine::{EmotionDetectionEngine, EmotionReading};
use crate::store::JsonStore;
use crate::transparency::{TransparencyLog, TransparencyStats};
use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

/// Maximum length of a session id.
const MAX_SESSION_ID_LEN: usize = 64;

/// Default cap on concurrent sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 256;

/// Default time after which an untouched session may be evicted.
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Detector settings for new session engines
    pub detector: DetectorConfig,
    /// Sources each session listens to
    pub sources: SourceConfig,
    /// Directory for companion training data
    pub data_path: PathBuf,
    /// Maximum number of live sessions
    pub max_sessions: usize,
    /// Sessions untouched for this long are evicted to make room
    pub session_idle_timeout: Duration,
}

impl ServerConfig {
    /// Create a new server configuration with default detector settings
    pub fn new(port: u16, data_path: PathBuf) -> Self {
        Self {
            port,
            detector: DetectorConfig::default(),
            sources: SourceConfig::default(),
            data_path,
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
        }
    }
}

/// One UI session's engine.
struct Session {
    engine: EmotionDetectionEngine,
    last_seen: Instant,
}

impl Session {
    fn touch(&mut self) -> &mut EmotionDetectionEngine {
        self.last_seen = Instant::now();
        &mut self.engine
    }
}

/// Shared server state
pub struct ServerState {
    /// One engine per UI session
    sessions: RwLock<HashMap<String, Session>>,
    /// Chat companion shared by all sessions
    companion: RwLock<Companion>,
    /// Processing counters
    transparency: TransparencyLog,
    detector: DetectorConfig,
    sources: SourceConfig,
    max_sessions: usize,
    session_idle_timeout: Duration,
}

impl ServerState {
    /// Create new server state
    pub fn new(config: &ServerConfig) -> Self {
        let companion = match Companion::load(JsonStore::new(config.data_path.clone())) {
            Ok(companion) => companion,
            Err(e) => {
                tracing::warn!("Failed to load companion training data: {}", e);
                Companion::new()
            }
        };

        Self {
            sessions: RwLock::new(HashMap::new()),
            companion: RwLock::new(companion),
            transparency: TransparencyLog::new(),
            detector: config.detector.clone(),
            sources: config.sources,
            max_sessions: config.max_sessions.max(1),
            session_idle_timeout: config.session_idle_timeout,
        }
    }
}

/// Events posted by a front-end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBatch {
    pub events: Vec<SensorEvent>,
}

/// Response from the events endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    pub accepted: usize,
    /// Samples buffered for the session after this batch
    pub samples: usize,
}

/// Response from the state endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    pub reading: EmotionReading,
    pub adaptation: UiAdaptation,
}

/// Chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
        }),
    )
}

fn validate_session_id(id: &str) -> Result<(), ApiError> {
    let valid = !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_SESSION_ID",
            format!("Invalid session id: {id}"),
        ))
    }
}

fn session_not_found(id: &str) -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        "SESSION_NOT_FOUND",
        format!("Unknown session: {id}"),
    )
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /sessions/:id/events
///
/// Feeds events into the session's engine, creating it on first use.
async fn ingest_events(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(batch): Json<EventBatch>,
) -> Result<Json<EventsResponse>, ApiError> {
    validate_session_id(&id)?;

    let mut sessions = state.sessions.write().await;
    if !sessions.contains_key(&id) && sessions.len() >= state.max_sessions {
        let before = sessions.len();
        sessions.retain(|_, session| session.last_seen.elapsed() < state.session_idle_timeout);
        if before > sessions.len() {
            tracing::info!(evicted = before - sessions.len(), "idle sessions evicted");
        }
        if sessions.len() >= state.max_sessions {
            return Err(api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "TOO_MANY_SESSIONS",
                format!("Session limit of {} reached", state.max_sessions),
            ));
        }
    }

    let engine = sessions
        .entry(id.clone())
        .or_insert_with(|| {
            tracing::info!(session = %id, "new session");
            Session {
                engine: EmotionDetectionEngine::with_sources(state.detector.clone(), state.sources),
                last_seen: Instant::now(),
            }
        })
        .touch();

    for event in &batch.events {
        engine.record_event(event);
        state.transparency.record_event(event);
    }

    Ok(Json(EventsResponse {
        accepted: batch.events.len(),
        samples: engine.sample_count(),
    }))
}

/// GET /sessions/:id/state
///
/// Computes a fresh reading for the session.
async fn session_state(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<StateResponse>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let engine = sessions
        .get_mut(&id)
        .ok_or_else(|| session_not_found(&id))?
        .touch();

    let reading = engine.detect();
    state.transparency.record_reading(reading.state);
    let adaptation = UiAdaptation::for_reading(&reading);

    Ok(Json(StateResponse {
        reading,
        adaptation,
    }))
}

/// DELETE /sessions/:id
async fn end_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.sessions.write().await.remove(&id) {
        Some(_) => {
            tracing::info!(session = %id, "session ended");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(session_not_found(&id)),
    }
}

/// POST /chat
///
/// Replies to a message, using the session's last reading when one exists.
async fn chat(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<CompanionReply>, ApiError> {
    let reading = match request.session_id {
        Some(ref id) => state
            .sessions
            .read()
            .await
            .get(id)
            .and_then(|session| session.engine.last_reading().cloned()),
        None => None,
    };

    let mut companion = state.companion.write().await;
    let reply = companion
        .respond(&request.message, reading.as_ref())
        .map_err(|e| match e {
            CompanionError::EmptyMessage => {
                api_error(StatusCode::BAD_REQUEST, "EMPTY_MESSAGE", e.to_string())
            }
            other => api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMPANION_ERROR",
                other.to_string(),
            ),
        })?;

    if let Err(e) = companion.save() {
        tracing::warn!("Failed to save companion training data: {}", e);
    }

    Ok(Json(reply))
}

/// GET /stats
async fn stats(State(state): State<Arc<ServerState>>) -> Json<TransparencyStats> {
    Json(state.transparency.stats())
}

/// Build the router for the given state.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/sessions/:id/events", post(ingest_events))
        .route("/sessions/:id/state", get(session_state))
        .route("/sessions/:id", axum::routing::delete(end_session))
        .route("/chat", post(chat))
        .layer(
            CorsLayer::new()
                .allow_origin([
                    HeaderValue::from_static("http://localhost"),
                    HeaderValue::from_static("http://127.0.0.1"),
                    HeaderValue::from_static("http://localhost:3000"),
                    HeaderValue::from_static("http://localhost:5173"),
                ])
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    config.detector.validate()?;
    let state = Arc::new(ServerState::new(&config));
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Neuro-adaptive engine listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
