//! HTTP API server: axum router and request handlers.
//!
//! The server runs on the tokio async runtime while the render thread
//! runs on a plain `std::thread`. Communication is via `std::sync::mpsc`.
//! Effect names are resolved here, against the shared [`Registry`], so the
//! render thread only ever sees indices.
//!
//! ## Rust concepts
//! - `async fn` and `.await` for non-blocking I/O
//! - axum extractors: `State`, `Json`
//! - `Arc` for sharing state across async tasks
//! - Serde `Deserialize` for parsing JSON request bodies
//! - `tower-http` middleware for CORS and request tracing

use crate::registry::Registry;
use crate::render::{DisplayState, DisplayStatus, RenderCommand, lock_status};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// ── App State ────────────────────────────────────────────────────────

/// Shared application state, passed to every handler via axum's `State` extractor.
///
/// Rust concept: CLONE for Arc
/// `Arc` is cheap to clone: it just increments a counter. axum clones the
/// state for each request handler, so everything inside must be cheaply
/// cloneable.
#[derive(Clone)]
pub struct AppState {
    /// Channel to send commands to the render thread
    pub command_tx: Sender<RenderCommand>,
    /// Shared display status (render thread writes, handlers read)
    pub status: Arc<Mutex<DisplayStatus>>,
    /// Registered effects, for name lookup and listing
    pub registry: Arc<Registry>,
}

// ── OpenAPI Documentation ────────────────────────────────────────────

#[derive(OpenApi)]
#[openapi(
    paths(
        get_status,
        get_effects,
        post_display_effect,
        post_display_clear,
        post_display_stop,
        post_brightness,
    ),
    components(schemas(
        DisplayStatus,
        DisplayState,
        EffectInfo,
        EffectRequest,
        BrightnessRequest,
    )),
    tags(
        (name = "display", description = "Display control endpoints"),
        (name = "effects", description = "Effect discovery endpoints"),
        (name = "system", description = "System status endpoints"),
    ),
    info(
        title = "LED Matrix Effects API",
        version = env!("CARGO_PKG_VERSION"),
        description = "HTTP API for selecting animated effects on an RGB LED matrix"
    )
)]
pub struct ApiDoc;

// ── Request/Response types ───────────────────────────────────────────

/// One registered effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct EffectInfo {
    /// Position in the registry
    #[schema(example = 8)]
    pub index: usize,
    /// Effect name, as accepted by POST /api/v1/display/effect
    #[schema(example = "Snake")]
    pub name: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct EffectRequest {
    /// Exact, case-sensitive effect name. Use GET /api/v1/effects to list them.
    #[schema(example = "Snake")]
    name: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct BrightnessRequest {
    /// Brightness level (0-100)
    #[schema(example = 75, minimum = 0, maximum = 100)]
    value: u8,
}

// ── Router ───────────────────────────────────────────────────────────

/// Build the axum router with all API endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(
            SwaggerUi::new("/docs")
                .url("/api-docs/openapi.json", ApiDoc::openapi())
                .config(utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"]).validator_url("none")),
        )
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/effects", get(get_effects))
        .route("/api/v1/display/effect", post(post_display_effect))
        .route("/api/v1/display/clear", post(post_display_clear))
        .route("/api/v1/display/stop", post(post_display_stop))
        .route("/api/v1/brightness", post(post_brightness))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Hand a command to the render thread.
fn send(state: &AppState, cmd: RenderCommand) -> Result<StatusCode, (StatusCode, String)> {
    state.command_tx.send(cmd).map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Render thread gone".to_string(),
        )
    })?;
    Ok(StatusCode::OK)
}

// ── Handlers ─────────────────────────────────────────────────────────

/// GET /api/v1/status: return current display state
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "system",
    responses(
        (status = 200, description = "Current display status", body = DisplayStatus)
    )
)]
async fn get_status(State(state): State<AppState>) -> Json<DisplayStatus> {
    let status = lock_status(&state.status).clone();
    Json(status)
}

/// GET /api/v1/effects: list registered effects in registry order
#[utoipa::path(
    get,
    path = "/api/v1/effects",
    tag = "effects",
    responses(
        (status = 200, description = "Registered effects", body = Vec<EffectInfo>)
    )
)]
async fn get_effects(State(state): State<AppState>) -> Json<Vec<EffectInfo>> {
    let effects = state
        .registry
        .iter()
        .map(|(index, name)| EffectInfo {
            index,
            name: name.to_string(),
        })
        .collect();
    Json(effects)
}

/// POST /api/v1/display/effect: start an effect by name
#[utoipa::path(
    post,
    path = "/api/v1/display/effect",
    tag = "display",
    request_body = EffectRequest,
    responses(
        (status = 200, description = "Effect started"),
        (status = 404, description = "No effect with that name")
    )
)]
async fn post_display_effect(
    State(state): State<AppState>,
    Json(req): Json<EffectRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let index = state.registry.lookup_index(&req.name).ok_or_else(|| {
        tracing::warn!("Unknown effect requested: {}", req.name);
        (
            StatusCode::NOT_FOUND,
            format!("Unknown effect: {}", req.name),
        )
    })?;

    send(&state, RenderCommand::PlayEffect(index))
}

/// POST /api/v1/display/clear: stop the effect and blank the display
#[utoipa::path(
    post,
    path = "/api/v1/display/clear",
    tag = "display",
    responses(
        (status = 200, description = "Display cleared"),
    )
)]
async fn post_display_clear(
    State(state): State<AppState>,
) -> Result<StatusCode, (StatusCode, String)> {
    send(&state, RenderCommand::Clear)
}

/// POST /api/v1/display/stop: stop the effect, keeping the last frame
#[utoipa::path(
    post,
    path = "/api/v1/display/stop",
    tag = "display",
    responses(
        (status = 200, description = "Effect stopped"),
    )
)]
async fn post_display_stop(
    State(state): State<AppState>,
) -> Result<StatusCode, (StatusCode, String)> {
    send(&state, RenderCommand::Stop)
}

/// POST /api/v1/brightness: set display brightness (0-100)
#[utoipa::path(
    post,
    path = "/api/v1/brightness",
    tag = "display",
    request_body = BrightnessRequest,
    responses(
        (status = 200, description = "Brightness updated"),
    )
)]
async fn post_brightness(
    State(state): State<AppState>,
    Json(req): Json<BrightnessRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    send(&state, RenderCommand::SetBrightness(req.value))
}
