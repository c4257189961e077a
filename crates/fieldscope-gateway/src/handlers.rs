//! HTTP endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Plain-text liveness line |
//! | `GET` | `/api/digipin/encode` | Coordinate to grid code |
//! | `GET` | `/api/digipin/decode` | Grid code to coordinate |
//! | `POST` | `/chat` | Farming-assistant chat proxy |

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{info, warn};

use crate::digipin;
use crate::state::AppState;

/// Query parameters for `GET /api/digipin/encode`.
#[derive(Debug, serde::Deserialize)]
pub struct EncodeQuery {
    /// Latitude in decimal degrees.
    pub latitude: Option<String>,
    /// Longitude in decimal degrees.
    pub longitude: Option<String>,
}

/// Query parameters for `GET /api/digipin/decode`.
#[derive(Debug, serde::Deserialize)]
pub struct DecodeQuery {
    /// The grid code to decode.
    pub digipin: Option<String>,
}

/// Body of `POST /chat`.
#[derive(Debug, serde::Deserialize)]
pub struct ChatRequest {
    /// The user's question.
    pub message: String,
    /// Reply language, defaulting to English.
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "English".to_owned()
}

fn error_body(message: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "error": message }))
}

/// `GET /` -- liveness line.
pub async fn index() -> &'static str {
    "Fieldscope gateway is running"
}

/// `GET /api/digipin/encode?latitude&longitude`.
pub async fn encode(Query(query): Query<EncodeQuery>) -> impl IntoResponse {
    let (Some(lat_raw), Some(lon_raw)) = (query.latitude, query.longitude) else {
        return (
            StatusCode::BAD_REQUEST,
            error_body("Latitude and longitude are required"),
        );
    };
    let (Ok(lat), Ok(lon)) = (lat_raw.parse::<f64>(), lon_raw.parse::<f64>()) else {
        return (
            StatusCode::BAD_REQUEST,
            error_body("Latitude and longitude must be numbers"),
        );
    };
    digipin::encode(lat, lon).map_or_else(
        || {
            (
                StatusCode::BAD_REQUEST,
                error_body("Coordinate is out of range"),
            )
        },
        |code| (StatusCode::OK, Json(serde_json::json!({ "digipin": code }))),
    )
}

/// `GET /api/digipin/decode?digipin`.
pub async fn decode(Query(query): Query<DecodeQuery>) -> impl IntoResponse {
    let Some(code) = query.digipin else {
        return (StatusCode::BAD_REQUEST, error_body("DIGIPIN is required"));
    };
    digipin::decode(&code).map_or_else(
        || (StatusCode::NOT_FOUND, error_body("Invalid DIGIPIN")),
        |(latitude, longitude)| {
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "latitude": latitude,
                    "longitude": longitude
                })),
            )
        },
    )
}

/// `POST /chat` -- proxy a farming question to the chat upstream.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    info!(language = %request.language, "chat request");
    match state.chat.reply(&request.message, &request.language).await {
        Ok(reply) => (StatusCode::OK, Json(serde_json::json!({ "reply": reply }))),
        Err(e) => {
            warn!(error = %e, "chat proxy failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(&e.to_string()),
            )
        }
    }
}
