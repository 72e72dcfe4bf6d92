//! HTTP API
//!
//! | Route         | Behavior                                    |
//! |---------------|---------------------------------------------|
//! | `POST /pet`   | Run the pick gesture, `204` when done       |
//! | `GET /health` | Liveness, always `true`                     |
//! | anything else | Static front-end from the configured dir    |

use std::path::Path;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use petarm_core::PickRequest;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::channels::{ArmHandle, PickError};

/// Build the application router
pub fn router(arm: ArmHandle, static_dir: &Path) -> Router {
    let static_files = ServeDir::new(static_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/pet", post(pet))
        .route("/health", get(health))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .with_state(arm)
}

/// Run one pick gesture; answers once the arm has finished moving
async fn pet(
    State(arm): State<ArmHandle>,
    Json(request): Json<PickRequest>,
) -> Result<StatusCode, PickError> {
    info!("Pet request start={} end={}", request.start, request.end);
    arm.pick(request).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn health() -> Json<bool> {
    Json(true)
}

impl IntoResponse for PickError {
    fn into_response(self) -> Response {
        warn!("Pet request failed: {}", self);
        let status = match self {
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Fault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
