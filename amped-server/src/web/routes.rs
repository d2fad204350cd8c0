//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use tracing::warn;

use crate::domain::{Coordinate, DomainError, StationId};
use crate::refresh::RefreshOutcome;
use crate::walking::{WalkingError, format_minutes};

use super::dto::*;
use super::state::AppState;
use super::templates::IndexTemplate;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/refresh", post(refresh_page))
        .route("/health", get(health))
        .route("/api/snapshot", get(snapshot))
        .route("/api/refresh", post(refresh))
        .route("/api/stations/:id/walk", get(walking_time))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Status page.
async fn index_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let snapshot = state.publisher().current();
    let page = IndexTemplate::from_snapshot(&snapshot, state.show_empty_stations)
        .render()
        .map_err(|e| AppError::Internal {
            message: format!("template error: {e}"),
        })?;
    Ok(Html(page))
}

/// Current published snapshot.
async fn snapshot(
    State(state): State<AppState>,
    Query(query): Query<SnapshotQuery>,
) -> Json<SnapshotResponse> {
    let show_empty = query.show_empty.unwrap_or(state.show_empty_stations);
    let snapshot = state.publisher().current();
    Json(SnapshotResponse::from_snapshot(&snapshot, show_empty))
}

/// Refresh button on the status page; sends the browser back to `/`.
async fn refresh_page(State(state): State<AppState>) -> Result<Redirect, AppError> {
    user_refresh(&state).await?;
    Ok(Redirect::to("/"))
}

/// User-triggered refresh.
///
/// Waits for the cycle (including the minimum loading display) and reports
/// what happened. A failed fetch is a 502; the previous snapshot is kept.
async fn refresh(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<RefreshResponse>), AppError> {
    let outcome = user_refresh(&state).await?;
    let status = match outcome {
        RefreshOutcome::Failed(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    Ok((status, Json(outcome.into())))
}

/// Run a non-silent refresh on its own task.
///
/// The cycle finishes even if the client disconnects and the request
/// future is dropped.
async fn user_refresh(state: &AppState) -> Result<RefreshOutcome, AppError> {
    let coordinator = state.coordinator.clone();
    tokio::spawn(async move { coordinator.refresh(false).await })
        .await
        .map_err(|e| AppError::Internal {
            message: format!("refresh task failed: {e}"),
        })
}

/// Walking time from the caller's location to a station.
async fn walking_time(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<WalkQuery>,
) -> Result<Json<WalkResponse>, AppError> {
    let id = StationId::parse(&id)?;

    // A missing or nonsensical location both mean "location unavailable".
    let origin = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => Coordinate::new(lat, lng).ok(),
        _ => None,
    };

    let snapshot = state.publisher().current();
    let duration = state.walking.lookup(origin, &snapshot, &id).await?;

    Ok(Json(WalkResponse {
        station_id: id.to_string(),
        seconds: duration.as_secs(),
        minutes: format_minutes(duration),
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<WalkingError> for AppError {
    fn from(e: WalkingError) -> Self {
        match e {
            WalkingError::NoLocation => AppError::BadRequest {
                message: e.to_string(),
            },
            WalkingError::UnknownStation(_) => AppError::NotFound {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
        };

        warn!(status = %status, "{message}");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
