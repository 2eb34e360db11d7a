//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::error;

use crate::db;
use crate::errors::IndexerError;
use crate::events::EventRecord;

pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const MAX_PAGE_SIZE: i64 = 500;

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl EventsQuery {
    /// `(limit, offset)` clamped to `[1, MAX_PAGE_SIZE]` and `>= 0`.
    pub fn page(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[derive(Serialize)]
pub struct SubjectEventsResponse {
    pub subject: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct EventsPageResponse {
    pub count: usize,
    pub limit: i64,
    pub offset: i64,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn internal_error(e: IndexerError) -> Response {
    error!("API query failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

fn subject_response(
    subject: String,
    result: crate::errors::Result<Vec<EventRecord>>,
) -> Response {
    match result {
        Ok(events) => {
            let count = events.len();
            (
                StatusCode::OK,
                Json(SubjectEventsResponse {
                    subject,
                    count,
                    events,
                }),
            )
                .into_response()
        }
        Err(e) => internal_error(e),
    }
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events?type=&limit=&offset=`
///
/// Returns a page of indexed events, optionally of one type.
pub async fn get_events(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<EventsQuery>,
) -> Response {
    let (limit, offset) = query.page();
    match db::get_events(&state.pool, query.event_type.as_deref(), limit, offset).await {
        Ok(events) => (
            StatusCode::OK,
            Json(EventsPageResponse {
                count: events.len(),
                limit,
                offset,
                events,
            }),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

/// `GET /entries/:key/events`
///
/// Lifecycle of a registry entry plus every record created against it.
pub async fn get_entry_events(
    State(state): State<Arc<ApiState>>,
    Path(key): Path<String>,
) -> Response {
    let result = db::get_events_for_entry(&state.pool, &key).await;
    subject_response(key, result)
}

/// `GET /records/:id/events`
pub async fn get_record_events(
    State(state): State<Arc<ApiState>>,
    Path(record_id): Path<u64>,
) -> Response {
    let result = db::get_events_for_record(&state.pool, record_id).await;
    subject_response(record_id.to_string(), result)
}

/// `GET /accounts/:address/events`
pub async fn get_account_events(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> Response {
    let result = db::get_events_for_account(&state.pool, &address).await;
    subject_response(address, result)
}
