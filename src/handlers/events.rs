use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

use super::AppError;

// ─── Domain types ────────────────────────────────────────────────

/// Lifecycle of a network-sensor event. Deliberately NOT the same
/// model as `alerts::AlertStatus` — the sensor fleet only knows
/// whether an event is still firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Open,
    Closed,
}

/// Raw network alert as emitted by the perimeter sensors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkEvent {
    pub id: String,
    pub name: String,
    pub status: EventStatus,
    pub source_ip: String,
    pub dest_ip: String,
    pub protocol: String,
    pub detected_at: String,
}

// ─── GET /api/events ─────────────────────────────────────────────

pub async fn list_events(State(state): State<Arc<AppState>>) -> Json<Vec<NetworkEvent>> {
    let mut events = state.store.list_events();
    events.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
    Json(events)
}

// ─── GET /api/events/:id ─────────────────────────────────────────

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<NetworkEvent>, AppError> {
    state
        .store
        .get_event(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("event '{id}' not found")))
}
