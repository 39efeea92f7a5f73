use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

use super::AppError;

// ─── Domain types ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

/// Five-state alert lifecycle used by the triage subsystem.
/// (Network sensors use a simpler open/closed model — see `events`.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
    FalsePositive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub status: AlertStatus,
    /// Detection origin, e.g. "edr", "ids", "siem-correlation"
    pub source: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// MITRE ATT&CK tactic, e.g. "TA0006 Credential Access"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tactic: Option<String>,
    /// MITRE ATT&CK technique, e.g. "T1110 Brute Force"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAlertRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_severity")]
    pub severity: Severity,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub tactic: Option<String>,
    #[serde(default)]
    pub technique: Option<String>,
}

fn default_severity() -> Severity {
    Severity::Medium
}
fn default_source() -> String {
    "manual".into()
}

/// Optional `?severity=` / `?status=` query filters for the list view.
#[derive(Debug, Default, Deserialize)]
pub struct AlertFilter {
    pub severity: Option<Severity>,
    pub status: Option<AlertStatus>,
}

// ─── GET /api/alerts ─────────────────────────────────────────────

pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<AlertFilter>,
) -> Json<Vec<Alert>> {
    let mut alerts: Vec<Alert> = state
        .store
        .list_alerts()
        .into_iter()
        .filter(|a| filter.severity.map_or(true, |s| a.severity == s))
        .filter(|a| filter.status.map_or(true, |s| a.status == s))
        .collect();

    // Newest first — the dashboard shows a reverse-chronological feed
    alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Json(alerts)
}

// ─── GET /api/alerts/:id ─────────────────────────────────────────

pub async fn get_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Alert>, AppError> {
    state
        .store
        .get_alert(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("alert '{id}' not found")))
}

// ─── POST /api/alerts ────────────────────────────────────────────

pub async fn create_alert(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAlertRequest>,
) -> Result<Json<Alert>, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".into()));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let alert = Alert {
        id: format!("alr_{}", &uuid::Uuid::new_v4().to_string()[..8]),
        title: req.title,
        description: req.description,
        severity: req.severity,
        status: AlertStatus::Open,
        source: req.source,
        created_at: now.clone(),
        updated_at: now,
        assignee: req.assignee,
        tactic: req.tactic,
        technique: req.technique,
    };

    state.store.insert_alert(alert.clone());

    Ok(Json(alert))
}
