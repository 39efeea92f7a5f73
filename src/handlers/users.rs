use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

use super::AppError;

// ─── Domain types ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<UserSettings>,
    pub created_at: String,
}

/// Per-analyst dashboard preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    pub theme: String,
    pub notifications: bool,
    pub dashboard_layout: String,
    pub timezone: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(default)]
    pub settings: Option<UserSettings>,
}

fn default_roles() -> Vec<String> {
    vec!["viewer".into()]
}

// ─── GET /api/users/:id ──────────────────────────────────────────

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    state
        .store
        .get_user(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("user '{id}' not found")))
}

// ─── POST /api/users ─────────────────────────────────────────────

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<User>, AppError> {
    if !req.email.contains('@') {
        return Err(AppError::BadRequest(format!(
            "'{}' is not a valid email address",
            req.email
        )));
    }

    let user = User {
        id: format!("usr_{}", &uuid::Uuid::new_v4().to_string()[..8]),
        name: req.name,
        email: req.email,
        roles: req.roles,
        permissions: req.permissions,
        settings: req.settings,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    state.store.insert_user(user.clone());

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsCollector;
    use crate::store::MemoryStore;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState {
            store: Arc::new(MemoryStore::new()),
            metrics: Arc::new(MetricsCollector::new()),
        })
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let state = test_state();

        let Json(created) = create_user(
            State(state.clone()),
            Json(CreateUserRequest {
                name: "Ada Okafor".into(),
                email: "ada.okafor@example.com".into(),
                roles: vec!["analyst".into(), "responder".into()],
                permissions: Some(vec!["alerts:write".into()]),
                settings: Some(UserSettings {
                    theme: "dark".into(),
                    notifications: true,
                    dashboard_layout: "grid".into(),
                    timezone: "Europe/London".into(),
                }),
            }),
        )
        .await
        .unwrap();

        let Json(fetched) = get_user(State(state), Path(created.id.clone())).await.unwrap();
        assert_eq!(fetched.email, "ada.okafor@example.com");
        assert_eq!(fetched.roles.len(), 2);
        assert_eq!(fetched.settings.unwrap().timezone, "Europe/London");
    }

    #[tokio::test]
    async fn create_rejects_invalid_email() {
        let result = create_user(
            State(test_state()),
            Json(CreateUserRequest {
                name: "No Email".into(),
                email: "not-an-address".into(),
                roles: default_roles(),
                permissions: None,
                settings: None,
            }),
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn defaults_apply_when_fields_are_omitted() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"name":"Min","email":"min@example.com"}"#).unwrap();
        assert_eq!(req.roles, vec!["viewer".to_string()]);
        assert!(req.permissions.is_none());
        assert!(req.settings.is_none());
    }
}
