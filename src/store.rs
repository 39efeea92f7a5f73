use parking_lot::RwLock;
use std::collections::HashMap;

use crate::handlers::alerts::Alert;
use crate::handlers::events::NetworkEvent;
use crate::handlers::users::User;

/// In-memory data store backing the API.
///
/// Three independent maps, one per resource, each behind its own
/// `RwLock` so a burst of alert reads never contends with user writes.
/// All data lives for the lifetime of the process — there is no
/// persistence layer, the store is reseeded on every start.
pub struct MemoryStore {
    alerts: RwLock<HashMap<String, Alert>>,
    events: RwLock<HashMap<String, NetworkEvent>>,
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            alerts: RwLock::new(HashMap::new()),
            events: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
        }
    }

    // ── Alerts ──────────────────────────────────────────────────

    pub fn get_alert(&self, id: &str) -> Option<Alert> {
        self.alerts.read().get(id).cloned()
    }

    pub fn insert_alert(&self, alert: Alert) {
        self.alerts.write().insert(alert.id.clone(), alert);
    }

    pub fn list_alerts(&self) -> Vec<Alert> {
        self.alerts.read().values().cloned().collect()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.read().len()
    }

    // ── Network events ──────────────────────────────────────────

    pub fn get_event(&self, id: &str) -> Option<NetworkEvent> {
        self.events.read().get(id).cloned()
    }

    pub fn insert_event(&self, event: NetworkEvent) {
        self.events.write().insert(event.id.clone(), event);
    }

    pub fn list_events(&self) -> Vec<NetworkEvent> {
        self.events.read().values().cloned().collect()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    // ── Users ───────────────────────────────────────────────────

    pub fn get_user(&self, id: &str) -> Option<User> {
        self.users.read().get(id).cloned()
    }

    pub fn insert_user(&self, user: User) {
        self.users.write().insert(user.id.clone(), user);
    }

    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::alerts::{AlertStatus, Severity};

    #[test]
    fn insert_overwrites_same_id() {
        let store = MemoryStore::new();
        let mut alert = Alert {
            id: "alr_dup".into(),
            title: "first".into(),
            description: String::new(),
            severity: Severity::Low,
            status: AlertStatus::Open,
            source: "ids".into(),
            created_at: "2026-08-01T00:00:00+00:00".into(),
            updated_at: "2026-08-01T00:00:00+00:00".into(),
            assignee: None,
            tactic: None,
            technique: None,
        };
        store.insert_alert(alert.clone());
        alert.title = "second".into();
        store.insert_alert(alert);

        assert_eq!(store.alert_count(), 1);
        assert_eq!(store.get_alert("alr_dup").unwrap().title, "second");
    }
}
