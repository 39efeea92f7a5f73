use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::time::Instant;

use crate::handlers::alerts::{Alert, AlertStatus, Severity};
use crate::handlers::events::{EventStatus, NetworkEvent};
use crate::handlers::users::{User, UserSettings};
use crate::store::MemoryStore;

// ─── Constants ───────────────────────────────────────────────────

const NUM_ALERTS: usize = 200;
const NUM_EVENTS: usize = 150;
const NUM_USERS: usize = 25;

// ─── Data pools ──────────────────────────────────────────────────

static ALERT_TITLES: &[&str] = &[
    "Brute-force authentication burst",
    "Beaconing to known C2 domain",
    "Suspicious PowerShell encoded command",
    "Impossible travel login",
    "Privilege escalation via service account",
    "Outbound data transfer anomaly",
    "Malware signature match on endpoint",
    "Disabled audit logging detected",
    "New admin account created outside change window",
    "Lateral movement via SMB",
    "DNS tunnelling pattern detected",
    "Phishing link clicked by user",
];

static SOURCES: &[&str] = &["edr", "ids", "siem-correlation", "dlp", "email-gateway"];

/// MITRE ATT&CK tactic/technique pairs attached to roughly half the alerts.
static MITRE: &[(&str, &str)] = &[
    ("TA0001 Initial Access", "T1566 Phishing"),
    ("TA0002 Execution", "T1059 Command and Scripting Interpreter"),
    ("TA0004 Privilege Escalation", "T1078 Valid Accounts"),
    ("TA0006 Credential Access", "T1110 Brute Force"),
    ("TA0008 Lateral Movement", "T1021 Remote Services"),
    ("TA0010 Exfiltration", "T1048 Exfiltration Over Alternative Protocol"),
    ("TA0011 Command and Control", "T1071 Application Layer Protocol"),
];

static SEVERITIES: &[Severity] = &[
    Severity::Critical,
    Severity::High,
    Severity::Medium,
    Severity::Low,
    Severity::Info,
];

static STATUSES: &[AlertStatus] = &[
    AlertStatus::Open,
    AlertStatus::InProgress,
    AlertStatus::Resolved,
    AlertStatus::Closed,
    AlertStatus::FalsePositive,
];

static EVENT_NAMES: &[&str] = &[
    "Port scan",
    "SYN flood",
    "SSH bruteforce",
    "TLS certificate mismatch",
    "ICMP sweep",
    "Unexpected egress on high port",
];

static PROTOCOLS: &[&str] = &["tcp", "udp", "icmp"];

// ASCII-only so the derived email local parts stay plain
static FIRST: &[&str] = &[
    "Ada", "Marcus", "Priya", "Tomas", "Yuki", "Leila", "Dmitri", "Sofia", "Kwame", "Ingrid",
    "Rafael", "Mei", "Oscar", "Amara", "Jonas",
];

static LAST: &[&str] = &[
    "Okafor", "Lindqvist", "Sharma", "Costa", "Tanaka", "Haddad", "Volkov", "Moretti", "Mensah",
    "Berg", "Silva", "Chen", "Nilsen", "Diallo", "Weber",
];

static ROLES: &[&str] = &["admin", "analyst", "responder", "viewer"];

// ─── Public entry point ──────────────────────────────────────────

pub fn seed(store: &MemoryStore) {
    let start = Instant::now();
    println!(
        "Seeding {} alerts, {} network events, {} users...",
        NUM_ALERTS, NUM_EVENTS, NUM_USERS
    );

    // Deterministic RNG so re-runs produce the same data.
    let mut rng = StdRng::seed_from_u64(42);

    seed_alerts(store, &mut rng);
    seed_events(store, &mut rng);
    seed_users(store, &mut rng);

    println!(
        "   ✓ seed complete in {:.0}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );
}

// ─── Alerts ──────────────────────────────────────────────────────

fn seed_alerts(store: &MemoryStore, rng: &mut StdRng) {
    let anchor = Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap();

    for i in 0..NUM_ALERTS {
        let id = format!("alr_{:06}", i + 1);
        let title = ALERT_TITLES[rng.gen_range(0..ALERT_TITLES.len())];
        let severity = SEVERITIES[rng.gen_range(0..SEVERITIES.len())];
        let status = STATUSES[rng.gen_range(0..STATUSES.len())];
        let source = SOURCES[rng.gen_range(0..SOURCES.len())];

        // One distinct minute per alert keeps the feed ordering stable
        let created = anchor - Duration::minutes(i as i64 * 7);
        let updated = created + Duration::minutes(rng.gen_range(1..=180));

        let (tactic, technique) = if rng.gen_bool(0.5) {
            let pair = MITRE[rng.gen_range(0..MITRE.len())];
            (Some(pair.0.to_string()), Some(pair.1.to_string()))
        } else {
            (None, None)
        };

        let assignee = match status {
            AlertStatus::Open => None,
            _ => Some(analyst_handle(rng)),
        };

        store.insert_alert(Alert {
            id,
            title: title.into(),
            description: format!(
                "{} observed on host ws-{:03}. Raised by {}.",
                title,
                rng.gen_range(1..=400u32),
                source,
            ),
            severity,
            status,
            source: source.into(),
            created_at: created.to_rfc3339(),
            updated_at: updated.to_rfc3339(),
            assignee,
            tactic,
            technique,
        });
    }
}

// ─── Network events ──────────────────────────────────────────────

fn seed_events(store: &MemoryStore, rng: &mut StdRng) {
    let anchor = Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap();

    for i in 0..NUM_EVENTS {
        let id = format!("evt_{:06}", i + 1);
        let name = EVENT_NAMES[rng.gen_range(0..EVENT_NAMES.len())];
        let status = if rng.gen_bool(0.3) {
            EventStatus::Open
        } else {
            EventStatus::Closed
        };

        store.insert_event(NetworkEvent {
            id,
            name: name.into(),
            status,
            source_ip: format!(
                "203.0.113.{}",
                rng.gen_range(1u8..=254),
            ),
            dest_ip: format!(
                "10.0.{}.{}",
                rng.gen_range(0u8..=255),
                rng.gen_range(1u8..=254),
            ),
            protocol: PROTOCOLS[rng.gen_range(0..PROTOCOLS.len())].into(),
            detected_at: (anchor - Duration::minutes(i as i64 * 3)).to_rfc3339(),
        });
    }
}

// ─── Users ───────────────────────────────────────────────────────

fn seed_users(store: &MemoryStore, rng: &mut StdRng) {
    for i in 0..NUM_USERS {
        let id = format!("usr_{:06}", i + 1);
        let first = FIRST[rng.gen_range(0..FIRST.len())];
        let last = LAST[rng.gen_range(0..LAST.len())];
        let role = ROLES[rng.gen_range(0..ROLES.len())];

        let permissions = match role {
            "admin" => Some(vec!["alerts:write".into(), "users:write".into()]),
            "responder" => Some(vec!["alerts:write".into()]),
            _ => None,
        };

        let settings = if rng.gen_bool(0.7) {
            Some(UserSettings {
                theme: if rng.gen_bool(0.5) { "dark" } else { "light" }.into(),
                notifications: rng.gen_bool(0.7),
                dashboard_layout: if rng.gen_bool(0.5) { "grid" } else { "list" }.into(),
                timezone: "UTC".into(),
            })
        } else {
            None
        };

        store.insert_user(User {
            id,
            name: format!("{} {}", first, last),
            email: format!(
                "{}.{}{}@example.com",
                first.to_lowercase(),
                last.to_lowercase(),
                i + 1,
            ),
            roles: vec![role.into()],
            permissions,
            settings,
            created_at: "2026-01-15T09:23:11+00:00".into(),
        });
    }
}

fn analyst_handle(rng: &mut StdRng) -> String {
    let first = FIRST[rng.gen_range(0..FIRST.len())];
    let last = LAST[rng.gen_range(0..LAST.len())];
    format!("{}.{}", first.to_lowercase(), last.to_lowercase())
}
