use std::sync::Arc;

mod handlers;
mod metrics;
mod middleware;
mod mock_data;
mod server;
mod store;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// In-memory alert/event/user store, seeded at startup.
    pub store: Arc<store::MemoryStore>,

    /// Central latency engine — the timing middleware pushes samples,
    /// SSE reads snapshots.
    pub metrics: Arc<metrics::MetricsCollector>,
}

#[tokio::main]
async fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════╗");
    println!("║   🛡  SECURITY OPERATIONS DASHBOARD              ║");
    println!("╚══════════════════════════════════════════════════╝");
    println!();

    // ── 1. Build & seed the in-memory store ─────────────────────
    let store = Arc::new(store::MemoryStore::new());
    mock_data::seed(&store);
    println!(
        "   {} alerts / {} events / {} users loaded",
        store.alert_count(),
        store.event_count(),
        store.user_count(),
    );

    // ── 2. Build shared state ────────────────────────────────────
    let state = Arc::new(AppState {
        store,
        metrics: Arc::new(metrics::MetricsCollector::new()),
    });

    // ── 3. Build Axum router ─────────────────────────────────────
    let app = server::create_router(state);

    // ── 4. Bind & serve ──────────────────────────────────────────
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to port 3000 — is it already in use?");

    println!();
    println!("Server listening on http://localhost:3000");
    println!("Dashboard       → http://localhost:3000");
    println!("Alert feed      → http://localhost:3000/api/alerts");
    println!("Metrics SSE     → http://localhost:3000/api/metrics/stream");
    println!("Metrics JSON    → http://localhost:3000/api/metrics");
    println!();

    axum::serve(listener, app)
        .await
        .expect("Server exited with error");
}
