pub mod collector;
pub mod percentiles;
pub mod stream;

pub use collector::{MetricsCollector, MetricsSnapshot};

/// A single request observation, pushed in by the timing middleware
/// once the response has been stamped.
#[derive(Debug, Clone)]
pub struct Sample {
    /// e.g. "GET /api/alerts/alr_000042"
    pub endpoint: String,
    /// HTTP status the response went out with
    pub status: u16,
    /// End-to-end pipeline latency in microseconds
    pub elapsed_us: u64,
    /// false when the response was a 4xx/5xx
    pub success: bool,
}

impl Sample {
    /// GET/HEAD traffic counts as a read, everything else as a write.
    pub fn is_read(&self) -> bool {
        self.endpoint.starts_with("GET ") || self.endpoint.starts_with("HEAD ")
    }
}
