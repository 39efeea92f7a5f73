use std::collections::VecDeque;
use std::time::Instant;

use hdrhistogram::Histogram;
use parking_lot::Mutex;
use serde::Serialize;

use super::percentiles::PercentileSet;
use super::Sample;

// ─── Configuration ───────────────────────────────────────────────

/// How many individual request records we keep for the live feed
const MAX_RECENT_SAMPLES: usize = 200;

/// Aggregate timeline resolution (one point per window)
const TIMELINE_WINDOW_MS: u64 = 500;

/// HdrHistogram range: 1 μs → 60 s, 3 significant figures
const HIST_LOW: u64 = 1;
const HIST_HIGH: u64 = 60_000_000;
const HIST_SIGFIG: u8 = 3;

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe latency engine.
/// The timing middleware calls `record()`, the SSE stream calls `snapshot()`.
pub struct MetricsCollector {
    inner: Mutex<Inner>,
}

/// A single entry in the live request feed.
#[derive(Debug, Clone, Serialize)]
pub struct SampleRecord {
    pub timestamp_ms: u64,
    pub endpoint: String,
    pub status: u16,
    pub elapsed_us: u64,
    pub success: bool,
}

/// One aggregated point on the timeline chart (per 500 ms window).
#[derive(Debug, Clone, Serialize)]
pub struct TimelinePoint {
    pub timestamp_ms: u64,
    pub avg_elapsed_us: f64,
    pub count: u64,
}

/// A bucket in the latency distribution histogram.
#[derive(Debug, Clone, Serialize)]
pub struct DistBucket {
    pub range_start_us: u64,
    pub range_end_us: u64,
    pub count: u64,
}

/// Complete snapshot shipped to the dashboard on every SSE tick.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    // Percentile breakdowns per traffic class
    pub reads: PercentileSet,
    pub writes: PercentileSet,
    pub e2e: PercentileSet,

    // Counters
    pub total_requests: u64,
    pub total_errors: u64,
    pub status_2xx: u64,
    pub status_4xx: u64,
    pub status_5xx: u64,
    pub requests_per_sec: f64,
    pub elapsed_secs: f64,

    // Visual data
    pub recent_samples: Vec<SampleRecord>,
    pub timeline: Vec<TimelinePoint>,
    pub distribution: Vec<DistBucket>,
}

// ─── Internal state ──────────────────────────────────────────────

struct Inner {
    // One HdrHistogram per traffic class
    read_hist: Histogram<u64>,
    write_hist: Histogram<u64>,
    e2e_hist: Histogram<u64>,

    // Counters
    total_requests: u64,
    total_errors: u64,
    status_2xx: u64,
    status_4xx: u64,
    status_5xx: u64,

    // Rolling window of recent individual requests
    recent_samples: VecDeque<SampleRecord>,

    // Timeline aggregation
    timeline: Vec<TimelinePoint>,
    current_window: Option<WindowAccumulator>,

    // Wall-clock anchor for elapsed time
    start_time: Option<Instant>,
}

/// Running totals for the current 500 ms timeline window.
struct WindowAccumulator {
    window_start_ms: u64,
    elapsed_sum: u64,
    count: u64,
}

// ─── MetricsCollector impl ───────────────────────────────────────

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::new()),
        }
    }

    /// Record a single request observation. Called from the timing middleware.
    pub fn record(&self, sample: Sample) {
        self.inner.lock().record(sample);
    }

    /// Produce a read-only snapshot for the dashboard.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().snapshot()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Inner impl ──────────────────────────────────────────────────

impl Inner {
    fn new() -> Self {
        Self {
            read_hist: Histogram::<u64>::new_with_bounds(HIST_LOW, HIST_HIGH, HIST_SIGFIG)
                .expect("histogram creation"),
            write_hist: Histogram::<u64>::new_with_bounds(HIST_LOW, HIST_HIGH, HIST_SIGFIG)
                .expect("histogram creation"),
            e2e_hist: Histogram::<u64>::new_with_bounds(HIST_LOW, HIST_HIGH, HIST_SIGFIG)
                .expect("histogram creation"),
            total_requests: 0,
            total_errors: 0,
            status_2xx: 0,
            status_4xx: 0,
            status_5xx: 0,
            recent_samples: VecDeque::with_capacity(MAX_RECENT_SAMPLES + 1),
            timeline: Vec::with_capacity(1024),
            current_window: None,
            start_time: None,
        }
    }

    fn record(&mut self, sample: Sample) {
        // Lazily set the anchor on the very first sample
        let start = *self.start_time.get_or_insert_with(Instant::now);
        let elapsed_ms = start.elapsed().as_millis() as u64;

        // ── Counters ────────────────────────────────────────────
        self.total_requests += 1;
        if !sample.success {
            self.total_errors += 1;
        }
        match sample.status {
            200..=299 => self.status_2xx += 1,
            400..=499 => self.status_4xx += 1,
            500..=599 => self.status_5xx += 1,
            _ => {}
        }

        // ── Histograms (clamp to ≥ 1 μs) ───────────────────────
        let elapsed_us = sample.elapsed_us.max(1);

        if sample.is_read() {
            let _ = self.read_hist.record(elapsed_us);
        } else {
            let _ = self.write_hist.record(elapsed_us);
        }
        let _ = self.e2e_hist.record(elapsed_us);

        // ── Timeline aggregation ────────────────────────────────
        self.push_to_timeline(elapsed_ms, elapsed_us);

        // ── Live request feed ───────────────────────────────────
        self.recent_samples.push_back(SampleRecord {
            timestamp_ms: elapsed_ms,
            endpoint: sample.endpoint,
            status: sample.status,
            elapsed_us: sample.elapsed_us,
            success: sample.success,
        });
        if self.recent_samples.len() > MAX_RECENT_SAMPLES {
            self.recent_samples.pop_front();
        }
    }

    /// Bucket the sample into the current 500 ms window, or roll over.
    fn push_to_timeline(&mut self, elapsed_ms: u64, elapsed_us: u64) {
        let window_start = (elapsed_ms / TIMELINE_WINDOW_MS) * TIMELINE_WINDOW_MS;

        match &mut self.current_window {
            // Same window — accumulate
            Some(w) if w.window_start_ms == window_start => {
                w.elapsed_sum += elapsed_us;
                w.count += 1;
            }
            // New window — finalize the old one, start fresh
            Some(_) => {
                let old = self.current_window.take().unwrap();
                self.finalize_window(old);
                self.current_window = Some(WindowAccumulator {
                    window_start_ms: window_start,
                    elapsed_sum: elapsed_us,
                    count: 1,
                });
            }
            // Very first sample
            None => {
                self.current_window = Some(WindowAccumulator {
                    window_start_ms: window_start,
                    elapsed_sum: elapsed_us,
                    count: 1,
                });
            }
        }
    }

    fn finalize_window(&mut self, w: WindowAccumulator) {
        if w.count == 0 {
            return;
        }
        self.timeline.push(TimelinePoint {
            timestamp_ms: w.window_start_ms,
            avg_elapsed_us: w.elapsed_sum as f64 / w.count as f64,
            count: w.count,
        });
    }

    /// Build a complete read-only snapshot for the SSE stream.
    fn snapshot(&self) -> MetricsSnapshot {
        let elapsed_secs = self
            .start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);

        let rps = if elapsed_secs > 0.0 {
            self.total_requests as f64 / elapsed_secs
        } else {
            0.0
        };

        // Include the current (partial) window in the timeline
        let mut timeline = self.timeline.clone();
        if let Some(w) = &self.current_window {
            if w.count > 0 {
                timeline.push(TimelinePoint {
                    timestamp_ms: w.window_start_ms,
                    avg_elapsed_us: w.elapsed_sum as f64 / w.count as f64,
                    count: w.count,
                });
            }
        }

        MetricsSnapshot {
            reads: PercentileSet::from_histogram(&self.read_hist),
            writes: PercentileSet::from_histogram(&self.write_hist),
            e2e: PercentileSet::from_histogram(&self.e2e_hist),

            total_requests: self.total_requests,
            total_errors: self.total_errors,
            status_2xx: self.status_2xx,
            status_4xx: self.status_4xx,
            status_5xx: self.status_5xx,
            requests_per_sec: rps,
            elapsed_secs,

            recent_samples: self.recent_samples.iter().cloned().collect(),
            timeline,
            distribution: Self::compute_distribution(&self.e2e_hist),
        }
    }

    // ── Distribution histogram for the bar chart ────────────────

    /// Pre-defined bucket boundaries (μs).  Covers the typical
    /// in-process handler latency range with good resolution.
    const DIST_BOUNDARIES: &'static [u64] = &[
        25, 50, 100, 150, 200, 300, 400, 500, 750, 1_000, 1_500, 2_000, 3_000, 5_000, 10_000,
        50_000,
    ];

    fn compute_distribution(hist: &Histogram<u64>) -> Vec<DistBucket> {
        if hist.len() == 0 {
            return Vec::new();
        }

        let bounds = Self::DIST_BOUNDARIES;
        let num_buckets = bounds.len() + 1; // +1 for overflow
        let mut counts = vec![0u64; num_buckets];

        // Walk every recorded value in the histogram and bucket it
        for iv in hist.iter_recorded() {
            let val = iv.value_iterated_to();
            let cnt = iv.count_at_value();

            // binary_search gives us the first boundary >= val
            let idx = match bounds.binary_search(&val) {
                Ok(i) => i,  // val == boundary  → bucket i
                Err(i) => i, // val < boundary[i] → bucket i
            };
            let idx = idx.min(bounds.len()); // clamp for overflow
            counts[idx] += cnt;
        }

        // Convert to output structs, skipping empty buckets
        let mut result = Vec::with_capacity(num_buckets);
        let mut prev = 0u64;
        for (i, &boundary) in bounds.iter().enumerate() {
            if counts[i] > 0 {
                result.push(DistBucket {
                    range_start_us: prev,
                    range_end_us: boundary,
                    count: counts[i],
                });
            }
            prev = boundary;
        }
        // Overflow bucket
        if counts[bounds.len()] > 0 {
            result.push(DistBucket {
                range_start_us: *bounds.last().unwrap(),
                range_end_us: hist.max(),
                count: counts[bounds.len()],
            });
        }

        result
    }
}
