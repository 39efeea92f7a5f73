use axum::{extract::{Request, State}, middleware::Next, response::Response};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::metrics::Sample;
use crate::AppState;

/// Header carrying the pipeline-internal processing latency,
/// e.g. `X-Response-Time: 12.34ms`.
pub const RESPONSE_TIME_HEADER: &str = "X-Response-Time";

/// Latency recorder middleware.
///
/// Captures a monotonic timestamp when the request enters the pipeline,
/// and once the downstream handler chain has produced the response —
/// strictly before Axum hands it to the transport — stamps the elapsed
/// time onto it as `X-Response-Time`.
///
/// Pure pass-through: status, body, and all other headers come back
/// untouched, and nothing here can fail a request. If the connection is
/// aborted mid-flight this future is simply dropped and no header is
/// ever written.
pub async fn timing_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let start = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = start.elapsed();

    // ── Inject response header (fail-silent) ────────────────────
    if let Ok(val) = format_elapsed(elapsed).parse() {
        response.headers_mut().insert(RESPONSE_TIME_HEADER, val);
    }

    // ── Feed the metrics engine ─────────────────────────────────
    let status = response.status().as_u16();
    state.metrics.record(Sample {
        endpoint: format!("{method} {path}"),
        status,
        elapsed_us: elapsed.as_micros() as u64,
        success: status < 400,
    });

    // ── Console log ─────────────────────────────────────────────
    let colour = match status {
        200..=299 => "\x1b[32m", // green
        400..=499 => "\x1b[33m", // yellow
        _ => "\x1b[31m",        // red
    };
    // Skip noisy static-file / SSE requests
    if path.starts_with("/api/") && !path.contains("/stream") {
        println!(
            "  {colour}{status}\x1b[0m  {method:<5} {path:<35} {:>9}",
            format_elapsed(elapsed),
        );
    }

    response
}

/// Renders an elapsed duration as `D.DDms` — exactly two fractional
/// digits, round-half-up over the microsecond count. Integer arithmetic
/// so ties (x.xx5 ms) land exactly, never skewed by float representation.
pub fn format_elapsed(elapsed: Duration) -> String {
    let hundredths = (elapsed.as_micros() as u64 + 5) / 10;
    format!("{}.{:02}ms", hundredths / 100, hundredths % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsCollector;
    use crate::store::MemoryStore;
    use axum::{
        body::Body,
        http::{HeaderValue, Request as HttpRequest, StatusCode},
        middleware as axum_mw,
        routing::get,
        Router,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState {
            store: Arc::new(MemoryStore::new()),
            metrics: Arc::new(MetricsCollector::new()),
        })
    }

    fn test_app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/ok", get(|| async { "all good" }))
            .route(
                "/teapot",
                get(|| async {
                    (
                        StatusCode::IM_A_TEAPOT,
                        [("x-custom", "kept")],
                        "short and stout",
                    )
                }),
            )
            .layer(axum_mw::from_fn_with_state(state, timing_middleware))
    }

    /// `^\d+\.\d{2}ms$` without pulling in a regex crate.
    fn assert_valid_header(value: &HeaderValue) {
        let v = value.to_str().expect("header should be ascii");
        let num = v.strip_suffix("ms").expect("should end in 'ms'");
        let (whole, frac) = num.split_once('.').expect("should contain a dot");
        assert!(!whole.is_empty() && whole.bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(frac.len(), 2, "exactly two fractional digits: {v}");
        assert!(frac.bytes().all(|b| b.is_ascii_digit()));
    }

    #[tokio::test]
    async fn stamps_completed_responses() {
        let state = test_state();
        let app = test_app(state.clone());

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/ok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let values: Vec<_> = response
            .headers()
            .get_all(RESPONSE_TIME_HEADER)
            .iter()
            .collect();
        assert_eq!(values.len(), 1, "exactly one X-Response-Time header");
        assert_valid_header(values[0]);

        let snap = state.metrics.snapshot();
        assert_eq!(snap.total_requests, 1);
        assert_eq!(snap.total_errors, 0);
    }

    #[tokio::test]
    async fn passes_status_body_and_headers_through() {
        let app = test_app(test_state());

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/teapot")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(response.headers().get("x-custom").unwrap(), "kept");
        assert_valid_header(response.headers().get(RESPONSE_TIME_HEADER).unwrap());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"short and stout");
    }

    #[tokio::test]
    async fn stamps_framework_level_404s_too() {
        let state = test_state();
        let app = test_app(state.clone());

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_valid_header(response.headers().get(RESPONSE_TIME_HEADER).unwrap());
        assert_eq!(state.metrics.snapshot().total_errors, 1);
    }

    #[tokio::test]
    async fn aborted_requests_record_nothing() {
        let state = test_state();
        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    "too late"
                }),
            )
            .layer(axum_mw::from_fn_with_state(state.clone(), timing_middleware));

        // Dropping the in-flight future models a client abort: the
        // completion point is never reached, so no header is written
        // and no sample lands in the collector.
        let aborted = tokio::time::timeout(
            Duration::from_millis(20),
            app.oneshot(
                HttpRequest::builder()
                    .uri("/slow")
                    .body(Body::empty())
                    .unwrap(),
            ),
        )
        .await;

        assert!(aborted.is_err(), "request should have been cut short");
        assert_eq!(state.metrics.snapshot().total_requests, 0);
    }

    #[test]
    fn formats_with_two_fractional_digits() {
        assert_eq!(format_elapsed(Duration::from_micros(0)), "0.00ms");
        assert_eq!(format_elapsed(Duration::from_micros(120)), "0.12ms");
        assert_eq!(format_elapsed(Duration::from_micros(10_500)), "10.50ms");
        assert_eq!(format_elapsed(Duration::from_millis(145)), "145.00ms");
    }

    #[test]
    fn rounds_half_up_on_microseconds() {
        // 7.004 ms rounds down, 1000.005 ms is a tie and rounds up
        assert_eq!(format_elapsed(Duration::from_micros(7_004)), "7.00ms");
        assert_eq!(format_elapsed(Duration::from_micros(1_000_005)), "1000.01ms");
        // more ties
        assert_eq!(format_elapsed(Duration::from_micros(5)), "0.01ms");
        assert_eq!(format_elapsed(Duration::from_micros(7_005)), "7.01ms");
        assert_eq!(format_elapsed(Duration::from_micros(9_995)), "10.00ms");
    }

    #[test]
    fn re_stamping_overwrites_instead_of_erroring() {
        // HeaderMap::insert is the idempotence guarantee: a second set
        // for the same request replaces the value, it never duplicates.
        let mut headers = axum::http::HeaderMap::new();
        let first: HeaderValue = format_elapsed(Duration::from_micros(120)).parse().unwrap();
        let second: HeaderValue = format_elapsed(Duration::from_micros(120)).parse().unwrap();
        headers.insert(RESPONSE_TIME_HEADER, first);
        headers.insert(RESPONSE_TIME_HEADER, second);
        assert_eq!(headers.get_all(RESPONSE_TIME_HEADER).iter().count(), 1);
        assert_eq!(headers.get(RESPONSE_TIME_HEADER).unwrap(), "0.12ms");
    }
}
