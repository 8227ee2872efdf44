//! Per-route request counters and latency histograms, exposed on
//! `GET /metrics` in the Prometheus text format.

use axum::http::StatusCode;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Mutex;
use std::time::Duration;

/// Upper bounds of the latency histogram, in seconds.
pub const LATENCY_BUCKETS_SECS: [f64; 10] =
    [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 10.0];

#[derive(Debug, Default, Clone, Copy)]
struct RouteMetrics {
    requests: u64,
    errors: u64,
    /// Cumulative: slot `i` counts requests at or under `LATENCY_BUCKETS_SECS[i]`
    buckets: [u64; LATENCY_BUCKETS_SECS.len()],
    latency_sum_secs: f64,
}

/// Request and error counts for one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteCounts {
    pub requests: u64,
    pub errors: u64,
}

#[derive(Debug, Default)]
pub struct GatewayMetrics {
    routes: Mutex<BTreeMap<&'static str, RouteMetrics>>,
}

impl GatewayMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished request. Any 4xx or 5xx status counts as an error.
    pub fn record(&self, route: &'static str, status: StatusCode, elapsed: Duration) {
        let Ok(mut routes) = self.routes.lock() else {
            return;
        };
        let entry = routes.entry(route).or_default();
        entry.requests = entry.requests.saturating_add(1);
        if status.is_client_error() || status.is_server_error() {
            entry.errors = entry.errors.saturating_add(1);
        }
        let secs = elapsed.as_secs_f64();
        entry.latency_sum_secs += secs;
        for (slot, bound) in entry.buckets.iter_mut().zip(LATENCY_BUCKETS_SECS) {
            if secs <= bound {
                *slot = slot.saturating_add(1);
            }
        }
    }

    pub fn counts(&self, route: &str) -> Option<RouteCounts> {
        let routes = self.routes.lock().ok()?;
        routes.get(route).map(|m| RouteCounts {
            requests: m.requests,
            errors: m.errors,
        })
    }

    /// Prometheus text exposition of every route seen so far.
    pub fn render(&self) -> String {
        let routes = self
            .routes
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        let mut out = String::new();

        let _ = writeln!(out, "# HELP chainpilot_http_requests_total Requests handled, by route.");
        let _ = writeln!(out, "# TYPE chainpilot_http_requests_total counter");
        for (route, m) in &routes {
            let _ = writeln!(out, "chainpilot_http_requests_total{{route=\"{route}\"}} {}", m.requests);
        }

        let _ = writeln!(
            out,
            "# HELP chainpilot_http_errors_total Requests answered with a 4xx or 5xx status, by route."
        );
        let _ = writeln!(out, "# TYPE chainpilot_http_errors_total counter");
        for (route, m) in &routes {
            let _ = writeln!(out, "chainpilot_http_errors_total{{route=\"{route}\"}} {}", m.errors);
        }

        let _ = writeln!(
            out,
            "# HELP chainpilot_http_request_duration_seconds Handler latency, by route."
        );
        let _ = writeln!(out, "# TYPE chainpilot_http_request_duration_seconds histogram");
        for (route, m) in &routes {
            for (bound, count) in LATENCY_BUCKETS_SECS.iter().zip(m.buckets) {
                let _ = writeln!(
                    out,
                    "chainpilot_http_request_duration_seconds_bucket{{route=\"{route}\",le=\"{bound}\"}} {count}"
                );
            }
            let _ = writeln!(
                out,
                "chainpilot_http_request_duration_seconds_bucket{{route=\"{route}\",le=\"+Inf\"}} {}",
                m.requests
            );
            let _ = writeln!(
                out,
                "chainpilot_http_request_duration_seconds_sum{{route=\"{route}\"}} {}",
                m.latency_sum_secs
            );
            let _ = writeln!(
                out,
                "chainpilot_http_request_duration_seconds_count{{route=\"{route}\"}} {}",
                m.requests
            );
        }
        out
    }
}
