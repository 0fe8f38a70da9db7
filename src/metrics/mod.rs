//! Per-route gateway metrics.
//!
//! Each route keeps a total counter, an error counter (status >= 400), and a
//! bounded ring buffer of the most recent latency samples. Percentiles and
//! rates are computed on demand, not continuously. The registry is owned by
//! `AppState` and injected into the middleware, so tests construct a fresh
//! one instead of resetting process globals.

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use futures::FutureExt;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::error;

use crate::errors::ServiceError;
use crate::AppState;

pub const LATENCY_SAMPLE_CAPACITY: usize = 100;

#[derive(Debug, Default)]
pub struct RouteMetrics {
    total: AtomicU64,
    errors: AtomicU64,
    latencies: Mutex<VecDeque<Duration>>,
}

impl RouteMetrics {
    fn record(&self, status: u16, latency: Duration) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if status >= 400 {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        let mut samples = self.latencies.lock().expect("latency lock poisoned");
        if samples.len() == LATENCY_SAMPLE_CAPACITY {
            samples.pop_front();
        }
        samples.push_back(latency);
    }

    fn snapshot(&self) -> RouteSnapshot {
        let total = self.total.load(Ordering::Relaxed);
        let errors = self.errors.load(Ordering::Relaxed);
        let samples: Vec<Duration> = {
            let guard = self.latencies.lock().expect("latency lock poisoned");
            guard.iter().copied().collect()
        };

        let mean_ms = if samples.is_empty() {
            0.0
        } else {
            samples.iter().map(|d| d.as_secs_f64() * 1000.0).sum::<f64>() / samples.len() as f64
        };
        let p95_ms = percentile_ms(&samples, 0.95);
        let error_rate = if total == 0 {
            0.0
        } else {
            errors as f64 / total as f64
        };

        RouteSnapshot {
            total,
            errors,
            error_rate,
            mean_ms,
            p95_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSnapshot {
    pub total: u64,
    pub errors: u64,
    pub error_rate: f64,
    pub mean_ms: f64,
    pub p95_ms: f64,
}

fn percentile_ms(samples: &[Duration], percentile: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = samples.iter().map(|d| d.as_secs_f64() * 1000.0).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("latency is finite"));
    let rank = ((sorted.len() as f64) * percentile).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

/// Route-keyed metrics registry shared across concurrent requests.
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    routes: DashMap<String, Arc<RouteMetrics>>,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, route: &str, status: u16, latency: Duration) {
        let bucket = self
            .routes
            .entry(route.to_string())
            .or_default()
            .clone();
        bucket.record(status, latency);
    }

    pub fn snapshot(&self, route: &str) -> Option<RouteSnapshot> {
        self.routes.get(route).map(|bucket| bucket.snapshot())
    }

    pub fn snapshot_all(&self) -> Vec<(String, RouteSnapshot)> {
        let mut all: Vec<(String, RouteSnapshot)> = self
            .routes
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().snapshot()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}

/// Times every gateway route and records the outcome. An unexpected fault in
/// a handler is recorded as status 500 and turned into the standard envelope.
pub async fn track(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| format!("{} {}", request.method(), p.as_str()))
        .unwrap_or_else(|| format!("{} {}", request.method(), request.uri().path()));

    let start = Instant::now();
    let outcome = std::panic::AssertUnwindSafe(next.run(request))
        .catch_unwind()
        .await;
    let latency = start.elapsed();

    let response = match outcome {
        Ok(response) => response,
        Err(_) => {
            error!(route = %route, "handler panicked");
            ServiceError::Internal("handler panicked".into()).into_response()
        }
    };

    state
        .metrics
        .record(&route, response.status().as_u16(), latency);
    response
}

/// On-demand metrics report for operators.
pub async fn report(State(state): State<AppState>) -> Response {
    let snapshot: Vec<_> = state
        .metrics
        .snapshot_all()
        .into_iter()
        .map(|(route, snap)| serde_json::json!({ "route": route, "metrics": snap }))
        .collect();
    (StatusCode::OK, axum::Json(serde_json::json!({ "routes": snapshot }))).into_response()
}
