/*!
 * # Metrics Module
 *
 * In-process counters, gauges and histograms keyed by metric name plus a
 * sorted label set. The registry is owned by application state and shared
 * behind an `Arc`.
 *
 * ## Metrics Formats
 *
 * - Prometheus text format at `/metrics`
 * - JSON format at `/metrics/json`
 */

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::datasets::DatasetCounts;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_MS: &str = "http_request_duration_ms";
pub const DATASET_RECORDS: &str = "dataset_records";

/// Upper bounds (ms) of the latency histogram buckets.
const DURATION_BUCKETS_MS: [f64; 10] = [
    5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0,
];

/// Metric name plus its label pairs, ordered by label name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    name: String,
    labels: Vec<(String, String)>,
}

impl SeriesKey {
    pub fn new(name: &str, labels: &[(&str, &str)]) -> Self {
        let mut labels: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        labels.sort();
        Self {
            name: name.to_string(),
            labels,
        }
    }

    fn render_labels(&self, extra: Option<(&str, &str)>) -> String {
        let mut pairs: Vec<String> = self
            .labels
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
            .collect();
        if let Some((k, v)) = extra {
            pairs.push(format!("{}=\"{}\"", k, v));
        }
        if pairs.is_empty() {
            String::new()
        } else {
            format!("{{{}}}", pairs.join(","))
        }
    }

    fn json_name(&self) -> String {
        format!("{}{}", self.name, self.render_labels(None))
    }
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Gauge {
    value: Arc<AtomicU64>,
}

impl Gauge {
    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Cumulative-bucket histogram; the sum is kept in microseconds.
#[derive(Debug, Clone)]
pub struct Histogram {
    buckets: Arc<[AtomicU64; DURATION_BUCKETS_MS.len()]>,
    sum_micros: Arc<AtomicU64>,
    count: Arc<AtomicU64>,
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            buckets: Arc::new(std::array::from_fn(|_| AtomicU64::new(0))),
            sum_micros: Arc::new(AtomicU64::new(0)),
            count: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Histogram {
    pub fn observe_ms(&self, value: f64) {
        let value = value.max(0.0);
        for (bound, bucket) in DURATION_BUCKETS_MS.iter().zip(self.buckets.iter()) {
            if value <= *bound {
                bucket.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.sum_micros
            .fetch_add((value * 1000.0).round() as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn get_sum_ms(&self) -> f64 {
        self.sum_micros.load(Ordering::Relaxed) as f64 / 1000.0
    }

    fn bucket_counts(&self) -> Vec<(f64, u64)> {
        DURATION_BUCKETS_MS
            .iter()
            .zip(self.buckets.iter())
            .map(|(bound, bucket)| (*bound, bucket.load(Ordering::Relaxed)))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    counters: DashMap<SeriesKey, Counter>,
    gauges: DashMap<SeriesKey, Gauge>,
    histograms: DashMap<SeriesKey, Histogram>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> Counter {
        self.counters
            .entry(SeriesKey::new(name, labels))
            .or_default()
            .clone()
    }

    pub fn gauge(&self, name: &str, labels: &[(&str, &str)]) -> Gauge {
        self.gauges
            .entry(SeriesKey::new(name, labels))
            .or_default()
            .clone()
    }

    pub fn histogram(&self, name: &str, labels: &[(&str, &str)]) -> Histogram {
        self.histograms
            .entry(SeriesKey::new(name, labels))
            .or_default()
            .clone()
    }

    pub fn record_request(&self, method: &str, route: &str, status: u16, elapsed_ms: f64) {
        let status = status.to_string();
        let labels = [("method", method), ("route", route), ("status", status.as_str())];
        self.counter(HTTP_REQUESTS_TOTAL, &labels).inc();
        self.histogram(HTTP_REQUEST_DURATION_MS, &labels)
            .observe_ms(elapsed_ms);
    }

    pub fn record_dataset(&self, counts: DatasetCounts) {
        for (kind, value) in [
            ("disruptions", counts.disruptions),
            ("forecast_skus", counts.forecast_skus),
            ("forecast_series", counts.forecast_series),
            ("waste_items", counts.waste_items),
        ] {
            self.gauge(DATASET_RECORDS, &[("kind", kind)])
                .set(value as u64);
        }
    }

    fn sorted<T: Clone>(map: &DashMap<SeriesKey, T>) -> BTreeMap<SeriesKey, T> {
        map.iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Prometheus text exposition, series sorted by name then labels.
    pub fn export_text(&self) -> String {
        let mut output = String::new();
        let mut last_type_line = String::new();
        let mut type_line = |output: &mut String, name: &str, kind: &str| {
            let line = format!("# TYPE {} {}\n", name, kind);
            if line != last_type_line {
                output.push_str(&line);
                last_type_line = line;
            }
        };

        for (key, counter) in Self::sorted(&self.counters) {
            type_line(&mut output, &key.name, "counter");
            let _ = writeln!(output, "{}{} {}", key.name, key.render_labels(None), counter.get());
        }

        for (key, gauge) in Self::sorted(&self.gauges) {
            type_line(&mut output, &key.name, "gauge");
            let _ = writeln!(output, "{}{} {}", key.name, key.render_labels(None), gauge.get());
        }

        for (key, histogram) in Self::sorted(&self.histograms) {
            type_line(&mut output, &key.name, "histogram");
            for (bound, count) in histogram.bucket_counts() {
                let le = bound.to_string();
                let _ = writeln!(
                    output,
                    "{}_bucket{} {}",
                    key.name,
                    key.render_labels(Some(("le", &le))),
                    count
                );
            }
            let labels = key.render_labels(Some(("le", "+Inf")));
            let _ = writeln!(output, "{}_bucket{} {}", key.name, labels, histogram.get_count());
            let plain = key.render_labels(None);
            let _ = writeln!(output, "{}_sum{} {}", key.name, plain, histogram.get_sum_ms());
            let _ = writeln!(output, "{}_count{} {}", key.name, plain, histogram.get_count());
        }

        output
    }

    pub fn export_json(&self) -> serde_json::Value {
        let counters: serde_json::Map<String, serde_json::Value> = Self::sorted(&self.counters)
            .into_iter()
            .map(|(key, counter)| (key.json_name(), json!(counter.get())))
            .collect();

        let gauges: serde_json::Map<String, serde_json::Value> = Self::sorted(&self.gauges)
            .into_iter()
            .map(|(key, gauge)| (key.json_name(), json!(gauge.get())))
            .collect();

        let histograms: serde_json::Map<String, serde_json::Value> =
            Self::sorted(&self.histograms)
                .into_iter()
                .map(|(key, histogram)| {
                    (
                        key.json_name(),
                        json!({
                            "count": histogram.get_count(),
                            "sumMs": histogram.get_sum_ms(),
                        }),
                    )
                })
                .collect();

        json!({
            "counters": counters,
            "gauges": gauges,
            "histograms": histograms,
        })
    }
}

/// Label for a request method. Extension methods share one `other` series so
/// the label set stays bounded.
pub fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        "HEAD" => "HEAD",
        "OPTIONS" => "OPTIONS",
        "CONNECT" => "CONNECT",
        "TRACE" => "TRACE",
        _ => "other",
    }
}

/// Records request count and latency per method, matched route and status.
pub async fn http_metrics_middleware(
    State(metrics): State<Arc<MetricsRegistry>>,
    request: Request,
    next: Next,
) -> Response {
    let method = method_label(request.method());
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    metrics.record_request(method, &route, response.status().as_u16(), elapsed_ms);
    response
}

pub async fn metrics_handler(State(metrics): State<Arc<MetricsRegistry>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics.export_text(),
    )
}

pub async fn metrics_json_handler(
    State(metrics): State<Arc<MetricsRegistry>>,
) -> Json<serde_json::Value> {
    Json(metrics.export_json())
}
