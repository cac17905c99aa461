// * Telemetry - JSON Logging and Prometheus Metrics
// * Structured logs for every engine call, counters for analyses, sources and opportunities

use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec, Encoder,
    HistogramVec, TextEncoder,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// * Source query outcome labels
pub const OUTCOME_SUCCESS: &str = "success";
pub const OUTCOME_FAILURE: &str = "failure";
pub const OUTCOME_TIMEOUT: &str = "timeout";
pub const OUTCOME_CANCELLED: &str = "cancelled";
pub const OUTCOME_INVALID: &str = "invalid";

lazy_static! {
    // * Analyses by outcome (success, failure, invalid)
    pub static ref ANALYSES_TOTAL: CounterVec = register_counter_vec!(
        "backlink_analyses_total",
        "Total backlink analyses by outcome",
        &["outcome"]
    ).unwrap();

    // * Links classified toxic across all analyses
    pub static ref TOXIC_LINKS_TOTAL: Counter = register_counter!(
        "backlink_toxic_links_total",
        "Total links classified as toxic"
    ).unwrap();

    // * Capability calls by source and outcome
    pub static ref SOURCE_QUERIES_TOTAL: CounterVec = register_counter_vec!(
        "backlink_source_queries_total",
        "Total capability queries by source and outcome",
        &["source", "outcome"]
    ).unwrap();

    // * Capability call latency
    pub static ref SOURCE_QUERY_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "backlink_source_query_duration_seconds",
        "Capability query duration in seconds",
        &["source"],
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    // * Opportunities emitted by category
    pub static ref OPPORTUNITIES_TOTAL: CounterVec = register_counter_vec!(
        "backlink_opportunities_total",
        "Total opportunities produced by category",
        &["category"]
    ).unwrap();
}

/// Initializes the tracing subscriber with JSON formatting
///
/// # Example
/// ```ignore
/// use backlink_intel::ops::telemetry;
///
/// telemetry::init_tracing();
/// tracing::info!(domain = "example.com", "Analyzing backlinks");
/// ```
pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Initializes tracing with custom log level
pub fn init_tracing_with_level(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // * try_init so repeated calls (tests, embedding apps) don't panic
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .try_init();
}

/// Initializes tracing with pretty formatting (for development)
pub fn init_tracing_pretty() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().pretty().with_writer(std::io::stderr))
        .try_init();
}

/// Returns the current metrics in the Prometheus text format
pub fn get_metrics_string() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Records a finished analysis
pub fn record_analysis(outcome: &str) {
    ANALYSES_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_toxic_links(count: usize) {
    TOXIC_LINKS_TOTAL.inc_by(count as f64);
}

/// Records one capability call with its outcome and latency
pub fn record_source_query(source: &str, outcome: &str, seconds: f64) {
    SOURCE_QUERIES_TOTAL.with_label_values(&[source, outcome]).inc();
    SOURCE_QUERY_DURATION_SECONDS
        .with_label_values(&[source])
        .observe(seconds);
}

pub fn record_opportunities(category: &str, count: usize) {
    OPPORTUNITIES_TOTAL
        .with_label_values(&[category])
        .inc_by(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_source_query() {
        let before = SOURCE_QUERIES_TOTAL
            .with_label_values(&["telemetry-test", OUTCOME_TIMEOUT])
            .get();
        record_source_query("telemetry-test", OUTCOME_TIMEOUT, 0.2);
        let after = SOURCE_QUERIES_TOTAL
            .with_label_values(&["telemetry-test", OUTCOME_TIMEOUT])
            .get();
        assert!((after - before - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_counters_accumulate() {
        let before = TOXIC_LINKS_TOTAL.get();
        record_toxic_links(3);
        assert!(TOXIC_LINKS_TOTAL.get() >= before + 3.0);

        record_opportunities("unlinked_mentions", 2);
        record_analysis(OUTCOME_SUCCESS);
    }

    #[test]
    fn test_get_metrics_string() {
        record_analysis(OUTCOME_SUCCESS);
        let metrics = get_metrics_string();
        assert!(metrics.contains("backlink_analyses_total"));
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing_pretty();
    }
}
