// Prometheus metrics definitions for the LUKU backend.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Gauges ───────────────────────────────────────────────────────

    /// Chat sessions held in memory.
    pub static ref ACTIVE_SESSIONS: IntGauge =
        IntGauge::new("luku_active_sessions", "Chat sessions held in memory").unwrap();

    // ── Counters ─────────────────────────────────────────────────────

    /// Puzzles returned to callers, by the tier that produced them.
    pub static ref PUZZLES_GENERATED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("luku_puzzles_generated_total", "Puzzles generated"),
        &["tier"],
    )
    .unwrap();

    /// Template renders rejected as already seen.
    pub static ref NOVELTY_DUPLICATES_TOTAL: IntCounter = IntCounter::new(
        "luku_novelty_duplicates_total",
        "Rendered puzzles rejected as duplicates",
    )
    .unwrap();

    /// Puzzles accepted without a novelty check after exhausting attempts.
    pub static ref FORCED_PUZZLES_TOTAL: IntCounter = IntCounter::new(
        "luku_forced_puzzles_total",
        "Puzzles forced after exhausting novelty attempts",
    )
    .unwrap();

    /// Requests to the hosted model, by outcome (ok, error, unconfigured).
    pub static ref LLM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("luku_llm_requests_total", "Requests to the hosted model"),
        &["outcome"],
    )
    .unwrap();

    pub static ref CHAT_MESSAGES_TOTAL: IntCounter = IntCounter::new(
        "luku_chat_messages_total",
        "Chat messages handled",
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    pub static ref LLM_REQUEST_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "luku_llm_request_duration_seconds",
            "Hosted model request duration in seconds",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0]),
    )
    .unwrap();
}

/// Register all metrics with the custom registry. Call once at startup.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(ACTIVE_SESSIONS.clone()),
        Box::new(PUZZLES_GENERATED_TOTAL.clone()),
        Box::new(NOVELTY_DUPLICATES_TOTAL.clone()),
        Box::new(FORCED_PUZZLES_TOTAL.clone()),
        Box::new(LLM_REQUESTS_TOTAL.clone()),
        Box::new(CHAT_MESSAGES_TOTAL.clone()),
        Box::new(LLM_REQUEST_DURATION_SECONDS.clone()),
    ];

    for c in collectors {
        if let Err(e) = REGISTRY.register(c) {
            tracing::warn!("metric registration skipped: {e}");
        }
    }
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_metrics_returns_string() {
        register_metrics();
        // Registering twice is harmless.
        register_metrics();
        PUZZLES_GENERATED_TOTAL.with_label_values(&["template"]).inc();
        let output = gather_metrics();
        assert!(output.contains("luku_puzzles_generated_total"));
    }

    #[test]
    fn test_metric_increments() {
        ACTIVE_SESSIONS.set(2);
        assert_eq!(ACTIVE_SESSIONS.get(), 2);
        ACTIVE_SESSIONS.set(0);

        NOVELTY_DUPLICATES_TOTAL.inc();
        FORCED_PUZZLES_TOTAL.inc();
        CHAT_MESSAGES_TOTAL.inc();
        LLM_REQUESTS_TOTAL.with_label_values(&["ok"]).inc();
        LLM_REQUEST_DURATION_SECONDS.observe(0.3);
    }
}
