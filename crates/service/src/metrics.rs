use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

// Prometheus metrics (default registry)
pub static API_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "event_dashboard_api_requests_total",
        "Backend requests issued by the client, by endpoint and outcome",
        &["endpoint", "outcome"]
    )
    .expect("register api_requests_total")
});

pub static API_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "event_dashboard_api_request_duration_seconds",
        "Backend request duration in seconds",
        &["endpoint"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register api_request_duration")
});

pub static SESSION_TRANSITIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "event_dashboard_session_transitions_total",
        "Session transitions by kind",
        &["kind"]
    )
    .expect("register session_transitions_total")
});

#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Ok,
    Rejected,
    Failed,
    Unreachable,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Rejected => "rejected",
            Outcome::Failed => "failed",
            Outcome::Unreachable => "unreachable",
        }
    }
}

pub fn record_request(endpoint: &str, outcome: Outcome, elapsed_secs: f64) {
    API_REQUESTS_TOTAL.with_label_values(&[endpoint, outcome.as_str()]).inc();
    API_REQUEST_DURATION.with_label_values(&[endpoint]).observe(elapsed_secs);
}

pub fn record_transition(kind: &str) {
    SESSION_TRANSITIONS_TOTAL.with_label_values(&[kind]).inc();
}

/// Render the default registry in the text exposition format.
pub fn encode_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("metrics encode error: {e}"))?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_requests_show_up_in_export() {
        record_request("tasks.list", Outcome::Ok, 0.01);
        let text = encode_metrics().unwrap();
        assert!(text.contains("event_dashboard_api_requests_total"));
        assert!(text.contains(r#"endpoint="tasks.list""#));
    }
}
