use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static BACKEND_CALLS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Install the HTTP metrics recorder and the backend-call registry.
/// Calling it more than once is an error (the recorder is process-global).
pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("Metrics handle already initialized"))?;

    let registry = Registry::new();

    let backend_calls = IntCounterVec::new(
        Opts::new(
            "backend_calls_total",
            "Calls from the gateway to its backends by backend and outcome",
        ),
        &["backend", "outcome"],
    )?;
    registry.register(Box::new(backend_calls.clone()))?;

    PROMETHEUS_REGISTRY
        .set(registry)
        .map_err(|_| anyhow::anyhow!("Prometheus registry already initialized"))?;
    BACKEND_CALLS_TOTAL
        .set(backend_calls)
        .map_err(|_| anyhow::anyhow!("backend_calls_total already initialized"))?;

    Ok(())
}

pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&registry.gather(), &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

/// No-op until [`init_metrics`] has run.
pub fn record_backend_call(backend: &str, outcome: &str) {
    if let Some(counter) = BACKEND_CALLS_TOTAL.get() {
        counter.with_label_values(&[backend, outcome]).inc();
    }
}
