use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

use crate::error::{ClientError, Result};

// Declare the static OnceLock to hold the Metrics.
static METRICS_INSTANCE: OnceLock<Arc<Metrics>> = OnceLock::new();

/// Lazily initializes and gets a reference to the process-wide metrics.
pub fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| {
        debug!("Initializing Metrics ...");
        Metrics::new()
    })
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token metrics
    pub token_reuse: IntCounter,
    pub token_fetch: IntCounter,
    pub token_fetch_failures: IntCounterVec,

    // Attach metrics
    pub attach_requests: IntCounterVec,
    pub attach_failures: IntCounterVec,

    pub request_duration: HistogramVec,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("ovirtflexdriver".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            token_reuse: IntCounter::new("auth_token_reuse_total", "Authentications served from the cached token").unwrap(),
            token_fetch: IntCounter::new("auth_token_fetch_total", "Token fetch exchanges sent to the engine").unwrap(),
            token_fetch_failures: IntCounterVec::new(Opts::new("auth_token_fetch_failures_total", "Token fetch failures by reason"), &["reason"]).unwrap(),

            attach_requests: IntCounterVec::new(Opts::new("attach_requests_total", "Answered attach calls by derived status"), &["status"]).unwrap(),
            attach_failures: IntCounterVec::new(Opts::new("attach_failures_total", "Attach calls that ended in an error, by reason"), &["reason"]).unwrap(),

            request_duration: HistogramVec::new(HistogramOpts::new("request_duration_seconds", "Engine request duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]), &["operation"]).unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_reuse.clone())).unwrap();
        reg.register(Box::new(metrics.token_fetch.clone())).unwrap();
        reg.register(Box::new(metrics.token_fetch_failures.clone())).unwrap();
        reg.register(Box::new(metrics.attach_requests.clone())).unwrap();
        reg.register(Box::new(metrics.attach_failures.clone())).unwrap();
        reg.register(Box::new(metrics.request_duration.clone())).unwrap();

        metrics
    }

    /// Prometheus text exposition of everything registered
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| ClientError::Config(format!("metrics encoding failed: {}", e)))?;
        String::from_utf8(buffer).map_err(|e| ClientError::Config(format!("metrics encoding failed: {}", e)))
    }

    /// Write the exposition for the node_exporter textfile collector.
    /// Writes to a sibling temp file first so the collector never reads a partial file.
    pub async fn write_textfile(&self, path: &Path) -> Result<()> {
        let content = self.render()?;
        let tmp = path.with_extension("prom.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| ClientError::Config(format!("cannot write metrics to '{}': {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| ClientError::Config(format!("cannot move metrics to '{}': {}", path.display(), e)))?;
        info!(path = %path.display(), "metrics textfile written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn textfile_contains_registered_families() {
        let metrics = get_metrics();
        metrics.attach_requests.with_label_values(&["Success"]).inc();
        metrics.attach_failures.with_label_values(&["transport"]).inc();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ovirt_flexdriver.prom");
        metrics.write_textfile(&path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("ovirtflexdriver_attach_requests_total{status=\"Success\"}"));
        assert!(content.contains("ovirtflexdriver_attach_failures_total{reason=\"transport\"}"));
        assert!(!path.with_extension("prom.tmp").exists());
    }
}
