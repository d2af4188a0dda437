//! Prometheus counters for seeding passes.

use super::DiagnosticSink;
use crate::source::SeedContext;
use prometheus::{Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Seeding metrics, labelled by context.
///
/// - `prng_seed_passes_total` - Seeding passes run
/// - `prng_seed_bytes_total` - Bytes fed into the PRNG
/// - `prng_seed_last_pass_bytes` - Bytes fed by the most recent pass
/// - `prng_seed_insufficient_total` - Passes that ended with too little entropy
pub struct SeedingMetrics {
    registry: Registry,
    passes_total: IntCounterVec,
    bytes_total: IntCounterVec,
    last_pass_bytes: IntGaugeVec,
    insufficient_total: IntCounterVec,
}

impl SeedingMetrics {
    /// Creates a registry with all seeding metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let passes_total = IntCounterVec::new(
            Opts::new("prng_seed_passes_total", "Total number of seeding passes"),
            &["context"],
        )?;
        let bytes_total = IntCounterVec::new(
            Opts::new("prng_seed_bytes_total", "Total bytes of entropy fed into the PRNG"),
            &["context"],
        )?;
        let last_pass_bytes = IntGaugeVec::new(
            Opts::new("prng_seed_last_pass_bytes", "Bytes fed by the most recent pass"),
            &["context"],
        )?;
        let insufficient_total = IntCounterVec::new(
            Opts::new(
                "prng_seed_insufficient_total",
                "Passes after which the PRNG still lacked entropy",
            ),
            &["context"],
        )?;

        registry.register(Box::new(passes_total.clone()))?;
        registry.register(Box::new(bytes_total.clone()))?;
        registry.register(Box::new(last_pass_bytes.clone()))?;
        registry.register(Box::new(insufficient_total.clone()))?;

        Ok(Self {
            registry,
            passes_total,
            bytes_total,
            last_pass_bytes,
            insufficient_total,
        })
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl DiagnosticSink for SeedingMetrics {
    fn seeded(&self, _prefix: &str, context: SeedContext, total: usize) {
        let label = context.to_string();
        let label = label.as_str();
        self.passes_total.with_label_values(&[label]).inc();
        self.bytes_total
            .with_label_values(&[label])
            .inc_by(total as u64);
        self.last_pass_bytes
            .with_label_values(&[label])
            .set(total as i64);
    }

    fn insufficient_entropy(&self, _prefix: &str, context: SeedContext) {
        let label = context.to_string();
        self.insufficient_total
            .with_label_values(&[label.as_str()])
            .inc();
    }
}
