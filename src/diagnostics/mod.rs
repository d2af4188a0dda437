//! Where seeding results are reported.
//!
//! After each pass the orchestrator emits two fire-and-forget
//! notifications: the byte total, and a warning if the PRNG still lacks
//! entropy. [`TracingSink`] turns them into log events,
//! [`SeedingMetrics`] into Prometheus counters.

mod metrics;

pub use metrics::{MetricsError, SeedingMetrics};

use crate::source::SeedContext;

/// Receiver for seeding notifications.
pub trait DiagnosticSink {
    /// A pass over `context` fed `total` bytes into the PRNG.
    fn seeded(&self, prefix: &str, context: SeedContext, total: usize);

    /// The PRNG reported insufficient entropy after a pass.
    fn insufficient_entropy(&self, prefix: &str, context: SeedContext);
}

/// Sink that logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn seeded(&self, prefix: &str, context: SeedContext, total: usize) {
        tracing::trace!(
            context = %context,
            total,
            "{prefix}Seeding PRNG with {total} bytes of entropy"
        );
    }

    fn insufficient_entropy(&self, prefix: &str, context: SeedContext) {
        tracing::warn!(
            context = %context,
            "{prefix}PRNG still contains insufficient entropy!"
        );
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &T {
    fn seeded(&self, prefix: &str, context: SeedContext, total: usize) {
        (**self).seeded(prefix, context, total)
    }

    fn insufficient_entropy(&self, prefix: &str, context: SeedContext) {
        (**self).insufficient_entropy(prefix, context)
    }
}

/// Both sinks receive every notification, left first.
impl<A: DiagnosticSink, B: DiagnosticSink> DiagnosticSink for (A, B) {
    fn seeded(&self, prefix: &str, context: SeedContext, total: usize) {
        self.0.seeded(prefix, context, total);
        self.1.seeded(prefix, context, total);
    }

    fn insufficient_entropy(&self, prefix: &str, context: SeedContext) {
        self.0.insufficient_entropy(prefix, context);
        self.1.insufficient_entropy(prefix, context);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Event, RecordingSink};
    use super::*;

    #[test]
    fn test_pair_forwards_to_both() {
        let left = RecordingSink::default();
        let right = RecordingSink::default();
        let pair = (&left, &right);

        pair.seeded("Init: ", SeedContext::Startup, 12);
        pair.insufficient_entropy("Init: ", SeedContext::Startup);

        assert_eq!(left.events(), right.events());
        assert_eq!(
            left.events()[0],
            Event::Seeded {
                prefix: "Init: ".to_string(),
                context: SeedContext::Startup,
                total: 12
            }
        );
        assert_eq!(left.warnings(), 1);
    }

    #[test]
    fn test_tracing_sink_does_not_panic_without_subscriber() {
        TracingSink.seeded("", SeedContext::Connect, 0);
        TracingSink.insufficient_entropy("", SeedContext::Connect);
    }
}
