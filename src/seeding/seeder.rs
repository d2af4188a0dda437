//! Seeding orchestrator.

use crate::builtin::{BuiltinGenerator, RuntimeState, SystemState};
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::prng::Prng;
use crate::source::{Acquire, SeedContext, SeedSource, SourceKind, SystemAcquirer};
use crate::stream::feed_from_stream;

/// Runs seeding passes over a fixed list of sources.
///
/// The source list is never modified after construction, so one seeder
/// can serve every context for the lifetime of the process. Passes run
/// on the calling thread and block on source I/O; there is no timeout,
/// so a stalled command or daemon stalls the pass.
pub struct Seeder<P, D = TracingSink, A = SystemAcquirer, S = SystemState> {
    sources: Vec<SeedSource>,
    prng: P,
    sink: D,
    acquirer: A,
    builtin: BuiltinGenerator<S>,
}

impl<P: Prng> Seeder<P> {
    /// Creates a seeder using the real system, logging through `tracing`.
    pub fn new(sources: Vec<SeedSource>, prng: P) -> Self {
        Self {
            sources,
            prng,
            sink: TracingSink,
            acquirer: SystemAcquirer::new(),
            builtin: BuiltinGenerator::new(SystemState::new()),
        }
    }
}

impl<P, D, A, S> Seeder<P, D, A, S>
where
    P: Prng,
    D: DiagnosticSink,
    A: Acquire,
    S: RuntimeState,
{
    /// Replaces the diagnostic sink.
    pub fn with_sink<D2: DiagnosticSink>(self, sink: D2) -> Seeder<P, D2, A, S> {
        Seeder {
            sources: self.sources,
            prng: self.prng,
            sink,
            acquirer: self.acquirer,
            builtin: self.builtin,
        }
    }

    /// Replaces the acquirer used for file, command and daemon sources.
    pub fn with_acquirer<A2: Acquire>(self, acquirer: A2) -> Seeder<P, D, A2, S> {
        Seeder {
            sources: self.sources,
            prng: self.prng,
            sink: self.sink,
            acquirer,
            builtin: self.builtin,
        }
    }

    /// Replaces the process state read by builtin sources.
    pub fn with_runtime_state<S2: RuntimeState>(self, state: S2) -> Seeder<P, D, A, S2> {
        Seeder {
            sources: self.sources,
            prng: self.prng,
            sink: self.sink,
            acquirer: self.acquirer,
            builtin: BuiltinGenerator::new(state),
        }
    }

    /// Returns the configured sources, in declaration order.
    pub fn sources(&self) -> &[SeedSource] {
        &self.sources
    }

    /// Returns the PRNG handle.
    pub fn prng(&self) -> &P {
        &self.prng
    }

    /// Returns the diagnostic sink.
    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// Runs one pass over the sources tagged with `context`.
    ///
    /// Sources are tried once each, in declaration order. An unavailable
    /// source contributes nothing and the pass carries on. Returns the
    /// total number of bytes fed into the PRNG, which may be zero.
    ///
    /// Afterwards the total is reported to the sink, followed by a
    /// warning if the PRNG still reports insufficient entropy. `prefix`
    /// is prepended to both messages.
    pub fn seed(&self, context: SeedContext, prefix: &str) -> usize {
        let total: usize = self
            .sources
            .iter()
            .filter(|source| source.context == context)
            .map(|source| self.seed_source(source))
            .sum();

        self.sink.seeded(prefix, context, total);
        if !self.prng.is_sufficiently_seeded() {
            self.sink.insufficient_entropy(prefix, context);
        }

        total
    }

    fn seed_source(&self, source: &SeedSource) -> usize {
        let fed = match source.kind {
            SourceKind::File | SourceKind::Command => match self.acquirer.open(source) {
                // The stream is dropped, and so released, at the end of this arm.
                Ok(mut stream) => feed_from_stream(&self.prng, &mut stream, source.byte_count),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unavailable seed source");
                    0
                }
            },
            SourceKind::Daemon => match self.acquirer.query_daemon(source, &self.prng) {
                Ok(n) => n,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unavailable seed source");
                    0
                }
            },
            SourceKind::Builtin => self.builtin.generate(&self.prng),
        };

        tracing::trace!(
            kind = %source.kind,
            location = %source.location,
            requested = source.byte_count,
            fed,
            "Seed source processed"
        );
        fed
    }
}

impl<P, D, A, S> std::fmt::Debug for Seeder<P, D, A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seeder")
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}
