//! PRNG Seeding Library
//!
//! Seeds a process-wide cryptographic PRNG from a configured list of
//! entropy sources before anything relies on its output, for example
//! before a secure session context is created.
//!
//! # Architecture
//!
//! ```text
//! source (config, acquire) → stream → prng
//!             builtin ─────────────↗   ↓
//!          seeding (orchestration) → diagnostics
//! ```
//!
//! # Design Principles
//!
//! - **Best effort**: an unavailable source contributes zero bytes, never an error
//! - **Ordered**: sources run strictly in declaration order, one at a time
//! - **Advisory check**: insufficient entropy after a pass is a warning, not a gate
//! - **Explicit handles**: the PRNG and the diagnostic sink are passed in, not global
//!
//! # Example
//!
//! ```no_run
//! use prng_seed::{
//!     prng::{PrngConfig, SharedPrng},
//!     seeding::Seeder,
//!     source::{SeedContext, SeedSource},
//! };
//!
//! let prng = SharedPrng::new(&PrngConfig::default());
//! let seeder = Seeder::new(
//!     vec![
//!         SeedSource::file(SeedContext::Startup, "/dev/urandom", 512),
//!         SeedSource::builtin(SeedContext::Startup),
//!     ],
//!     &prng,
//! );
//!
//! let total = seeder.seed(SeedContext::Startup, "Init: ");
//! println!("seeded {total} bytes");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod builtin;
pub mod diagnostics;
pub mod prng;
pub mod seeding;
pub mod source;
pub mod stream;

// Re-export commonly used types at crate root
pub use builtin::{BuiltinGenerator, RuntimeState, SystemState};
pub use diagnostics::{DiagnosticSink, SeedingMetrics, TracingSink};
pub use prng::{HashAlgorithm, Prng, PrngConfig, SharedPrng};
pub use seeding::Seeder;
pub use source::{Acquire, FileConfig, SeedContext, SeedSource, SourceKind, SystemAcquirer};
pub use stream::feed_from_stream;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
