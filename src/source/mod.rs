//! Seed source configuration and acquisition.
//!
//! This module holds the configured list of entropy sources and the
//! code that opens them: files, external commands and entropy
//! gathering daemons. Builtin sources need no acquisition.

mod acquire;
mod config;
pub mod egd;

pub use acquire::{Acquire, AcquireError, CommandStream, SourceStream, SystemAcquirer};
pub use config::{ConfigError, FileConfig, SeedContext, SeedSource, SourceKind};
