//! Seed source configuration.
//!
//! Sources are declared once at startup, in order, and never change
//! afterwards. The same list serves every seeding context; each pass
//! only looks at the entries tagged for its own context.

use crate::prng::PrngConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// When a seed source applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedContext {
    /// Once, when the process starts.
    Startup,
    /// Each time a new secure session is set up.
    Connect,
}

impl fmt::Display for SeedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Startup => write!(f, "startup"),
            Self::Connect => write!(f, "connect"),
        }
    }
}

/// How entropy is pulled out of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Contents of a file (e.g. a random device).
    File,
    /// Standard output of an external program.
    #[serde(alias = "exec")]
    Command,
    /// An entropy gathering daemon listening on a Unix socket.
    #[serde(alias = "egd")]
    Daemon,
    /// Time, process id and runtime state, no I/O.
    Builtin,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Command => write!(f, "command"),
            Self::Daemon => write!(f, "daemon"),
            Self::Builtin => write!(f, "builtin"),
        }
    }
}

/// One configured entropy source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSource {
    /// Context this source is active in.
    pub context: SeedContext,
    /// Extraction strategy.
    pub kind: SourceKind,
    /// File path, program path or daemon socket path. Unused for builtin.
    #[serde(default)]
    pub location: String,
    /// Bytes to extract. Zero or negative reads until the stream ends.
    #[serde(default, rename = "bytes")]
    pub byte_count: i64,
}

impl SeedSource {
    /// A file source.
    pub fn file(context: SeedContext, path: impl Into<String>, byte_count: i64) -> Self {
        Self {
            context,
            kind: SourceKind::File,
            location: path.into(),
            byte_count,
        }
    }

    /// An external command source.
    pub fn command(context: SeedContext, program: impl Into<String>, byte_count: i64) -> Self {
        Self {
            context,
            kind: SourceKind::Command,
            location: program.into(),
            byte_count,
        }
    }

    /// An entropy gathering daemon source.
    pub fn daemon(context: SeedContext, socket: impl Into<String>, byte_count: i64) -> Self {
        Self {
            context,
            kind: SourceKind::Daemon,
            location: socket.into(),
            byte_count,
        }
    }

    /// The builtin source.
    pub fn builtin(context: SeedContext) -> Self {
        Self {
            context,
            kind: SourceKind::Builtin,
            location: String::new(),
            byte_count: 0,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("seed source #{index} ({kind}) has no location")]
    MissingLocation { index: usize, kind: SourceKind },
    #[error("minimum entropy must be at least one byte")]
    InvalidThreshold,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
///
/// ```toml
/// [prng]
/// algorithm = "blake3"
/// min_entropy_bytes = 32
///
/// [[seed]]
/// context = "startup"
/// kind = "file"
/// location = "/dev/urandom"
/// bytes = 512
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default, rename = "seed")]
    pub sources: Vec<SeedSource>,
    #[serde(default)]
    pub prng: PrngConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, source) in self.sources.iter().enumerate() {
            if source.kind != SourceKind::Builtin && source.location.trim().is_empty() {
                return Err(ConfigError::MissingLocation {
                    index,
                    kind: source.kind,
                });
            }
        }
        if self.prng.min_entropy_bytes == 0 {
            return Err(ConfigError::InvalidThreshold);
        }
        Ok(())
    }

    /// Builtin-only fallback used when no configuration file is given.
    pub fn builtin_only() -> Self {
        Self {
            sources: vec![
                SeedSource::builtin(SeedContext::Startup),
                SeedSource::builtin(SeedContext::Connect),
            ],
            prng: PrngConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::HashAlgorithm;

    #[test]
    fn test_parse_full_config() {
        let config = FileConfig::from_toml(
            r#"
            [prng]
            algorithm = "sha256"
            min_entropy_bytes = 48

            [[seed]]
            context = "startup"
            kind = "file"
            location = "/dev/urandom"
            bytes = 512

            [[seed]]
            context = "connect"
            kind = "exec"
            location = "/usr/local/bin/truerand"
            bytes = 16

            [[seed]]
            context = "startup"
            kind = "builtin"
            "#,
        )
        .unwrap();

        assert_eq!(config.sources.len(), 3);
        assert_eq!(
            config.sources[0],
            SeedSource::file(SeedContext::Startup, "/dev/urandom", 512)
        );
        assert_eq!(config.sources[1].kind, SourceKind::Command);
        assert_eq!(config.sources[1].context, SeedContext::Connect);
        assert_eq!(config.sources[2], SeedSource::builtin(SeedContext::Startup));
        assert!(matches!(config.prng.algorithm, HashAlgorithm::Sha256));
        assert_eq!(config.prng.min_entropy_bytes, 48);
    }

    #[test]
    fn test_egd_alias_and_default_bytes() {
        let config = FileConfig::from_toml(
            r#"
            [[seed]]
            context = "connect"
            kind = "egd"
            location = "/var/run/egd-pool"
            "#,
        )
        .unwrap();

        assert_eq!(config.sources[0].kind, SourceKind::Daemon);
        assert_eq!(config.sources[0].byte_count, 0);
    }

    #[test]
    fn test_missing_location_rejected() {
        let result = FileConfig::from_toml(
            r#"
            [[seed]]
            context = "startup"
            kind = "file"
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::MissingLocation {
                index: 0,
                kind: SourceKind::File
            })
        ));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result = FileConfig::from_toml(
            r#"
            [[seed]]
            context = "startup"
            kind = "carrier-pigeon"
            location = "/dev/null"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = FileConfig::from_toml("").unwrap();
        assert!(config.sources.is_empty());
        assert_eq!(config.prng.min_entropy_bytes, 32);
    }
}
