//! Opening the byte stream behind a seed source.
//!
//! Every handle returned here owns its underlying resource and releases
//! it on drop, so a short read or read error in the caller can never
//! leak a descriptor or leave a zombie child behind.

use super::config::{SeedSource, SourceKind};
use super::egd;
use crate::prng::Prng;
use std::fs::File;
use std::io::{self, Read};
use std::process::{Child, ChildStdout, Command, Stdio};
use thiserror::Error;

/// Errors that make a seed source unavailable.
///
/// None of these are fatal: the orchestrator logs them and moves on.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: io::Error },
    #[error("failed to spawn {command}: {source}")]
    Spawn { command: String, source: io::Error },
    #[error("entropy daemon at {path} unavailable: {source}")]
    Daemon { path: String, source: io::Error },
    #[error("{0} sources do not provide a byte stream")]
    NotAStream(SourceKind),
}

/// Access to the outside world on behalf of the orchestrator.
///
/// This abstraction allows swapping the real filesystem, process
/// spawner and daemon client for recording fakes in tests.
pub trait Acquire {
    /// Stream type produced for file and command sources.
    type Stream: Read;

    /// Opens the byte stream for a file or command source.
    fn open(&self, source: &SeedSource) -> Result<Self::Stream, AcquireError>;

    /// Asks the entropy daemon for `source.byte_count` bytes, feeding them
    /// straight into `prng`. Returns how many bytes were fed.
    fn query_daemon<P: Prng + ?Sized>(
        &self,
        source: &SeedSource,
        prng: &P,
    ) -> Result<usize, AcquireError>;
}

/// Acquirer backed by the real filesystem, processes and sockets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAcquirer;

impl SystemAcquirer {
    /// Creates an acquirer for the local filesystem, processes and sockets.
    pub fn new() -> Self {
        Self
    }

    fn open_file(path: &str) -> Result<SourceStream, AcquireError> {
        let file = File::open(path).map_err(|source| AcquireError::Open {
            path: path.to_string(),
            source,
        })?;
        tracing::trace!(path, "Opened seed file");
        Ok(SourceStream::File(file))
    }

    fn spawn(program: &str, byte_count: i64) -> Result<SourceStream, AcquireError> {
        let child = Command::new(program)
            .arg(byte_count.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| AcquireError::Spawn {
                command: program.to_string(),
                source,
            })?;

        let stream = CommandStream::new(child);
        if stream.stdout.is_none() {
            // Dropping the stream reaps the child.
            return Err(AcquireError::Spawn {
                command: program.to_string(),
                source: io::Error::new(io::ErrorKind::Other, "stdout was not captured"),
            });
        }

        tracing::trace!(program, pid = stream.id(), "Spawned seed command");
        Ok(SourceStream::Command(stream))
    }
}

impl Acquire for SystemAcquirer {
    type Stream = SourceStream;

    fn open(&self, source: &SeedSource) -> Result<SourceStream, AcquireError> {
        match source.kind {
            SourceKind::File => Self::open_file(&source.location),
            SourceKind::Command => Self::spawn(&source.location, source.byte_count),
            kind @ (SourceKind::Daemon | SourceKind::Builtin) => {
                Err(AcquireError::NotAStream(kind))
            }
        }
    }

    fn query_daemon<P: Prng + ?Sized>(
        &self,
        source: &SeedSource,
        prng: &P,
    ) -> Result<usize, AcquireError> {
        egd::query_socket(&source.location, source.byte_count, prng).map_err(|e| {
            AcquireError::Daemon {
                path: source.location.clone(),
                source: e,
            }
        })
    }
}

/// An open file or command output stream.
#[derive(Debug)]
pub enum SourceStream {
    File(File),
    Command(CommandStream),
}

impl Read for SourceStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.read(buf),
            Self::Command(command) => command.read(buf),
        }
    }
}

/// Standard output of a spawned seed command.
///
/// Owns the child process. On drop the pipe is closed and the child is
/// killed if still running, then reaped. Its exit status is not inspected.
#[derive(Debug)]
pub struct CommandStream {
    child: Child,
    stdout: Option<ChildStdout>,
}

impl CommandStream {
    fn new(mut child: Child) -> Self {
        let stdout = child.stdout.take();
        Self { child, stdout }
    }

    /// Process id of the child.
    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

impl Read for CommandStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stdout.as_mut() {
            Some(stdout) => stdout.read(buf),
            None => Ok(0),
        }
    }
}

impl Drop for CommandStream {
    fn drop(&mut self) {
        drop(self.stdout.take());

        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
        }
        match self.child.wait() {
            Ok(status) => tracing::trace!(pid = self.child.id(), %status, "Reaped seed command"),
            Err(e) => tracing::debug!(pid = self.child.id(), error = %e, "Failed to reap seed command"),
        }
    }
}
