//! Entropy Gathering Daemon client.
//!
//! Speaks the EGD wire protocol: the client sends `[0x01, n]` to ask for
//! up to `n` bytes without blocking, and the daemon answers with a count
//! byte followed by that many bytes of entropy.

use crate::prng::Prng;
use std::io::{self, Read, Write};

/// Largest request a single EGD command can carry.
pub const MAX_REQUEST: usize = 255;

/// "Read entropy, non-blocking" command byte.
const CMD_READ_NONBLOCKING: u8 = 0x01;

/// Queries a daemon over an established connection.
///
/// Requests are sent in slices of at most [`MAX_REQUEST`] bytes until
/// `requested` bytes arrived or the daemon hands back a short slice.
/// A non-positive `requested` asks for one full slice. Each slice is fed
/// to `prng` as soon as it is received.
///
/// An I/O error before any byte arrived is returned as is. After that,
/// the bytes already fed are reported and the error is only logged.
pub fn query<S, P>(conn: &mut S, requested: i64, prng: &P) -> io::Result<usize>
where
    S: Read + Write,
    P: Prng + ?Sized,
{
    let mut remaining = if requested > 0 {
        requested as usize
    } else {
        MAX_REQUEST
    };
    let mut done = 0;
    let mut buf = [0u8; MAX_REQUEST];

    while remaining > 0 {
        let ask = remaining.min(MAX_REQUEST);
        match request_slice(conn, ask, &mut buf) {
            Ok(got) => {
                if got > 0 {
                    prng.seed(&buf[..got]);
                }
                done += got;
                remaining -= got;
                tracing::trace!(asked = ask, got, "EGD slice received");
                if got < ask {
                    break;
                }
            }
            Err(e) if done == 0 => return Err(e),
            Err(e) => {
                tracing::debug!(error = %e, bytes = done, "EGD connection failed mid-query");
                break;
            }
        }
    }

    Ok(done)
}

fn request_slice<S: Read + Write>(
    conn: &mut S,
    ask: usize,
    buf: &mut [u8; MAX_REQUEST],
) -> io::Result<usize> {
    conn.write_all(&[CMD_READ_NONBLOCKING, ask as u8])?;
    conn.flush()?;

    let mut count = [0u8; 1];
    conn.read_exact(&mut count)?;
    let got = count[0] as usize;
    if got > ask {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("daemon announced {got} bytes, {ask} were requested"),
        ));
    }

    conn.read_exact(&mut buf[..got])?;
    Ok(got)
}

/// Connects to the daemon socket at `path` and runs [`query`].
#[cfg(unix)]
pub fn query_socket<P: Prng + ?Sized>(path: &str, requested: i64, prng: &P) -> io::Result<usize> {
    let mut conn = std::os::unix::net::UnixStream::connect(path)?;
    query(&mut conn, requested, prng)
}

#[cfg(not(unix))]
pub fn query_socket<P: Prng + ?Sized>(
    _path: &str,
    _requested: i64,
    _prng: &P,
) -> io::Result<usize> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "entropy daemons need Unix domain sockets",
    ))
}
