//! Feeds a byte stream into the PRNG chunk by chunk.

use crate::prng::Prng;
use std::io::{ErrorKind, Read};

/// Bytes requested from the stream per read.
pub const CHUNK_SIZE: usize = 8192;

/// Reads `stream` into `prng` and returns the number of bytes fed.
///
/// With `requested > 0` reads stop once that many bytes were fed, and no
/// read asks for more than what is still missing. Otherwise the stream
/// is consumed until it ends.
///
/// Every chunk is seeded as soon as it is read, so a stream that dies
/// half-way still contributes what it delivered. End of stream and read
/// errors both just end the contribution.
pub fn feed_from_stream<R, P>(prng: &P, stream: &mut R, requested: i64) -> usize
where
    R: Read + ?Sized,
    P: Prng + ?Sized,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut done = 0usize;
    let mut todo = (requested > 0).then_some(requested as u64);

    loop {
        let want = match todo {
            Some(remaining) => remaining.min(CHUNK_SIZE as u64) as usize,
            None => CHUNK_SIZE,
        };

        let n = match stream.read(&mut buf[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!(error = %e, bytes = done, "Seed stream read failed");
                break;
            }
        };

        prng.seed(&buf[..n]);
        done += n;

        if let Some(remaining) = todo.as_mut() {
            *remaining -= n as u64;
            if *remaining == 0 {
                break;
            }
        }
    }

    tracing::trace!(requested, fed = done, "Seed stream consumed");
    done
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::testing::RecordingPrng;
    use proptest::prelude::*;
    use std::io::{self, Cursor};

    /// Delivers `good` bytes, then fails every read.
    struct FailingReader {
        good: usize,
        interrupted_once: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted_once {
                self.interrupted_once = true;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            if self.good == 0 {
                return Err(io::Error::new(ErrorKind::BrokenPipe, "gone"));
            }
            let n = buf.len().min(self.good);
            buf[..n].fill(0x5A);
            self.good -= n;
            Ok(n)
        }
    }

    fn stream_of(len: usize) -> Cursor<Vec<u8>> {
        Cursor::new((0..len).map(|i| i as u8).collect())
    }

    #[test]
    fn test_bounded_read_chunks() {
        let prng = RecordingPrng::new();
        let mut stream = stream_of(20_000);

        let fed = feed_from_stream(&prng, &mut stream, 10_000);

        assert_eq!(fed, 10_000);
        assert_eq!(prng.chunk_sizes(), vec![CHUNK_SIZE, 10_000 - CHUNK_SIZE]);
        // The rest of the stream is left unread.
        assert_eq!(stream.position(), 10_000);
    }

    #[test]
    fn test_unbounded_reads_to_end() {
        let prng = RecordingPrng::new();
        let mut stream = stream_of(CHUNK_SIZE * 2 + 5);

        let fed = feed_from_stream(&prng, &mut stream, 0);

        assert_eq!(fed, CHUNK_SIZE * 2 + 5);
        assert_eq!(prng.chunk_sizes(), vec![CHUNK_SIZE, CHUNK_SIZE, 5]);
    }

    #[test]
    fn test_negative_request_is_unbounded() {
        let prng = RecordingPrng::new();
        let fed = feed_from_stream(&prng, &mut stream_of(300), -1);
        assert_eq!(fed, 300);
    }

    #[test]
    fn test_empty_stream() {
        let prng = RecordingPrng::new();
        let fed = feed_from_stream(&prng, &mut stream_of(0), 64);
        assert_eq!(fed, 0);
        assert_eq!(prng.seed_calls(), 0);
    }

    #[test]
    fn test_read_error_keeps_partial_bytes() {
        let prng = RecordingPrng::new();
        let mut reader = FailingReader {
            good: 100,
            interrupted_once: false,
        };

        let fed = feed_from_stream(&prng, &mut reader, 1000);

        assert_eq!(fed, 100);
        assert_eq!(prng.total_bytes(), 100);
    }

    #[test]
    fn test_bytes_are_fed_in_order() {
        let prng = RecordingPrng::new();
        feed_from_stream(&prng, &mut Cursor::new(b"abcdef".to_vec()), 4);
        assert_eq!(prng.calls(), vec![b"abcd".to_vec()]);
    }

    proptest! {
        #[test]
        fn prop_long_stream_yields_exact_request(extra in 0usize..5_000, requested in 1i64..30_000) {
            let prng = RecordingPrng::new();
            let mut stream = stream_of(requested as usize + extra);

            let fed = feed_from_stream(&prng, &mut stream, requested);

            prop_assert_eq!(fed, requested as usize);
            prop_assert_eq!(prng.total_bytes(), requested as usize);
            prop_assert!(prng.chunk_sizes().iter().all(|&n| n > 0 && n <= CHUNK_SIZE));
        }

        #[test]
        fn prop_unbounded_consumes_everything(len in 0usize..30_000, requested in -5i64..=0) {
            let prng = RecordingPrng::new();
            let fed = feed_from_stream(&prng, &mut stream_of(len), requested);
            prop_assert_eq!(fed, len);
            prop_assert_eq!(prng.total_bytes(), len);
        }

        #[test]
        fn prop_short_stream_yields_its_length(len in 0usize..20_000, missing in 1i64..5_000) {
            let prng = RecordingPrng::new();
            let requested = len as i64 + missing;
            let fed = feed_from_stream(&prng, &mut stream_of(len), requested);
            prop_assert_eq!(fed, len);
        }
    }
}
