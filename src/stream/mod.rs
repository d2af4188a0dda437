//! Chunked stream reading into the PRNG.
//!
//! File and command sources both end up here: their bytes are pulled in
//! fixed-size chunks and handed to the PRNG as they arrive.

mod reader;

pub use reader::{feed_from_stream, CHUNK_SIZE};
