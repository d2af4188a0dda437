//! Time, process id and scratch-window seeding.

use crate::prng::Prng;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Encoded size of the time and pid stamp: `i64` seconds + `u32` pid.
pub const STAMP_LEN: usize = 12;
/// Size of the scratch buffer the window is sampled from.
pub const SCRATCH_LEN: usize = 256;
/// Bytes sampled from the scratch buffer.
pub const WINDOW_LEN: usize = 128;
/// Bytes contributed by one builtin pass.
pub const BUILTIN_BYTES: usize = STAMP_LEN + WINDOW_LEN;

/// Process state the builtin source draws on.
pub trait RuntimeState {
    /// Current wall-clock time, seconds since the Unix epoch.
    fn unix_time(&self) -> i64;

    /// Identifier of the current process.
    fn process_id(&self) -> u32;

    /// Seed for the non-cryptographic offset chooser.
    fn offset_seed(&self) -> u64;
}

/// The real clock and process.
#[derive(Debug, Clone, Copy)]
pub struct SystemState {
    pid: u32,
}

impl SystemState {
    /// Captures the current process id.
    pub fn new() -> Self {
        Self {
            pid: std::process::id(),
        }
    }
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeState for SystemState {
    fn unix_time(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn process_id(&self) -> u32 {
        self.pid
    }

    fn offset_seed(&self) -> u64 {
        let nanos = chrono::Utc::now().timestamp_subsec_nanos() as u64;
        nanos ^ ((self.pid as u64) << 32)
    }
}

/// Picks where in the scratch buffer the window starts.
///
/// Uniform over `[0, SCRATCH_LEN - WINDOW_LEN - 1]`. This only selects an
/// offset and has nothing to do with the PRNG being seeded.
pub fn choose_offset(seed: u64) -> usize {
    let mut rng = SmallRng::seed_from_u64(seed);
    rng.gen_range(0..SCRATCH_LEN - WINDOW_LEN)
}

/// Seeds a PRNG from process state alone. Never fails.
#[derive(Debug, Clone, Default)]
pub struct BuiltinGenerator<S = SystemState> {
    state: S,
}

impl<S: RuntimeState> BuiltinGenerator<S> {
    /// Creates a generator reading from `state`.
    pub fn new(state: S) -> Self {
        Self { state }
    }

    /// Seeds `prng` twice, the stamp then the scratch window, and returns
    /// [`BUILTIN_BYTES`].
    pub fn generate<P: Prng + ?Sized>(&self, prng: &P) -> usize {
        let stamp = self.stamp();
        prng.seed(&stamp);

        let mut scratch = [0u8; SCRATCH_LEN];
        fill_scratch(&mut scratch);
        let offset = choose_offset(self.state.offset_seed());
        prng.seed(&scratch[offset..offset + WINDOW_LEN]);

        tracing::trace!(offset, bytes = BUILTIN_BYTES, "Builtin entropy seeded");
        BUILTIN_BYTES
    }

    fn stamp(&self) -> [u8; STAMP_LEN] {
        let mut stamp = [0u8; STAMP_LEN];
        stamp[..8].copy_from_slice(&self.state.unix_time().to_le_bytes());
        stamp[8..].copy_from_slice(&self.state.process_id().to_le_bytes());
        stamp
    }
}

// Safe Rust cannot read uninitialised stack memory, so the scratch is
// filled with residual runtime state instead: timer deltas folded with
// the buffer address. Low quality; not relied on for security.
fn fill_scratch(scratch: &mut [u8; SCRATCH_LEN]) {
    let origin = Instant::now();
    let base = scratch.as_ptr() as usize as u64;

    for (i, word) in scratch.chunks_exact_mut(8).enumerate() {
        let jitter = origin.elapsed().as_nanos() as u64;
        let value = base.rotate_left(i as u32) ^ jitter.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        word.copy_from_slice(&value.to_le_bytes());
    }
}
