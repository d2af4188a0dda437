//! Process-wide ChaCha20 PRNG with incremental seeding.
//!
//! # Seeding Model
//!
//! Each call to [`Prng::seed`] derives a fresh ChaCha20 key from:
//! - The previous key material
//! - The new seed bytes
//! - A domain separator and seed counter
//!
//! Every seeded byte is credited as one byte of entropy. Output is
//! refused until the configured threshold is reached.

use super::mixer::{HashAlgorithm, Mixer};
use super::Prng;
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Entropy the generator needs before it reports itself seeded.
pub const DEFAULT_MIN_ENTROPY_BYTES: usize = 32;

/// Errors returned when drawing output.
#[derive(Debug, Error)]
pub enum PrngError {
    #[error("insufficient entropy: got {got} bytes, need {need} bytes")]
    InsufficientEntropy { got: usize, need: usize },
}

/// PRNG configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrngConfig {
    /// Hash used to derive each new key.
    #[serde(default)]
    pub algorithm: HashAlgorithm,
    /// Bytes of entropy required before output is allowed.
    #[serde(default = "default_min_entropy_bytes")]
    pub min_entropy_bytes: usize,
}

fn default_min_entropy_bytes() -> usize {
    DEFAULT_MIN_ENTROPY_BYTES
}

impl Default for PrngConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            min_entropy_bytes: DEFAULT_MIN_ENTROPY_BYTES,
        }
    }
}

struct State {
    /// The underlying ChaCha20 generator.
    inner: ChaCha20Rng,
    /// Key material retained for mixing. Not the ChaCha internal state.
    key: [u8; 32],
    /// Entropy credited so far.
    entropy_bytes: usize,
    /// Seed calls performed.
    seed_count: u64,
    /// Output bytes drawn since the last seed call.
    bytes_since_seed: u64,
}

impl State {
    fn from_key(key: [u8; 32], entropy_bytes: usize) -> Self {
        Self {
            inner: ChaCha20Rng::from_seed(key),
            key,
            entropy_bytes,
            seed_count: 0,
            bytes_since_seed: 0,
        }
    }
}

/// A ChaCha20 PRNG shared by every thread of the process.
///
/// All state sits behind one mutex, which is the only locking around
/// seeding: callers may seed concurrently through `&self`.
pub struct SharedPrng {
    state: Mutex<State>,
    mixer: Mixer,
    min_entropy_bytes: usize,
}

impl SharedPrng {
    /// Creates an unseeded generator.
    ///
    /// It reports insufficient entropy until enough bytes are seeded.
    pub fn new(config: &PrngConfig) -> Self {
        Self {
            state: Mutex::new(State::from_key([0u8; 32], 0)),
            mixer: Mixer::new(config.algorithm),
            min_entropy_bytes: config.min_entropy_bytes.max(1),
        }
    }

    /// Creates a generator already seeded from the OS entropy source.
    pub fn from_os_entropy(config: &PrngConfig) -> Self {
        let mut key = [0u8; 32];
        rand_core::OsRng.fill_bytes(&mut key);

        let prng = Self::new(config);
        *prng.lock() = State::from_key(key, key.len().max(prng.min_entropy_bytes));
        prng
    }

    /// Creates a generator from a known key (for testing only).
    #[cfg(test)]
    pub(crate) fn from_seed_for_testing(key: [u8; 32]) -> Self {
        let prng = Self::new(&PrngConfig::default());
        *prng.lock() = State::from_key(key, 0);
        prng
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave the key half-written.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the entropy credited so far, in bytes.
    pub fn entropy_bytes(&self) -> usize {
        self.lock().entropy_bytes
    }

    /// Returns the entropy required before output is allowed.
    pub fn min_entropy_bytes(&self) -> usize {
        self.min_entropy_bytes
    }

    /// Returns the number of seed calls performed.
    pub fn seed_count(&self) -> u64 {
        self.lock().seed_count
    }

    /// Returns bytes generated since the last seed call.
    pub fn bytes_since_seed(&self) -> u64 {
        self.lock().bytes_since_seed
    }

    /// Fills `dest` with random output.
    ///
    /// Fails while the generator holds less entropy than required.
    pub fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), PrngError> {
        let mut state = self.lock();
        if state.entropy_bytes < self.min_entropy_bytes {
            return Err(PrngError::InsufficientEntropy {
                got: state.entropy_bytes,
                need: self.min_entropy_bytes,
            });
        }
        state.inner.fill_bytes(dest);
        state.bytes_since_seed += dest.len() as u64;
        Ok(())
    }
}

impl Default for SharedPrng {
    fn default() -> Self {
        Self::new(&PrngConfig::default())
    }
}

impl Prng for SharedPrng {
    fn seed(&self, bytes: &[u8]) {
        let mut state = self.lock();
        let key = self.mixer.mix(state.seed_count, &state.key, bytes);

        state.key = key;
        state.inner = ChaCha20Rng::from_seed(key);
        state.seed_count += 1;
        state.entropy_bytes = state.entropy_bytes.saturating_add(bytes.len());
        state.bytes_since_seed = 0;

        tracing::trace!(
            bytes = bytes.len(),
            seed_count = state.seed_count,
            entropy_bytes = state.entropy_bytes,
            "PRNG seeded"
        );
    }

    fn is_sufficiently_seeded(&self) -> bool {
        self.lock().entropy_bytes >= self.min_entropy_bytes
    }
}

impl std::fmt::Debug for SharedPrng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("SharedPrng")
            .field("algorithm", &self.mixer.algorithm())
            .field("entropy_bytes", &state.entropy_bytes)
            .field("min_entropy_bytes", &self.min_entropy_bytes)
            .field("seed_count", &state.seed_count)
            .finish_non_exhaustive()
    }
}
