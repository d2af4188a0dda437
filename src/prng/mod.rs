//! The PRNG being seeded.
//!
//! The orchestrator only needs two things from a PRNG: a way to mix bytes
//! into its state, and a way to ask whether it has seen enough entropy.
//! [`Prng`] captures exactly that and is passed in as an explicit handle,
//! so tests can substitute a recording fake for the real generator.

mod mixer;
mod shared;

pub use mixer::{HashAlgorithm, Mixer};
pub use shared::{PrngConfig, PrngError, SharedPrng};

use std::sync::Arc;

/// A seedable, process-wide PRNG.
///
/// Methods take `&self`: implementations are shared between threads and
/// serialize access internally.
pub trait Prng {
    /// Mixes `bytes` into the internal state. Cannot fail.
    fn seed(&self, bytes: &[u8]);

    /// Returns true once enough entropy has been mixed in.
    fn is_sufficiently_seeded(&self) -> bool;
}

impl<T: Prng + ?Sized> Prng for &T {
    fn seed(&self, bytes: &[u8]) {
        (**self).seed(bytes)
    }

    fn is_sufficiently_seeded(&self) -> bool {
        (**self).is_sufficiently_seeded()
    }
}

impl<T: Prng + ?Sized> Prng for Arc<T> {
    fn seed(&self, bytes: &[u8]) {
        (**self).seed(bytes)
    }

    fn is_sufficiently_seeded(&self) -> bool {
        (**self).is_sufficiently_seeded()
    }
}
