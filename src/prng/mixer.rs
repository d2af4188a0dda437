//! Hash-based key derivation for the shared PRNG.
//!
//! Every seed call replaces the generator key with
//! `H(domain || counter || previous key || input)`, so new bytes can
//! only add to the state and never overwrite what came before.

use blake3::Hasher as Blake3Hasher;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Domain separator for key derivation.
const MIX_DOMAIN: &[u8] = b"prng-seed-mix-v1";

/// Supported hash algorithms for mixing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// BLAKE3 - fast, secure, recommended default.
    #[default]
    Blake3,
    /// SHA-256 - widely deployed, conservative choice.
    Sha256,
}

/// Derives a new 32-byte key from the previous key and fresh input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mixer {
    algorithm: HashAlgorithm,
}

impl Mixer {
    /// Creates a new mixer with the specified algorithm.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Returns the configured algorithm.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Mixes `input` into `previous`, returning the next key.
    pub fn mix(&self, counter: u64, previous: &[u8; 32], input: &[u8]) -> [u8; 32] {
        match self.algorithm {
            HashAlgorithm::Blake3 => {
                let mut hasher = Blake3Hasher::new();
                hasher.update(MIX_DOMAIN);
                hasher.update(&counter.to_le_bytes());
                hasher.update(previous);
                hasher.update(input);
                *hasher.finalize().as_bytes()
            }
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(MIX_DOMAIN);
                hasher.update(counter.to_le_bytes());
                hasher.update(previous);
                hasher.update(input);
                let result = hasher.finalize();
                let mut key = [0u8; 32];
                key.copy_from_slice(&result);
                key
            }
        }
    }
}
