//! Token hashing for bounded-width feature vectors.
//!
//! A token is hashed with 64-bit FNV-1a, seeded per probe, then passed
//! through the splitmix64 finalizer and reduced modulo the vector width.
//! Neither step depends on process state, so slots are stable across
//! encoder instances, runs and machines.

use crate::config::ClassifierConfig;
use crate::error::ClassifyError;
use crate::vector::FeatureVector;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
const PROBE_STEP: u64 = 0x9e37_79b9_7f4a_7c15;

fn fnv1a(bytes: &[u8], seed: u64) -> u64 {
    let mut h = FNV_OFFSET ^ seed;
    for &b in bytes {
        h ^= u64::from(b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(PROBE_STEP);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Maps tokens to one or more slots of a `dimensions`-wide vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenHasher {
    dimensions: usize,
    probes: usize,
}

impl TokenHasher {
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidConfig`] when `dimensions` or `probes`
    /// is zero.
    pub fn new(dimensions: usize, probes: usize) -> Result<Self, ClassifyError> {
        if dimensions == 0 {
            return Err(ClassifyError::InvalidConfig {
                reason: "vector length must be at least 1".into(),
            });
        }
        if probes == 0 {
            return Err(ClassifyError::InvalidConfig {
                reason: "probes must be at least 1".into(),
            });
        }
        Ok(Self { dimensions, probes })
    }

    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[must_use]
    pub fn probes(&self) -> usize {
        self.probes
    }

    /// The slots `token` contributes to, one per probe.
    pub fn slots<'a>(&self, token: &'a str) -> impl Iterator<Item = usize> + 'a {
        let dimensions = self.dimensions as u64;
        (0..self.probes as u64).map(move |probe| {
            let h = splitmix64(fnv1a(token.as_bytes(), probe.wrapping_mul(PROBE_STEP)));
            (h % dimensions) as usize
        })
    }

    /// Add `weight` at every slot of `token`.
    pub fn add_to(&self, token: &str, weight: f64, vector: &mut FeatureVector) {
        for slot in self.slots(token) {
            vector.add(slot, weight);
        }
    }
}

impl From<&ClassifierConfig> for TokenHasher {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            dimensions: config.vector_length(),
            probes: config.probes(),
        }
    }
}
