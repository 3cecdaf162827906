//! Host-supplied settings for a [`BatchClassifier`](crate::BatchClassifier).

use hashforest_rf::RandomForestConfig;
use serde::Serialize;

use crate::error::ClassifyError;

/// Encoder width, hashing probes and forest hyper-parameters.
///
/// # Defaults
///
/// | Parameter       | Default                          |
/// |-----------------|----------------------------------|
/// | `vector_length` | 1000 ([`DEFAULT_VECTOR_LENGTH`]) |
/// | `n_trees`       | 500                              |
/// | `probes`        | 1                                |
/// | forest          | [`RandomForestConfig`] defaults  |
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierConfig {
    vector_length: usize,
    probes: usize,
    forest: RandomForestConfig,
}

/// Default encoded vector width.
pub const DEFAULT_VECTOR_LENGTH: usize = 1000;

impl ClassifierConfig {
    /// Vectors of `vector_length` slots, a forest of `n_trees` trees.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidConfig`] when either argument is zero.
    pub fn new(vector_length: usize, n_trees: usize) -> Result<Self, ClassifyError> {
        if vector_length == 0 {
            return Err(ClassifyError::InvalidConfig {
                reason: "vector length must be at least 1".into(),
            });
        }
        let forest = RandomForestConfig::new(n_trees).map_err(|e| ClassifyError::InvalidConfig {
            reason: e.to_string(),
        })?;
        Ok(Self {
            vector_length,
            probes: 1,
            forest,
        })
    }

    /// Hash every token into `probes` slots.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidConfig`] when `probes` is zero.
    pub fn with_probes(mut self, probes: usize) -> Result<Self, ClassifyError> {
        if probes == 0 {
            return Err(ClassifyError::InvalidConfig {
                reason: "probes must be at least 1".into(),
            });
        }
        self.probes = probes;
        Ok(self)
    }

    /// Replace the forest hyper-parameters, tree count included.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidConfig`] when `forest` fails
    /// [`RandomForestConfig::validate`].
    pub fn with_forest(mut self, forest: RandomForestConfig) -> Result<Self, ClassifyError> {
        forest.validate().map_err(|e| ClassifyError::InvalidConfig {
            reason: e.to_string(),
        })?;
        self.forest = forest;
        Ok(self)
    }

    /// Seed the forest's master RNG.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.forest = self.forest.with_seed(seed);
        self
    }

    #[must_use]
    pub fn vector_length(&self) -> usize {
        self.vector_length
    }

    #[must_use]
    pub fn probes(&self) -> usize {
        self.probes
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }

    #[must_use]
    pub fn forest(&self) -> &RandomForestConfig {
        &self.forest
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            vector_length: DEFAULT_VECTOR_LENGTH,
            probes: 1,
            forest: RandomForestConfig::default(),
        }
    }
}
