//! Hyper-parameters for random forest training.

use crate::error::ForestError;
use crate::forest::RandomForest;
use crate::split::SplitCriterion;

/// How many columns a node examines when searching for a split.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1.
    Sqrt,
    /// `floor(log2(n_features)) + 1`.
    Log2,
    /// A fraction of the columns, rounded up.
    Fraction(f64),
    /// A fixed count.
    Fixed(usize),
    /// Every column.
    All,
}

impl MaxFeatures {
    /// Resolve to a concrete column count for a matrix of `n_features` columns.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidMaxFeatures`] when the count falls outside
    /// `[1, n_features]`.
    pub fn resolve(self, n_features: usize) -> Result<usize, ForestError> {
        let resolved = match self {
            MaxFeatures::Sqrt => ((n_features as f64).sqrt().floor() as usize).max(1),
            MaxFeatures::Log2 => (n_features as f64).log2().floor() as usize + 1,
            MaxFeatures::Fraction(f) => (n_features as f64 * f).ceil() as usize,
            MaxFeatures::Fixed(n) => n,
            MaxFeatures::All => n_features,
        };
        if resolved == 0 || resolved > n_features {
            return Err(ForestError::InvalidMaxFeatures {
                max_features: resolved,
                n_features,
            });
        }
        Ok(resolved)
    }
}

/// Tree count used by [`RandomForestConfig::default`].
pub const DEFAULT_TREES: usize = 500;

/// Configuration for [`RandomForest`] training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default            |
/// |---------------------|--------------------|
/// | `max_features`      | `Sqrt`             |
/// | `max_depth`         | `None` (unlimited) |
/// | `min_samples_split` | 2                  |
/// | `min_samples_leaf`  | 1                  |
/// | `criterion`         | `Gini`             |
/// | `subsample`         | 1.0                |
/// | `seed`              | 42                 |
///
/// A `subsample` of 1.0 draws a bootstrap sample (with replacement) of the
/// full row count per tree; smaller fractions draw that share of the rows
/// without replacement.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RandomForestConfig {
    n_trees: usize,
    max_features: MaxFeatures,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    criterion: SplitCriterion,
    subsample: f64,
    seed: u64,
}

impl RandomForestConfig {
    /// Create a config for a forest of `n_trees` trees.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, ForestError> {
        if n_trees == 0 {
            return Err(ForestError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            ..Self::default()
        })
    }

    /// Set the per-node column sampling strategy.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the depth limit; `None` grows until leaves are pure.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum node size eligible for splitting.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of rows each child must receive.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the split criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the per-tree sampling fraction.
    #[must_use]
    pub fn with_subsample(mut self, subsample: f64) -> Self {
        self.subsample = subsample;
        self
    }

    /// Set the master seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    #[must_use]
    pub fn min_samples_leaf(&self) -> usize {
        self.min_samples_leaf
    }

    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    #[must_use]
    pub fn subsample(&self) -> f64 {
        self.subsample
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Check the parameters that do not depend on the data.
    ///
    /// # Errors
    ///
    /// | Variant                                  | When                          |
    /// |------------------------------------------|-------------------------------|
    /// | [`ForestError::InvalidMaxDepth`]         | `max_depth` is `Some(0)`      |
    /// | [`ForestError::InvalidMinSamplesSplit`]  | `min_samples_split` < 2       |
    /// | [`ForestError::InvalidMinSamplesLeaf`]   | `min_samples_leaf` is 0       |
    /// | [`ForestError::InvalidSubsample`]        | `subsample` not in (0, 1]     |
    pub fn validate(&self) -> Result<(), ForestError> {
        if self.max_depth == Some(0) {
            return Err(ForestError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(ForestError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf == 0 {
            return Err(ForestError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(ForestError::InvalidSubsample {
                subsample: self.subsample,
            });
        }
        Ok(())
    }

    /// Fit a forest on row-major `rows` with dense labels in `[0, n_classes)`.
    ///
    /// Runs synchronously; trees are built in parallel on the rayon pool.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                      |
    /// |--------------------------------------|-------------------------------------------|
    /// | [`ForestError::EmptyDataset`]        | `rows` is empty                           |
    /// | [`ForestError::ZeroFeatures`]        | rows have no columns                      |
    /// | [`ForestError::LabelCountMismatch`]  | `labels.len() != rows.len()`              |
    /// | [`ForestError::RaggedRow`]           | rows differ in width                      |
    /// | [`ForestError::NonFiniteValue`]      | a value is NaN or infinite                |
    /// | [`ForestError::LabelOutOfRange`]     | a label is `>= n_classes`                 |
    /// | [`ForestError::TooFewClasses`]       | fewer than two distinct labels            |
    /// | [`ForestError::InvalidMaxFeatures`]  | `max_features` does not fit the width     |
    /// | any [`validate`](Self::validate) error | invalid hyper-parameters                |
    pub fn fit(
        &self,
        rows: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
    ) -> Result<RandomForest, ForestError> {
        crate::forest::train(self, rows, labels, n_classes)
    }
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_TREES,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: SplitCriterion::Gini,
            subsample: 1.0,
            seed: 42,
        }
    }
}
