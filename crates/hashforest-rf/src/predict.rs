//! Querying a fitted forest.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::ForestError;
use crate::forest::RandomForest;

/// Averaged per-class probabilities for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    probs: Vec<f64>,
}

impl ClassDistribution {
    /// Index of the largest probability; the lowest index wins ties.
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        argmax(&self.probs)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.probs
    }
}

/// Index of the first maximum of `values`, or 0 for an empty slice.
#[must_use]
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

impl RandomForest {
    /// Average the leaf distributions of every tree for one row.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::QueryWidthMismatch`] when `row.len()` differs
    /// from the trained width.
    pub fn predict_proba(&self, row: &[f64]) -> Result<ClassDistribution, ForestError> {
        if row.len() != self.n_features {
            return Err(ForestError::QueryWidthMismatch {
                expected: self.n_features,
                got: row.len(),
            });
        }
        let mut probs = vec![0.0f64; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in probs.iter_mut().zip(tree.leaf_distribution(row)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        probs.iter_mut().for_each(|p| *p /= n);
        Ok(ClassDistribution { probs })
    }

    /// Predict the class of one row.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::QueryWidthMismatch`] on a width mismatch.
    pub fn predict(&self, row: &[f64]) -> Result<usize, ForestError> {
        Ok(self.predict_proba(row)?.predicted_class())
    }

    /// Predict many rows in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::QueryWidthMismatch`] if any row has the wrong width.
    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>, ForestError> {
        rows.into_par_iter().map(|row| self.predict(row)).collect()
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}
