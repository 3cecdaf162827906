/// A dense, fixed-length vector of hashed feature weights.
///
/// Supports exactly what the encoder needs: indexed reads and additive
/// writes. The length never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Box<[f64]>,
}

impl FeatureVector {
    /// A zero vector of length `len`.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len].into_boxed_slice(),
        }
    }

    /// Weight stored at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// Add `weight` to the slot at `index`, saturating at the finite range
    /// of `f64`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn add(&mut self, index: usize, weight: f64) {
        self.values[index] = (self.values[index] + weight).clamp(f64::MIN, f64::MAX);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.values.into_vec()
    }
}
