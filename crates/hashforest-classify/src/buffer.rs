use crate::vector::FeatureVector;

/// Encoded rows and their class ids, accumulated until the classifier closes.
#[derive(Debug, Default)]
pub struct TrainingBuffer {
    vectors: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl TrainingBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, vector: FeatureVector, class_id: usize) {
        self.vectors.push(vector.into_vec());
        self.labels.push(class_id);
    }

    /// Take the accumulated `(matrix, labels)` and leave the buffer empty.
    pub fn drain(&mut self) -> (Vec<Vec<f64>>, Vec<usize>) {
        (
            std::mem::take(&mut self.vectors),
            std::mem::take(&mut self.labels),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
