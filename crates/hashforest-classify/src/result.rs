use std::sync::Arc;

use hashforest_rf::argmax;

use crate::spec::LabelMap;

/// Outcome of classifying one row.
///
/// `probabilities` has one entry per class known when the classifier
/// closed, indexed by class id. The predicted class is always the first
/// maximum of the probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    predicted: usize,
    probabilities: Vec<f64>,
    labels: Arc<LabelMap>,
}

impl ClassificationResult {
    pub(crate) fn new(probabilities: Vec<f64>, labels: Arc<LabelMap>) -> Self {
        Self {
            predicted: argmax(&probabilities),
            probabilities,
            labels,
        }
    }

    #[must_use]
    pub fn predicted_class(&self) -> usize {
        self.predicted
    }

    /// Label string of the predicted class.
    #[must_use]
    pub fn predicted_label(&self) -> &str {
        self.labels.name(self.predicted).unwrap_or_default()
    }

    #[must_use]
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Probability assigned to the predicted class.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.probabilities
            .get(self.predicted)
            .copied()
            .unwrap_or_default()
    }

    /// Probability of `label`, or `None` if the label was never seen in training.
    #[must_use]
    pub fn probability_of(&self, label: &str) -> Option<f64> {
        self.labels
            .id(label)
            .and_then(|id| self.probabilities.get(id).copied())
    }

    /// Whether the prediction matches the raw label `actual`.
    #[must_use]
    pub fn is_correct(&self, actual: &str) -> bool {
        self.labels.id(actual) == Some(self.predicted)
    }

    /// The frozen label vocabulary shared with the classifier.
    #[must_use]
    pub fn label_map(&self) -> &LabelMap {
        &self.labels
    }
}
