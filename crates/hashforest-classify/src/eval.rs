//! Stratified k-fold cross-validation of the batch classifier over raw rows.

use hashforest_rf::{ConfusionMatrix, argmax};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::classifier::BatchClassifier;
use crate::config::ClassifierConfig;
use crate::error::ClassifyError;
use crate::rows::RowSource;
use crate::spec::DataSpecification;

/// Cross-validation settings.
///
/// Construct via [`CrossValidation::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
    seed: u64,
}

/// Results of stratified k-fold cross-validation.
///
/// Class ids in the confusion matrix index into `labels`, the vocabulary of
/// the whole dataset in first-seen order. Each fold's classifier has its own
/// vocabulary; predictions are mapped back by label string.
#[derive(Debug, Clone, Serialize)]
pub struct CrossValidationResult {
    /// Accuracy for each fold.
    pub fold_accuracies: Vec<f64>,
    /// Accuracy of always predicting the fold's majority training label.
    pub baseline_accuracies: Vec<f64>,
    pub mean_accuracy: f64,
    pub std_accuracy: f64,
    pub mean_baseline_accuracy: f64,
    /// Summed over all folds.
    pub confusion_matrix: ConfusionMatrix,
    pub labels: Vec<String>,
    pub n_folds: usize,
    pub n_samples: usize,
}

impl CrossValidation {
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, ClassifyError> {
        if n_folds < 2 {
            return Err(ClassifyError::InvalidFoldCount { n_folds });
        }
        Ok(Self { n_folds, seed: 42 })
    }

    /// Seed for fold assignment. Fold `k` trains with `config` seed + `k`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Run stratified k-fold cross-validation over every row of `rows`.
    ///
    /// Each fold trains a fresh [`BatchClassifier`] on a clone of `spec`.
    ///
    /// # Errors
    ///
    /// | Variant                                    | When                                    |
    /// |--------------------------------------------|-----------------------------------------|
    /// | [`ClassifyError::EmptyDataset`]            | `rows` has no rows                      |
    /// | [`ClassifyError::MissingValue`]            | a label or feature cell is missing      |
    /// | [`ClassifyError::TooFewSamplesForFolds`]   | a label occurs in fewer rows than folds |
    /// | [`ClassifyError::Training`]                | a fold's forest could not be fitted     |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = rows.num_rows()))]
    pub fn evaluate<R: RowSource + ?Sized>(
        &self,
        spec: &DataSpecification,
        config: &ClassifierConfig,
        rows: &R,
    ) -> Result<CrossValidationResult, ClassifyError> {
        let n_samples = rows.num_rows();
        if n_samples == 0 {
            return Err(ClassifyError::EmptyDataset);
        }

        let mut vocabulary = spec.clone();
        let column = spec.label_column();
        let truth = (0..n_samples)
            .map(|row| {
                let raw = rows
                    .value(row, column)
                    .ok_or(ClassifyError::MissingValue { row, column })?;
                vocabulary.encode_label(raw)
            })
            .collect::<Result<Vec<usize>, ClassifyError>>()?;
        let labels = vocabulary.label_map().names().to_vec();
        let n_classes = labels.len();

        let folds = self.stratified_split(&truth, &labels)?;

        let mut fold_accuracies = Vec::with_capacity(self.n_folds);
        let mut baseline_accuracies = Vec::with_capacity(self.n_folds);
        let mut confusion_matrix = ConfusionMatrix::new(n_classes);

        for fold in 0..self.n_folds {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..n_samples).partition(|&row| folds[row] == fold);

            let fold_config = config
                .clone()
                .with_seed(config.forest().seed().wrapping_add(fold as u64));
            let mut classifier = BatchClassifier::new(spec.clone(), fold_config);
            classifier.train_rows(rows, rows, train.iter().copied())?;
            classifier.close()?;

            let mut train_counts = vec![0usize; n_classes];
            for &row in &train {
                train_counts[truth[row]] += 1;
            }
            let majority = argmax(&train_counts.iter().map(|&c| c as f64).collect::<Vec<_>>());

            let mut correct = 0usize;
            let mut baseline_correct = 0usize;
            for &row in &test {
                let result = classifier.classify(rows, row)?;
                let predicted = vocabulary
                    .label_map()
                    .id(result.predicted_label())
                    .unwrap_or(majority);
                confusion_matrix.record(truth[row], predicted);
                correct += usize::from(predicted == truth[row]);
                baseline_correct += usize::from(majority == truth[row]);
            }

            let accuracy = correct as f64 / test.len() as f64;
            let baseline = baseline_correct as f64 / test.len() as f64;
            fold_accuracies.push(accuracy);
            baseline_accuracies.push(baseline);
            info!(fold, accuracy, baseline, "fold completed");
        }

        let mean_accuracy = mean(&fold_accuracies);
        let std_accuracy = {
            let variance = fold_accuracies
                .iter()
                .map(|&a| (a - mean_accuracy).powi(2))
                .sum::<f64>()
                / self.n_folds as f64;
            variance.sqrt()
        };
        let mean_baseline_accuracy = mean(&baseline_accuracies);

        info!(
            mean_accuracy,
            std_accuracy,
            mean_baseline_accuracy,
            "cross-validation complete"
        );

        Ok(CrossValidationResult {
            fold_accuracies,
            baseline_accuracies,
            mean_accuracy,
            std_accuracy,
            mean_baseline_accuracy,
            confusion_matrix,
            labels,
            n_folds: self.n_folds,
            n_samples,
        })
    }

    /// Shuffle the rows of each label, then deal them round-robin over the folds.
    fn stratified_split(
        &self,
        truth: &[usize],
        labels: &[String],
    ) -> Result<Vec<usize>, ClassifyError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut by_label: Vec<Vec<usize>> = vec![vec![]; labels.len()];
        for (row, &label) in truth.iter().enumerate() {
            by_label[label].push(row);
        }

        for (label, rows) in labels.iter().zip(&by_label) {
            if !rows.is_empty() && rows.len() < self.n_folds {
                return Err(ClassifyError::TooFewSamplesForFolds {
                    label: label.clone(),
                    count: rows.len(),
                    n_folds: self.n_folds,
                });
            }
        }

        let mut folds = vec![0usize; truth.len()];
        for rows in &mut by_label {
            rows.shuffle(&mut rng);
            for (j, &row) in rows.iter().enumerate() {
                folds[row] = j % self.n_folds;
            }
        }
        debug!(n_labels = labels.len(), "folds assigned");
        Ok(folds)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
