//! JSON artifacts for evaluation and prediction runs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use hashforest_classify::{ClassificationResult, ClassifierConfig, CrossValidationResult};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::experiment::ExperimentName;

/// Writes run results to JSON files in one output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_evaluation.json` and
/// `{experiment}_predictions.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

#[derive(Serialize)]
struct EvaluationArtifact<'a> {
    experiment: &'a str,
    n_samples: usize,
    n_folds: usize,
    labels: &'a [String],
    config: &'a ClassifierConfig,
    cv_accuracy_mean: f64,
    cv_accuracy_std: f64,
    fold_accuracies: &'a [f64],
    baseline_accuracy_mean: f64,
    baseline_fold_accuracies: &'a [f64],
    confusion_matrix: &'a [Vec<usize>],
    class_metrics: Vec<ClassEntry<'a>>,
}

#[derive(Serialize)]
struct ClassEntry<'a> {
    label: &'a str,
    precision: f64,
    recall: f64,
    f1: f64,
    support: usize,
}

#[derive(Serialize)]
struct PredictionArtifact<'a> {
    experiment: &'a str,
    labels: &'a [String],
    n_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    accuracy: Option<f64>,
    predictions: Vec<PredictionEntry<'a>>,
}

#[derive(Serialize)]
struct PredictionEntry<'a> {
    row: usize,
    predicted: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    actual: Option<&'a str>,
    confidence: f64,
    probabilities: BTreeMap<&'a str, f64>,
}

impl ResultWriter {
    /// Create a writer targeting `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    fn path_for(&self, kind: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{kind}.json", self.experiment.as_str()))
    }

    fn write_json<T: Serialize>(&self, path: &Path, artifact: &T) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write a cross-validation result to `{experiment}_evaluation.json`.
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all)]
    pub fn write_evaluation(
        &self,
        config: &ClassifierConfig,
        result: &CrossValidationResult,
    ) -> Result<PathBuf, IoError> {
        let path = self.path_for("evaluation");

        let class_metrics = result
            .confusion_matrix
            .class_metrics()
            .into_iter()
            .map(|m| ClassEntry {
                label: result.labels.get(m.class).map_or("", String::as_str),
                precision: m.precision,
                recall: m.recall,
                f1: m.f1,
                support: m.support,
            })
            .collect();

        let artifact = EvaluationArtifact {
            experiment: self.experiment.as_str(),
            n_samples: result.n_samples,
            n_folds: result.n_folds,
            labels: &result.labels,
            config,
            cv_accuracy_mean: result.mean_accuracy,
            cv_accuracy_std: result.std_accuracy,
            fold_accuracies: &result.fold_accuracies,
            baseline_accuracy_mean: result.mean_baseline_accuracy,
            baseline_fold_accuracies: &result.baseline_accuracies,
            confusion_matrix: result.confusion_matrix.as_rows(),
            class_metrics,
        };
        self.write_json(&path, &artifact)?;

        info!(path = %path.display(), "evaluation result written");
        Ok(path)
    }

    /// Write per-row classifications to `{experiment}_predictions.json`.
    ///
    /// `actual` holds the true label of each row when known; the artifact
    /// then also records the accuracy. Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all, fields(n_rows = results.len()))]
    pub fn write_predictions(
        &self,
        labels: &[String],
        results: &[ClassificationResult],
        actual: Option<&[String]>,
    ) -> Result<PathBuf, IoError> {
        let path = self.path_for("predictions");

        let predictions: Vec<PredictionEntry<'_>> = results
            .iter()
            .enumerate()
            .map(|(row, result)| PredictionEntry {
                row,
                predicted: result.predicted_label(),
                actual: actual.and_then(|a| a.get(row)).map(String::as_str),
                confidence: result.confidence(),
                probabilities: labels
                    .iter()
                    .map(String::as_str)
                    .zip(result.probabilities().iter().copied())
                    .collect(),
            })
            .collect();

        let accuracy = actual.filter(|_| !results.is_empty()).map(|a| {
            let correct = results
                .iter()
                .zip(a)
                .filter(|(r, truth)| r.is_correct(truth))
                .count();
            correct as f64 / results.len() as f64
        });

        let artifact = PredictionArtifact {
            experiment: self.experiment.as_str(),
            labels,
            n_rows: results.len(),
            accuracy,
            predictions,
        };
        self.write_json(&path, &artifact)?;

        info!(path = %path.display(), "predictions written");
        Ok(path)
    }
}
