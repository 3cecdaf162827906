use hashforest_rf::ForestError;

use crate::classifier::{ClassifierState, Operation};

/// Errors from specification building, encoding, the classifier lifecycle
/// and cross-validation.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// An operation was invoked in a state that does not allow it.
    #[error("cannot {operation} a classifier that is {state}")]
    Lifecycle {
        /// The rejected operation.
        operation: Operation,
        /// State of the classifier at the time of the call.
        state: ClassifierState,
    },

    /// A label was seen for the first time after the vocabulary was frozen.
    #[error("label \"{label}\" is not known and the label vocabulary is frozen")]
    InvalidLabel {
        /// The unknown raw label.
        label: String,
    },

    /// The batch trainer could not produce a model.
    #[error("random forest training failed")]
    Training {
        /// Underlying trainer error.
        #[source]
        source: ForestError,
    },

    /// The fitted forest rejected a query vector.
    #[error("random forest prediction failed")]
    Prediction {
        /// Underlying forest error.
        #[source]
        source: ForestError,
    },

    /// The row source has no value at the requested cell.
    #[error("no value at row {row}, column {column}")]
    MissingValue {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
    },

    /// The data specification is internally inconsistent.
    #[error("invalid data specification: {reason}")]
    InvalidSpecification {
        /// Human-readable description of the inconsistency.
        reason: String,
    },

    /// The classifier configuration is unusable.
    #[error("invalid classifier configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },

    /// Cross-validation needs at least two folds.
    #[error("number of folds must be at least 2, got {n_folds}")]
    InvalidFoldCount {
        /// The rejected fold count.
        n_folds: usize,
    },

    /// Cross-validation was asked to evaluate zero rows.
    #[error("no rows to evaluate")]
    EmptyDataset,

    /// A label occurs in fewer rows than there are folds.
    #[error("label \"{label}\" occurs in {count} rows, stratified cross-validation needs at least {n_folds}")]
    TooFewSamplesForFolds {
        /// The under-represented label.
        label: String,
        /// Rows carrying the label.
        count: usize,
        /// Requested fold count.
        n_folds: usize,
    },
}
