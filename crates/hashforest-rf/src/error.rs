/// Errors raised while validating or fitting a random forest.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when the forest would contain no trees.
    #[error("number of trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The rejected tree count.
        n_trees: usize,
    },

    /// Returned when a depth limit of zero is requested.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The rejected depth limit.
        max_depth: usize,
    },

    /// Returned when min_samples_split is below 2.
    #[error("min_samples_split must be at least 2, got {min_samples_split}")]
    InvalidMinSamplesSplit {
        /// The rejected value.
        min_samples_split: usize,
    },

    /// Returned when min_samples_leaf is zero.
    #[error("min_samples_leaf must be at least 1, got {min_samples_leaf}")]
    InvalidMinSamplesLeaf {
        /// The rejected value.
        min_samples_leaf: usize,
    },

    /// Returned when max_features resolves outside `[1, n_features]`.
    #[error("max_features resolved to {max_features}, expected a value in [1, {n_features}]")]
    InvalidMaxFeatures {
        /// The resolved feature count.
        max_features: usize,
        /// Width of the training matrix.
        n_features: usize,
    },

    /// Returned when the subsample fraction is not in `(0.0, 1.0]`.
    #[error("subsample must be in (0.0, 1.0], got {subsample}")]
    InvalidSubsample {
        /// The rejected fraction.
        subsample: f64,
    },

    /// Returned when the training matrix has no rows.
    #[error("training data has zero rows")]
    EmptyDataset,

    /// Returned when the training rows have no columns.
    #[error("training rows have zero columns")]
    ZeroFeatures,

    /// Returned when the label vector and the matrix disagree in length.
    #[error("{n_labels} labels supplied for {n_rows} training rows")]
    LabelCountMismatch {
        /// Number of matrix rows.
        n_rows: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when a row is wider or narrower than the first row.
    #[error("row {row} has {got} columns, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        got: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at row {row}, column {column}")]
    NonFiniteValue {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
    },

    /// Returned when a label is not below the declared class count.
    #[error("label {label} at row {row} is out of range for {n_classes} classes")]
    LabelOutOfRange {
        /// Zero-based row index.
        row: usize,
        /// The offending label.
        label: usize,
        /// Declared number of classes.
        n_classes: usize,
    },

    /// Returned when the labels contain fewer than two distinct classes.
    #[error("training data contains {observed} distinct class(es), at least 2 are required")]
    TooFewClasses {
        /// Number of distinct classes present in the labels.
        observed: usize,
    },

    /// Returned when a query vector does not match the trained width.
    #[error("query has {got} columns, model was trained on {expected}")]
    QueryWidthMismatch {
        /// Width seen during training.
        expected: usize,
        /// Width of the query.
        got: usize,
    },
}
