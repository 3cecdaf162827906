//! The fit-once batch classifier.

use std::fmt;
use std::sync::Arc;

use hashforest_rf::RandomForest;
use tracing::{debug, info, instrument, warn};

use crate::buffer::TrainingBuffer;
use crate::config::ClassifierConfig;
use crate::encoder::FeatureEncoder;
use crate::error::ClassifyError;
use crate::result::ClassificationResult;
use crate::rows::RowSource;
use crate::spec::{DataSpecification, LabelMap};

/// Lifecycle state of a [`BatchClassifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierState {
    /// Accepting training rows.
    Open,
    /// Inside `close`, fitting the forest.
    Fitting,
    /// Model fitted; classification allowed.
    Closed,
    /// Fitting failed; no further operation is allowed.
    Failed,
}

impl fmt::Display for ClassifierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClassifierState::Open => "open",
            ClassifierState::Fitting => "fitting",
            ClassifierState::Closed => "closed",
            ClassifierState::Failed => "failed",
        })
    }
}

/// Operations gated by the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Train,
    Close,
    Classify,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Train => "train",
            Operation::Close => "close",
            Operation::Classify => "classify",
        })
    }
}

#[derive(Debug)]
enum Phase {
    Open(TrainingBuffer),
    Fitting,
    Closed {
        model: RandomForest,
        labels: Arc<LabelMap>,
    },
    Failed,
}

impl Phase {
    fn state(&self) -> ClassifierState {
        match self {
            Phase::Open(_) => ClassifierState::Open,
            Phase::Fitting => ClassifierState::Fitting,
            Phase::Closed { .. } => ClassifierState::Closed,
            Phase::Failed => ClassifierState::Failed,
        }
    }
}

/// Accumulates encoded rows, fits a random forest once, then classifies.
///
/// ```text
/// Open --train--> Open --close--> Fitting --ok--> Closed --classify--> Closed
///                                         \--err--> Failed
/// ```
///
/// The classifier owns its [`DataSpecification`], so the label vocabulary
/// is private to this instance.
#[derive(Debug)]
pub struct BatchClassifier {
    spec: DataSpecification,
    encoder: FeatureEncoder,
    config: ClassifierConfig,
    phase: Phase,
}

impl BatchClassifier {
    #[must_use]
    pub fn new(spec: DataSpecification, config: ClassifierConfig) -> Self {
        Self {
            encoder: FeatureEncoder::from(&config),
            spec,
            config,
            phase: Phase::Open(TrainingBuffer::new()),
        }
    }

    #[must_use]
    pub fn state(&self) -> ClassifierState {
        self.phase.state()
    }

    /// Rows buffered so far; 0 once the classifier has closed.
    #[must_use]
    pub fn buffered_rows(&self) -> usize {
        match &self.phase {
            Phase::Open(buffer) => buffer.len(),
            _ => 0,
        }
    }

    #[must_use]
    pub fn specification(&self) -> &DataSpecification {
        &self.spec
    }

    #[must_use]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// The fitted forest, once closed.
    #[must_use]
    pub fn model(&self) -> Option<&RandomForest> {
        match &self.phase {
            Phase::Closed { model, .. } => Some(model),
            _ => None,
        }
    }

    fn lifecycle(&self, operation: Operation) -> ClassifyError {
        ClassifyError::Lifecycle {
            operation,
            state: self.state(),
        }
    }

    /// Encode `row` of `features`, read its label from `labels` and buffer both.
    ///
    /// # Errors
    ///
    /// | Variant                           | When                                   |
    /// |-----------------------------------|----------------------------------------|
    /// | [`ClassifyError::Lifecycle`]      | the classifier is not open             |
    /// | [`ClassifyError::MissingValue`]   | a feature or the label cell is missing |
    /// | [`ClassifyError::InvalidLabel`]   | the vocabulary was frozen beforehand   |
    pub fn train<F, L>(
        &mut self,
        features: &F,
        labels: &L,
        row: usize,
    ) -> Result<(), ClassifyError>
    where
        F: RowSource + ?Sized,
        L: RowSource + ?Sized,
    {
        if !matches!(self.phase, Phase::Open(_)) {
            return Err(self.lifecycle(Operation::Train));
        }
        let vector = self.encoder.encode_row(&self.spec, features, row)?;
        let column = self.spec.label_column();
        let raw = labels
            .value(row, column)
            .ok_or(ClassifyError::MissingValue { row, column })?;
        let class_id = self.spec.encode_label(raw)?;
        if let Phase::Open(buffer) = &mut self.phase {
            buffer.append(vector, class_id);
        }
        Ok(())
    }

    /// [`train`](Self::train) on every row in `rows`, stopping at the first error.
    ///
    /// Returns the number of rows buffered by this call.
    ///
    /// # Errors
    ///
    /// See [`train`](Self::train).
    pub fn train_rows<F, L, I>(
        &mut self,
        features: &F,
        labels: &L,
        rows: I,
    ) -> Result<usize, ClassifyError>
    where
        F: RowSource + ?Sized,
        L: RowSource + ?Sized,
        I: IntoIterator<Item = usize>,
    {
        let mut count = 0;
        for row in rows {
            self.train(features, labels, row)?;
            count += 1;
        }
        Ok(count)
    }

    /// Freeze the vocabulary, fit the forest on the buffered rows and drop
    /// the buffer.
    ///
    /// Blocks until every tree is built.
    ///
    /// # Errors
    ///
    /// | Variant                       | When                                          |
    /// |-------------------------------|-----------------------------------------------|
    /// | [`ClassifyError::Lifecycle`]  | the classifier is not open                    |
    /// | [`ClassifyError::Training`]   | the trainer rejected the data; state `Failed` |
    #[instrument(skip_all, fields(rows = self.buffered_rows(), n_trees = self.config.n_trees()))]
    pub fn close(&mut self) -> Result<(), ClassifyError> {
        let mut buffer = match std::mem::replace(&mut self.phase, Phase::Fitting) {
            Phase::Open(buffer) => buffer,
            other => {
                self.phase = other;
                return Err(self.lifecycle(Operation::Close));
            }
        };
        self.spec.freeze();

        let (matrix, labels) = buffer.drain();
        let n_classes = self.spec.num_classes();
        debug!(rows = matrix.len(), n_classes, "fitting forest");

        match self.config.forest().fit(&matrix, &labels, n_classes) {
            Ok(model) => {
                info!(n_trees = model.n_trees(), n_classes, "classifier closed");
                self.phase = Phase::Closed {
                    model,
                    labels: Arc::new(self.spec.label_map().clone()),
                };
                Ok(())
            }
            Err(source) => {
                warn!(error = %source, "forest training failed");
                self.phase = Phase::Failed;
                Err(ClassifyError::Training { source })
            }
        }
    }

    /// Classify `row` of `features` with the fitted forest.
    ///
    /// # Errors
    ///
    /// | Variant                          | When                          |
    /// |----------------------------------|-------------------------------|
    /// | [`ClassifyError::Lifecycle`]     | the classifier is not closed  |
    /// | [`ClassifyError::MissingValue`]  | a feature cell is missing     |
    /// | [`ClassifyError::Prediction`]    | the forest rejected the query |
    pub fn classify<F>(
        &self,
        features: &F,
        row: usize,
    ) -> Result<ClassificationResult, ClassifyError>
    where
        F: RowSource + ?Sized,
    {
        let Phase::Closed { model, labels } = &self.phase else {
            return Err(self.lifecycle(Operation::Classify));
        };
        let vector = self.encoder.encode_row(&self.spec, features, row)?;
        let distribution = model
            .predict_proba(vector.as_slice())
            .map_err(|source| ClassifyError::Prediction { source })?;
        Ok(ClassificationResult::new(
            distribution.into_vec(),
            Arc::clone(labels),
        ))
    }
}
