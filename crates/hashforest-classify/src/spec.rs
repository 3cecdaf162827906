//! Which columns are features, which is the label, and how to read them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;

/// How a feature column's raw values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Values are always tokens; numeric parsing never succeeds.
    Categorical,
    /// Values are parsed as numbers when possible. Unparseable or
    /// non-finite values (suppressed cells like `*`, blanks) fall back to
    /// being tokens.
    Numeric,
}

/// Per-feature metadata used to attempt a numeric parse of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureMetadata {
    name: String,
    kind: FeatureKind,
}

impl FeatureMetadata {
    pub fn new(name: impl Into<String>, kind: FeatureKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self::new(name, FeatureKind::Categorical)
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, FeatureKind::Numeric)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    /// The finite numeric value of `raw`, or `None` when the value is to be
    /// treated as a categorical token.
    #[must_use]
    pub fn numeric_value(&self, raw: &str) -> Option<f64> {
        match self.kind {
            FeatureKind::Categorical => None,
            FeatureKind::Numeric => raw.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

/// Label string to dense class id, assigned in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelMap {
    names: Vec<String>,
    #[serde(skip)]
    ids: HashMap<String, usize>,
}

impl LabelMap {
    /// Id of `label`, if known.
    #[must_use]
    pub fn id(&self, label: &str) -> Option<usize> {
        self.ids.get(label).copied()
    }

    /// Label string of class `id`, if assigned.
    #[must_use]
    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Labels in id order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn get_or_insert(&mut self, label: &str) -> usize {
        if let Some(id) = self.id(label) {
            return id;
        }
        let id = self.names.len();
        self.names.push(label.to_owned());
        self.ids.insert(label.to_owned(), id);
        id
    }
}

/// Static description of one classification task plus its label vocabulary.
///
/// The vocabulary grows as labels are encoded and is frozen when the owning
/// classifier closes. Each specification owns its vocabulary, so clones used
/// by independent classifiers never share ids.
#[derive(Debug, Clone)]
pub struct DataSpecification {
    label_column: usize,
    feature_columns: Vec<usize>,
    feature_metadata: Vec<FeatureMetadata>,
    labels: LabelMap,
    frozen: bool,
}

impl DataSpecification {
    /// Describe a task.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidSpecification`] when the label column is
    /// also listed as a feature, a feature column is listed twice, or the
    /// metadata count differs from the feature count.
    pub fn new(
        label_column: usize,
        feature_columns: Vec<usize>,
        feature_metadata: Vec<FeatureMetadata>,
    ) -> Result<Self, ClassifyError> {
        if feature_columns.contains(&label_column) {
            return Err(ClassifyError::InvalidSpecification {
                reason: format!("label column {label_column} is also a feature column"),
            });
        }
        for (i, column) in feature_columns.iter().enumerate() {
            if feature_columns[..i].contains(column) {
                return Err(ClassifyError::InvalidSpecification {
                    reason: format!("feature column {column} is listed twice"),
                });
            }
        }
        if feature_metadata.len() != feature_columns.len() {
            return Err(ClassifyError::InvalidSpecification {
                reason: format!(
                    "{} metadata entries for {} feature columns",
                    feature_metadata.len(),
                    feature_columns.len()
                ),
            });
        }
        Ok(Self {
            label_column,
            feature_columns,
            feature_metadata,
            labels: LabelMap::default(),
            frozen: false,
        })
    }

    /// Pre-register labels in the given order, before any row is seen.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidLabel`] if the vocabulary is frozen.
    pub fn with_labels<I, S>(mut self, labels: I) -> Result<Self, ClassifyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for label in labels {
            self.encode_label(label.as_ref())?;
        }
        Ok(self)
    }

    /// Id of `raw`, assigning the next free id on first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidLabel`] for a new label once the
    /// vocabulary is frozen. Known labels still resolve.
    pub fn encode_label(&mut self, raw: &str) -> Result<usize, ClassifyError> {
        if let Some(id) = self.labels.id(raw) {
            return Ok(id);
        }
        if self.frozen {
            return Err(ClassifyError::InvalidLabel {
                label: raw.to_owned(),
            });
        }
        Ok(self.labels.get_or_insert(raw))
    }

    /// Number of distinct labels registered so far.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    /// Stop accepting new labels.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    #[must_use]
    pub fn label_map(&self) -> &LabelMap {
        &self.labels
    }

    #[must_use]
    pub fn label_column(&self) -> usize {
        self.label_column
    }

    #[must_use]
    pub fn feature_columns(&self) -> &[usize] {
        &self.feature_columns
    }

    #[must_use]
    pub fn feature_metadata(&self) -> &[FeatureMetadata] {
        &self.feature_metadata
    }

    /// `(column, metadata)` pairs in encoding order.
    pub fn features(&self) -> impl Iterator<Item = (usize, &FeatureMetadata)> {
        self.feature_columns
            .iter()
            .copied()
            .zip(&self.feature_metadata)
    }
}
