//! Row to fixed-length vector encoding via the hashing trick.

use crate::config::ClassifierConfig;
use crate::error::ClassifyError;
use crate::hashing::TokenHasher;
use crate::rows::RowSource;
use crate::spec::DataSpecification;
use crate::vector::FeatureVector;

const INTERCEPT: &str = "intercept";
const NO_FEATURES: &str = "Feature:1";

/// Encodes rows of a [`RowSource`] into [`FeatureVector`]s of a fixed width.
///
/// Each row receives an intercept token, then one token per feature column:
/// `Attribute-<col>` weighted by the value when the cell parses as a finite
/// number, `Attribute-<col>:<raw>` weighted 1 otherwise. A specification
/// without feature columns yields the intercept plus a constant
/// `Feature:1` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureEncoder {
    hasher: TokenHasher,
}

impl FeatureEncoder {
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidConfig`] when `vector_length` or
    /// `probes` is zero.
    pub fn new(vector_length: usize, probes: usize) -> Result<Self, ClassifyError> {
        Ok(Self {
            hasher: TokenHasher::new(vector_length, probes)?,
        })
    }

    #[must_use]
    pub fn vector_length(&self) -> usize {
        self.hasher.dimensions()
    }

    /// Encode one row.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::MissingValue`] when `rows` has no cell at a
    /// feature column of `row`. Values that do not parse as numbers are
    /// never an error.
    pub fn encode_row<R: RowSource + ?Sized>(
        &self,
        spec: &DataSpecification,
        rows: &R,
        row: usize,
    ) -> Result<FeatureVector, ClassifyError> {
        let mut vector = FeatureVector::zeros(self.hasher.dimensions());
        self.hasher.add_to(INTERCEPT, 1.0, &mut vector);

        if spec.feature_columns().is_empty() {
            self.hasher.add_to(NO_FEATURES, 1.0, &mut vector);
            return Ok(vector);
        }

        for (column, metadata) in spec.features() {
            let raw = rows
                .value(row, column)
                .ok_or(ClassifyError::MissingValue { row, column })?;
            match metadata.numeric_value(raw) {
                Some(value) => {
                    self.hasher
                        .add_to(&format!("Attribute-{column}"), value, &mut vector);
                }
                None => {
                    self.hasher
                        .add_to(&format!("Attribute-{column}:{raw}"), 1.0, &mut vector);
                }
            }
        }
        Ok(vector)
    }
}

/// A [`ClassifierConfig`] has already checked its width and probe count.
impl From<&ClassifierConfig> for FeatureEncoder {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            hasher: TokenHasher::from(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FeatureEncoder;
    use crate::error::ClassifyError;
    use crate::hashing::TokenHasher;
    use crate::spec::{DataSpecification, FeatureMetadata};
    use crate::vector::FeatureVector;

    fn rows(cells: &[&[&str]]) -> Vec<Vec<String>> {
        cells
            .iter()
            .map(|r| r.iter().map(|c| (*c).to_string()).collect())
            .collect()
    }

    fn expected(tokens: &[(&str, f64)], len: usize) -> FeatureVector {
        let hasher = TokenHasher::new(len, 1).unwrap();
        let mut v = FeatureVector::zeros(len);
        for (token, weight) in tokens {
            hasher.add_to(token, *weight, &mut v);
        }
        v
    }

    #[test]
    fn numeric_cells_weight_the_column_token() {
        let spec =
            DataSpecification::new(0, vec![1], vec![FeatureMetadata::numeric("x")]).unwrap();
        let data = rows(&[&["pos", "2.5"]]);
        let v = FeatureEncoder::new(128, 1)
            .unwrap()
            .encode_row(&spec, &data, 0)
            .unwrap();
        assert_eq!(
            v,
            expected(&[("intercept", 1.0), ("Attribute-1", 2.5)], 128)
        );
    }

    #[test]
    fn unparseable_cells_become_value_tokens() {
        let spec =
            DataSpecification::new(0, vec![1], vec![FeatureMetadata::numeric("x")]).unwrap();
        let data = rows(&[&["pos", "*"]]);
        let v = FeatureEncoder::new(128, 1)
            .unwrap()
            .encode_row(&spec, &data, 0)
            .unwrap();
        assert_eq!(
            v,
            expected(&[("intercept", 1.0), ("Attribute-1:*", 1.0)], 128)
        );
    }

    #[test]
    fn no_features_adds_placeholder() {
        let spec = DataSpecification::new(0, vec![], vec![]).unwrap();
        let data = rows(&[&["pos"]]);
        let v = FeatureEncoder::new(64, 1)
            .unwrap()
            .encode_row(&spec, &data, 0)
            .unwrap();
        assert_eq!(v, expected(&[("intercept", 1.0), ("Feature:1", 1.0)], 64));
        let total: f64 = v.as_slice().iter().sum();
        assert!((total - 2.0).abs() < 1e-12);
    }

    #[test]
    fn missing_cell_is_reported() {
        let spec =
            DataSpecification::new(0, vec![3], vec![FeatureMetadata::categorical("x")]).unwrap();
        let data = rows(&[&["pos", "a"]]);
        let err = FeatureEncoder::new(64, 1)
            .unwrap()
            .encode_row(&spec, &data, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::MissingValue { row: 0, column: 3 }
        ));
    }
}
