//! Random forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::ForestError;
use crate::split::SplitSearch;
use crate::tree::{DecisionTree, GrowthLimits};

/// A fitted, immutable random forest.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl RandomForest {
    /// Borrow the fitted trees.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

/// Validate the matrix and labels, returning `(n_features, observed_classes)`.
fn check_inputs(
    rows: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
) -> Result<(usize, usize), ForestError> {
    let Some(first) = rows.first() else {
        return Err(ForestError::EmptyDataset);
    };
    let n_features = first.len();
    if n_features == 0 {
        return Err(ForestError::ZeroFeatures);
    }
    if labels.len() != rows.len() {
        return Err(ForestError::LabelCountMismatch {
            n_rows: rows.len(),
            n_labels: labels.len(),
        });
    }

    let mut seen = vec![false; n_classes];
    for (row, (values, &label)) in rows.iter().zip(labels).enumerate() {
        if values.len() != n_features {
            return Err(ForestError::RaggedRow {
                row,
                expected: n_features,
                got: values.len(),
            });
        }
        if let Some(column) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForestError::NonFiniteValue { row, column });
        }
        if label >= n_classes {
            return Err(ForestError::LabelOutOfRange {
                row,
                label,
                n_classes,
            });
        }
        seen[label] = true;
    }

    let observed = seen.iter().filter(|&&s| s).count();
    if observed < 2 {
        return Err(ForestError::TooFewClasses { observed });
    }
    Ok((n_features, observed))
}

/// Draw the row indices one tree is grown on.
fn sample_rows(n_rows: usize, subsample: f64, rng: &mut ChaCha8Rng) -> Vec<usize> {
    if subsample >= 1.0 {
        (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect()
    } else {
        let amount = ((n_rows as f64 * subsample).ceil() as usize).clamp(1, n_rows);
        let mut rows = index::sample(rng, n_rows, amount).into_vec();
        rows.sort_unstable();
        rows
    }
}

/// Train the forest described by `config`.
#[instrument(skip_all, fields(n_trees = config.n_trees(), n_rows = rows.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    rows: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
) -> Result<RandomForest, ForestError> {
    config.validate()?;
    let (n_features, observed_classes) = check_inputs(rows, labels, n_classes)?;
    let max_features = config.max_features().resolve(n_features)?;

    info!(
        n_trees = config.n_trees(),
        n_rows = rows.len(),
        n_features,
        n_classes,
        observed_classes,
        max_features,
        "training random forest"
    );

    // One column-major copy shared by every tree; trees only hold row indices.
    let columns: Vec<Vec<f64>> = (0..n_features)
        .map(|c| rows.iter().map(|row| row[c]).collect())
        .collect();

    let search = SplitSearch {
        n_classes,
        criterion: config.criterion(),
        max_features,
        min_samples_leaf: config.min_samples_leaf(),
    };
    let limits = GrowthLimits {
        max_depth: config.max_depth(),
        min_samples_split: config.min_samples_split(),
    };

    let mut master = ChaCha8Rng::seed_from_u64(config.seed());
    let tree_seeds: Vec<u64> = (0..config.n_trees()).map(|_| master.r#gen()).collect();
    let subsample = config.subsample();

    let trees: Vec<DecisionTree> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let samples = sample_rows(rows.len(), subsample, &mut rng);
            DecisionTree::grow(&columns, labels, &samples, &search, &limits, &mut rng)
        })
        .collect();

    debug!(
        total_nodes = trees.iter().map(DecisionTree::n_nodes).sum::<usize>(),
        "trees grown"
    );

    Ok(RandomForest {
        trees,
        n_features,
        n_classes,
    })
}

#[cfg(test)]
mod tests {
    use crate::config::{MaxFeatures, RandomForestConfig};
    use crate::error::ForestError;

    /// Three well separated classes along column 0; column 1 is constant.
    fn three_classes() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for class in 0..3 {
            for i in 0..15 {
                rows.push(vec![class as f64 * 10.0 + i as f64 * 0.2, 0.5]);
                labels.push(class);
            }
        }
        (rows, labels)
    }

    #[test]
    fn separable_classes_are_learned() {
        let (rows, labels) = three_classes();
        let forest = RandomForestConfig::new(30)
            .unwrap()
            .with_max_features(MaxFeatures::All)
            .fit(&rows, &labels, 3)
            .unwrap();
        let predictions = forest.predict_batch(&rows).unwrap();
        let correct = predictions.iter().zip(&labels).filter(|(p, l)| p == l).count();
        assert!(correct as f64 / labels.len() as f64 > 0.95);
        assert_eq!(forest.n_trees(), 30);
        assert_eq!(forest.n_classes(), 3);
    }

    #[test]
    fn same_seed_same_model() {
        let (rows, labels) = three_classes();
        let config = RandomForestConfig::new(8).unwrap().with_seed(7);
        let a = config.fit(&rows, &labels, 3).unwrap();
        let b = config.fit(&rows, &labels, 3).unwrap();
        for row in &rows {
            assert_eq!(
                a.predict_proba(row).unwrap().as_slice(),
                b.predict_proba(row).unwrap().as_slice()
            );
        }
    }

    #[test]
    fn subsample_without_replacement_trains() {
        let (rows, labels) = three_classes();
        let forest = RandomForestConfig::new(10)
            .unwrap()
            .with_subsample(0.5)
            .fit(&rows, &labels, 3)
            .unwrap();
        assert_eq!(forest.predict(&[20.5, 0.5]).unwrap(), 2);
    }

    #[test]
    fn declared_classes_may_exceed_observed() {
        let (rows, labels) = three_classes();
        let forest = RandomForestConfig::new(5).unwrap().fit(&rows, &labels, 5).unwrap();
        assert_eq!(forest.predict_proba(&rows[0]).unwrap().as_slice().len(), 5);
    }

    #[test]
    fn empty_dataset_rejected() {
        let err = RandomForestConfig::new(5).unwrap().fit(&[], &[], 2).unwrap_err();
        assert!(matches!(err, ForestError::EmptyDataset));
    }

    #[test]
    fn single_class_rejected() {
        let rows = vec![vec![1.0], vec![2.0]];
        let err = RandomForestConfig::new(5).unwrap().fit(&rows, &[0, 0], 1).unwrap_err();
        assert!(matches!(err, ForestError::TooFewClasses { observed: 1 }));
    }

    #[test]
    fn ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        let err = RandomForestConfig::new(5).unwrap().fit(&rows, &[0, 1], 2).unwrap_err();
        assert!(matches!(err, ForestError::RaggedRow { row: 1, .. }));
    }

    #[test]
    fn non_finite_rejected() {
        let rows = vec![vec![1.0, f64::NAN], vec![3.0, 4.0]];
        let err = RandomForestConfig::new(5).unwrap().fit(&rows, &[0, 1], 2).unwrap_err();
        assert!(matches!(err, ForestError::NonFiniteValue { row: 0, column: 1 }));
    }

    #[test]
    fn label_out_of_range_rejected() {
        let rows = vec![vec![1.0], vec![3.0]];
        let err = RandomForestConfig::new(5).unwrap().fit(&rows, &[0, 2], 2).unwrap_err();
        assert!(matches!(err, ForestError::LabelOutOfRange { label: 2, .. }));
    }
}
