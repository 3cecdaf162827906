use rand::Rng;

/// Node impurity measure used to rank candidate splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitCriterion {
    /// Gini impurity: `1 - Σ p_i²`.
    Gini,
    /// Information entropy: `-Σ p_i ln p_i`.
    Entropy,
    /// Misclassification rate: `1 - max p_i`.
    ClassificationError,
}

impl SplitCriterion {
    /// Impurity of a node with the given class counts; 0 for an empty node.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> f64 {
        if n_samples == 0 {
            return 0.0;
        }
        let n = n_samples as f64;
        match self {
            SplitCriterion::Gini => {
                1.0 - class_counts
                    .iter()
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p
                    })
                    .sum::<f64>()
            }
            SplitCriterion::Entropy => -class_counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.ln()
                })
                .sum::<f64>(),
            SplitCriterion::ClassificationError => {
                let max = class_counts.iter().copied().max().unwrap_or(0);
                1.0 - max as f64 / n
            }
        }
    }
}

/// Best split found for one node.
#[derive(Debug, Clone)]
pub(crate) struct Split {
    pub(crate) column: usize,
    pub(crate) threshold: f64,
    pub(crate) left: Vec<usize>,
    pub(crate) right: Vec<usize>,
}

/// Search parameters shared by every node of one tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SplitSearch {
    pub(crate) n_classes: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_features: usize,
    pub(crate) min_samples_leaf: usize,
}

/// Find the best threshold split of `samples` over a random subset of columns.
///
/// Columns are visited in random order. Columns that are constant over
/// `samples` are skipped without counting against `max_features`, so the
/// search only gives up once every column has been tried. Hashed feature
/// vectors are mostly zero, and counting empty columns would turn most
/// nodes into premature leaves.
///
/// `columns[c][row]` is column-major; `samples` may repeat rows (bootstrap).
pub(crate) fn find_best_split(
    columns: &[Vec<f64>],
    labels: &[usize],
    samples: &[usize],
    class_counts: &[usize],
    search: &SplitSearch,
    rng: &mut impl Rng,
) -> Option<Split> {
    let n_samples = samples.len();
    if n_samples < 2 || columns.is_empty() {
        return None;
    }
    let parent = search.criterion.impurity(class_counts, n_samples);

    let mut order: Vec<usize> = (0..columns.len()).collect();
    let mut examined = 0usize;
    let mut best_gain = f64::NEG_INFINITY;
    let mut best: Option<(usize, f64)> = None;
    let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n_samples);

    for i in 0..order.len() {
        if examined >= search.max_features {
            break;
        }
        let j = rng.gen_range(i..order.len());
        order.swap(i, j);
        let column = &columns[order[i]];

        sorted.clear();
        sorted.extend(samples.iter().map(|&row| (column[row], labels[row])));
        sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
        if sorted[0].0 == sorted[n_samples - 1].0 {
            continue;
        }
        examined += 1;

        let mut left_counts = vec![0usize; search.n_classes];
        let mut right_counts = class_counts.to_vec();
        for k in 0..n_samples - 1 {
            let (value, label) = sorted[k];
            left_counts[label] += 1;
            right_counts[label] -= 1;

            let next = sorted[k + 1].0;
            if value == next {
                continue;
            }
            let n_left = k + 1;
            let n_right = n_samples - n_left;
            if n_left < search.min_samples_leaf || n_right < search.min_samples_leaf {
                continue;
            }

            let gain = n_samples as f64 * parent
                - n_left as f64 * search.criterion.impurity(&left_counts, n_left)
                - n_right as f64 * search.criterion.impurity(&right_counts, n_right);
            if gain > best_gain {
                best_gain = gain;
                best = Some((order[i], value / 2.0 + next / 2.0));
            }
        }
    }

    let (column, threshold) = best?;
    let (left, right): (Vec<usize>, Vec<usize>) = samples
        .iter()
        .partition(|&&row| columns[column][row] <= threshold);
    Some(Split {
        column,
        threshold,
        left,
        right,
    })
}
