//! Confusion matrix and per-class metrics.

/// Counts of (true class, predicted class) pairs.
///
/// `counts[truth][predicted]` is the number of rows of class `truth` that
/// were predicted as `predicted`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClassMetrics {
    pub class: usize,
    /// TP / (TP + FP); 0 when the class was never predicted.
    pub precision: f64,
    /// TP / (TP + FN); 0 when the class never occurs.
    pub recall: f64,
    pub f1: f64,
    /// Number of rows whose true class is `class`.
    pub support: usize,
}

impl ConfusionMatrix {
    /// An all-zero matrix over `n_classes` classes.
    #[must_use]
    pub fn new(n_classes: usize) -> Self {
        Self {
            counts: vec![vec![0; n_classes]; n_classes],
        }
    }

    /// Record one outcome.
    ///
    /// # Panics
    ///
    /// Panics if either class is `>= n_classes()`.
    pub fn record(&mut self, truth: usize, predicted: usize) {
        self.counts[truth][predicted] += 1;
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.counts.len()
    }

    /// Total number of recorded outcomes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Share of outcomes on the diagonal; 0 for an empty matrix.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes()).map(|c| self.counts[c][c]).sum();
        correct as f64 / total as f64
    }

    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let n = self.n_classes();
        (0..n)
            .map(|class| {
                let tp = self.counts[class][class];
                let predicted: usize = (0..n).map(|t| self.counts[t][class]).sum();
                let support: usize = self.counts[class].iter().sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.counts
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::ConfusionMatrix;

    fn sample() -> ConfusionMatrix {
        // truth: 0 0 0 1 1 2
        // pred:  0 0 1 1 1 0
        let mut m = ConfusionMatrix::new(3);
        for (t, p) in [(0, 0), (0, 0), (0, 1), (1, 1), (1, 1), (2, 0)] {
            m.record(t, p);
        }
        m
    }

    #[test]
    fn accuracy_counts_diagonal() {
        let m = sample();
        assert_eq!(m.total(), 6);
        assert!((m.accuracy() - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn per_class_metrics() {
        let metrics = sample().class_metrics();
        assert!((metrics[0].precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics[0].recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics[1].precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics[1].recall - 1.0).abs() < 1e-12);
        assert_eq!(metrics[2].support, 1);
        assert_eq!(metrics[2].f1, 0.0);
    }

    #[test]
    fn empty_matrix_has_zero_accuracy() {
        assert_eq!(ConfusionMatrix::new(2).accuracy(), 0.0);
    }
}
