use rand_chacha::ChaCha8Rng;

use crate::node::{Node, NodeId};
use crate::split::{SplitSearch, find_best_split};

/// Growth limits applied while building one tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GrowthLimits {
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
}

/// A fitted CART classification tree stored as a node arena.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree over `samples`, which are row indices into `columns`.
    pub(crate) fn grow(
        columns: &[Vec<f64>],
        labels: &[usize],
        samples: &[usize],
        search: &SplitSearch,
        limits: &GrowthLimits,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut nodes = Vec::new();
        let mut builder = Builder {
            columns,
            labels,
            search,
            limits,
            rng,
            nodes: &mut nodes,
        };
        builder.build(samples, 0);
        Self { nodes }
    }

    /// Class distribution of the leaf that `row` falls into.
    ///
    /// The caller guarantees `row` has the trained width.
    pub(crate) fn leaf_distribution(&self, row: &[f64]) -> &[f64] {
        let mut index = 0usize;
        loop {
            match &self.nodes[index] {
                Node::Leaf { distribution, .. } => return distribution,
                Node::Split {
                    column,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    index = if row[*column] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }

    /// Return the arena of nodes, root first.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the number of nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaves.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the depth of the deepest leaf; a lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            match &self.nodes[index] {
                Node::Leaf { .. } => deepest = deepest.max(depth),
                Node::Split { left, right, .. } => {
                    stack.push((left.index(), depth + 1));
                    stack.push((right.index(), depth + 1));
                }
            }
        }
        deepest
    }
}

struct Builder<'a, 'r> {
    columns: &'a [Vec<f64>],
    labels: &'a [usize],
    search: &'a SplitSearch,
    limits: &'a GrowthLimits,
    rng: &'r mut ChaCha8Rng,
    nodes: &'r mut Vec<Node>,
}

impl Builder<'_, '_> {
    fn build(&mut self, samples: &[usize], depth: usize) -> NodeId {
        let mut counts = vec![0usize; self.search.n_classes];
        for &row in samples {
            counts[self.labels[row]] += 1;
        }

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let too_small = samples.len() < self.limits.min_samples_split;
        let too_deep = self.limits.max_depth.is_some_and(|max| depth >= max);
        if pure || too_small || too_deep {
            return self.push(Node::leaf(&counts));
        }

        let Some(split) = find_best_split(
            self.columns,
            self.labels,
            samples,
            &counts,
            self.search,
            &mut *self.rng,
        ) else {
            return self.push(Node::leaf(&counts));
        };

        // Reserve the parent slot so children land after it in the arena.
        let id = self.push(Node::leaf(&counts));
        let left = self.build(&split.left, depth + 1);
        let right = self.build(&split.right, depth + 1);
        self.nodes[id.index()] = Node::Split {
            column: split.column,
            threshold: split.threshold,
            left,
            right,
            n_samples: samples.len(),
        };
        id
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId::new(self.nodes.len() - 1)
    }
}
