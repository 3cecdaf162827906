use std::fmt;

/// Position of a node inside a tree's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Return the arena position.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of a fitted decision tree.
///
/// Children are referenced by [`NodeId`] into the owning tree's arena, so a
/// tree is a flat `Vec<Node>` rooted at index 0.
#[derive(Debug, Clone, serde::Serialize)]
pub enum Node {
    /// Interior node: rows with `value <= threshold` go left.
    Split {
        /// Column tested at this node.
        column: usize,
        /// Split point, the midpoint between two adjacent training values.
        threshold: f64,
        /// Left child.
        left: NodeId,
        /// Right child.
        right: NodeId,
        /// Training rows (with bootstrap multiplicity) reaching this node.
        n_samples: usize,
    },
    /// Terminal node carrying the class distribution of its training rows.
    Leaf {
        /// Per-class probability, summing to 1.
        distribution: Vec<f64>,
        /// Training rows (with bootstrap multiplicity) reaching this leaf.
        n_samples: usize,
    },
}

impl Node {
    /// Build a leaf from raw class counts.
    pub(crate) fn leaf(class_counts: &[usize]) -> Self {
        let n_samples: usize = class_counts.iter().sum();
        let total = n_samples.max(1) as f64;
        Node::Leaf {
            distribution: class_counts.iter().map(|&c| c as f64 / total).collect(),
            n_samples,
        }
    }

    /// Return the number of training rows that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return `true` for terminal nodes.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}
