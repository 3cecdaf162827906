//! Offline random forest classification.
//!
//! Fits an ensemble of CART trees on a dense row-major matrix in one batch
//! call. Each tree is grown on its own bootstrap sample with a seed derived
//! from the configured master seed, and trees are built in parallel with
//! rayon. A fitted [`RandomForest`] is immutable and answers class
//! probability queries by averaging the leaf distributions of its trees.

mod config;
mod confusion;
mod error;
mod forest;
mod node;
mod predict;
mod split;
mod tree;

pub use config::{DEFAULT_TREES, MaxFeatures, RandomForestConfig};
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use error::ForestError;
pub use forest::RandomForest;
pub use node::{Node, NodeId};
pub use predict::{ClassDistribution, argmax};
pub use split::SplitCriterion;
pub use tree::DecisionTree;
