//! Classification of mixed categorical and numeric rows.
//!
//! Rows are read through a [`RowSource`] and turned into fixed-length
//! vectors with the hashing trick: every feature contributes one token,
//! weighted by the value when the cell is numeric, and tokens are added at
//! hashed slots. A [`BatchClassifier`] buffers the encoded rows while open,
//! fits a random forest once on [`close`](BatchClassifier::close) and then
//! classifies rows encoded the same way.

mod buffer;
mod classifier;
mod config;
mod encoder;
mod error;
mod eval;
mod hashing;
mod result;
mod rows;
mod spec;
mod vector;

pub use buffer::TrainingBuffer;
pub use classifier::{BatchClassifier, ClassifierState, Operation};
pub use config::{ClassifierConfig, DEFAULT_VECTOR_LENGTH};
pub use encoder::FeatureEncoder;
pub use error::ClassifyError;
pub use eval::{CrossValidation, CrossValidationResult};
pub use hashing::TokenHasher;
pub use result::ClassificationResult;
pub use rows::RowSource;
pub use spec::{DataSpecification, FeatureKind, FeatureMetadata, LabelMap};
pub use vector::FeatureVector;
