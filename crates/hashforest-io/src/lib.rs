//! CSV input and JSON output for the hashforest pipeline.

mod error;
mod experiment;
mod reader;
mod table;
mod writer;

pub use error::IoError;
pub use experiment::ExperimentName;
pub use reader::TableReader;
pub use table::Table;
pub use writer::ResultWriter;
