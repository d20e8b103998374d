pub mod dataset;
pub mod filters;
pub mod loader;

pub use dataset::{Classification, Dataset, LabeledExample};
pub use filters::{Normalizer, Numerizer};
pub use loader::{CsvDatasetReader, RawExample, RawTable};
