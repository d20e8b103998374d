pub mod error;
pub mod registry;
pub mod math;
pub mod activation;
pub mod error_fn;
pub mod optim;
pub mod label;
pub mod metric;
pub mod layers;
pub mod network;
pub mod data;
pub mod io;
pub mod train;

// Convenience re-exports
pub use error::{NnError, Result};
pub use activation::activation::Activation;
pub use error_fn::error_fn::ErrorFn;
pub use optim::update_rule::{TdLambda, UpdateRule};
pub use label::labeler::Labeler;
pub use metric::metric::Metric;
pub use layers::unit::{Node, Unit};
pub use network::network::Network;
pub use network::topology::{Topology, UnitTopology};
pub use data::dataset::{Classification, Dataset, LabeledExample};
pub use data::filters::{Normalizer, Numerizer};
pub use data::loader::{CsvDatasetReader, RawExample, RawTable};
pub use io::network_io::NetworkIoCsv;
pub use train::train_config::TrainConfig;
pub use train::trainer::TrainingLoop;
