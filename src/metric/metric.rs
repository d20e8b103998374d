use serde::{Deserialize, Serialize};

use crate::data::dataset::{Classification, Dataset};
use crate::registry;
use crate::error::Result;

/// Scalar quality measure over a dataset and one classification of it.
///
/// The training loop assumes a metric grows with network quality; every
/// variant added here must keep that orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Metric {
    /// Fraction of examples whose predicted label equals the true label,
    /// in [0, 1]. An empty dataset evaluates to 0: defined, not an error.
    Accuracy,
}

impl Metric {
    pub fn compute(&self, dataset: &Dataset, classification: &Classification) -> f64 {
        match self {
            Metric::Accuracy => {
                if dataset.is_empty() {
                    return 0.0;
                }

                // A missing classification entry counts as a miss.
                let correct = dataset
                    .examples()
                    .filter(|example| classification.label(example.id()) == Some(example.label()))
                    .count();
                correct as f64 / dataset.len() as f64
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Accuracy => "me_accuracy",
        }
    }

    pub fn from_name(name: &str) -> Result<Metric> {
        registry::check_prefix(name, registry::METRIC_PREFIX)?;
        match name {
            "me_accuracy" => Ok(Metric::Accuracy),
            _ => Err(registry::unknown(name, "metric")),
        }
    }
}
