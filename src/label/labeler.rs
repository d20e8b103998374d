use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};
use crate::registry;

/// Bidirectional mapping between a label and an output-layer target vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Labeler {
    /// One-hot encoding with argmax decoding.
    ///
    /// For a width > 1 output unit, label L (1-indexed) maps to a one-hot
    /// vector with 1 at index L-1; decoding returns 1 + argmax, first
    /// occurrence winning ties.
    ///
    /// Width == 1 collapses binary classification onto a single node: label 1
    /// maps to output 0, label 2 to output 1, and decoding thresholds at 0.5
    /// (>= 0.5 is label 2). This asymmetric case is the only binary path.
    MaxIndex,
}

impl Labeler {
    /// Encodes `label` as the target vector for an output unit of `width`
    /// nodes.
    pub fn label_to_vector(&self, label: f64, width: usize) -> Result<Vec<f64>> {
        match self {
            Labeler::MaxIndex => {
                if width == 0 {
                    return Err(NnError::Value(
                        "cannot encode a label for a zero-width output unit".to_string(),
                    ));
                }

                let mut vector = vec![0.0; width];
                if width == 1 {
                    if label != 1.0 {
                        vector[0] = 1.0;
                    }
                    return Ok(vector);
                }

                if label.fract() != 0.0 || label < 1.0 || label > width as f64 {
                    return Err(NnError::Value(format!(
                        "label {label} is not an integer in [1, {width}]"
                    )));
                }
                vector[label as usize - 1] = 1.0;
                Ok(vector)
            }
        }
    }

    /// Decodes a network output vector back into a label.
    pub fn vector_to_label(&self, vector: &[f64]) -> Result<f64> {
        match self {
            Labeler::MaxIndex => {
                if vector.is_empty() {
                    return Err(NnError::Dimension(
                        "cannot decode a label from an empty output vector".to_string(),
                    ));
                }

                if vector.len() == 1 {
                    return Ok(if vector[0] >= 0.5 { 2.0 } else { 1.0 });
                }

                let mut index_max = 0;
                for index in 1..vector.len() {
                    if vector[index] > vector[index_max] {
                        index_max = index;
                    }
                }
                Ok((index_max + 1) as f64)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Labeler::MaxIndex => "la_max",
        }
    }

    pub fn from_name(name: &str) -> Result<Labeler> {
        registry::check_prefix(name, registry::LABELER_PREFIX)?;
        match name {
            "la_max" => Ok(Labeler::MaxIndex),
            _ => Err(registry::unknown(name, "labeler")),
        }
    }
}
