use std::collections::HashMap;

use crate::data::dataset::{Dataset, LabeledExample};
use crate::data::loader::RawTable;
use crate::error::{NnError, Result};

/// Turns raw tabular values into the numeric dataset the network consumes.
///
/// Values parseable as `f64` pass through unchanged. Everything else is
/// treated as categorical and replaced by a 1-based code assigned in
/// first-seen order during `fit`, the same scheme for attributes (per
/// column) and labels.
#[derive(Debug, Clone, Default)]
pub struct Numerizer {
    attributes: HashMap<usize, HashMap<String, f64>>,
    labels: HashMap<String, f64>,
}

impl Numerizer {
    /// Scans the table and assigns codes to every non-numeric value.
    pub fn fit(table: &RawTable) -> Numerizer {
        let mut numerizer = Numerizer::default();
        for example in &table.examples {
            for (index, value) in example.attributes.iter().enumerate() {
                if let Some(value) = value {
                    if value.parse::<f64>().is_err() {
                        let codes = numerizer.attributes.entry(index).or_default();
                        if !codes.contains_key(value) {
                            let code = codes.len() as f64 + 1.0;
                            codes.insert(value.clone(), code);
                        }
                    }
                }
            }
            if example.label.parse::<f64>().is_err()
                && !numerizer.labels.contains_key(&example.label)
            {
                let code = numerizer.labels.len() as f64 + 1.0;
                numerizer.labels.insert(example.label.clone(), code);
            }
        }
        numerizer
    }

    /// Code assigned to a categorical attribute value, if any.
    pub fn attribute_code(&self, index: usize, value: &str) -> Option<f64> {
        self.attributes.get(&index)?.get(value).copied()
    }

    /// Code assigned to a categorical label value, if any.
    pub fn label_code(&self, value: &str) -> Option<f64> {
        self.labels.get(value).copied()
    }

    /// Converts a raw table into a numeric `Dataset`. Missing values and
    /// categorical values never seen by `fit` fail loudly.
    pub fn apply(&self, table: &RawTable) -> Result<Dataset> {
        let mut dataset = Dataset::new(table.attribute_names.clone());

        for example in &table.examples {
            let mut attributes = Vec::with_capacity(example.attributes.len());
            for (index, value) in example.attributes.iter().enumerate() {
                let value = value.as_deref().ok_or_else(|| {
                    NnError::Value(format!(
                        "example {}: attribute {index} is missing",
                        example.id
                    ))
                })?;
                let number = match value.parse::<f64>() {
                    Ok(number) => number,
                    Err(_) => self.attribute_code(index, value).ok_or_else(|| {
                        NnError::Value(format!(
                            "example {}: no code for attribute value '{value}'",
                            example.id
                        ))
                    })?,
                };
                attributes.push(number);
            }

            let label = match example.label.parse::<f64>() {
                Ok(number) => number,
                Err(_) => self.label_code(&example.label).ok_or_else(|| {
                    NnError::Value(format!(
                        "example {}: no code for label '{}'",
                        example.id, example.label
                    ))
                })?,
            };

            dataset.add(LabeledExample::new(example.id, attributes, label))?;
        }
        Ok(dataset)
    }
}

/// Per-attribute min/max linear rescaling into a target interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    ranges: Vec<(f64, f64)>,
}

impl Normalizer {
    /// Learns each attribute's observed [min, max] range.
    pub fn fit(dataset: &Dataset) -> Result<Normalizer> {
        if dataset.is_empty() {
            return Err(NnError::Value(
                "cannot fit a normalizer on an empty dataset".to_string(),
            ));
        }

        let mut ranges = vec![(f64::INFINITY, f64::NEG_INFINITY); dataset.arity()];
        for example in dataset.examples() {
            for (range, value) in ranges.iter_mut().zip(example.attributes()) {
                range.0 = range.0.min(*value);
                range.1 = range.1.max(*value);
            }
        }
        Ok(Normalizer { ranges })
    }

    /// Rescales every attribute into [low, high]. Labels and ids pass
    /// through unchanged. A constant attribute (min == max) maps onto the
    /// interval midpoint.
    pub fn apply(&self, dataset: &Dataset, low: f64, high: f64) -> Result<Dataset> {
        if low >= high {
            return Err(NnError::Value(format!(
                "normalization interval [{low}, {high}] is empty"
            )));
        }
        if dataset.arity() != self.ranges.len() {
            return Err(NnError::Dimension(format!(
                "normalizer fitted on arity {}, dataset has arity {}",
                self.ranges.len(),
                dataset.arity()
            )));
        }

        let mut normalized = Dataset::new(dataset.attribute_names().to_vec());
        for example in dataset.examples() {
            let attributes = example
                .attributes()
                .iter()
                .zip(self.ranges.iter())
                .map(|(value, (min, max))| {
                    if max > min {
                        low + (value - min) * (high - low) / (max - min)
                    } else {
                        (low + high) / 2.0
                    }
                })
                .collect();
            normalized.add(LabeledExample::new(
                example.id(),
                attributes,
                example.label(),
            ))?;
        }
        Ok(normalized)
    }
}
