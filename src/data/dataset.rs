use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};

/// One labeled example: an identifier, a fixed-arity attribute vector and a
/// numeric label. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    id: u64,
    attributes: Vec<f64>,
    label: f64,
}

impl LabeledExample {
    pub fn new(id: u64, attributes: Vec<f64>, label: f64) -> LabeledExample {
        LabeledExample {
            id,
            attributes,
            label,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn attributes(&self) -> &[f64] {
        &self.attributes
    }

    pub fn label(&self) -> f64 {
        self.label
    }
}

/// A collection of labeled examples keyed by identifier, plus the ordered
/// attribute names that fix the dataset's arity.
///
/// Iteration order is map order: not guaranteed stable across datasets or
/// runs. Training code that iterates a dataset inherits this.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    attribute_names: Vec<String>,
    examples: HashMap<u64, LabeledExample>,
}

impl Dataset {
    pub fn new(attribute_names: Vec<String>) -> Dataset {
        Dataset {
            attribute_names,
            examples: HashMap::new(),
        }
    }

    /// Number of attributes every example must carry.
    pub fn arity(&self) -> usize {
        self.attribute_names.len()
    }

    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Inserts an example. The identifier must be fresh and the attribute
    /// count must match the dataset arity.
    pub fn add(&mut self, example: LabeledExample) -> Result<()> {
        if example.attributes.len() != self.arity() {
            return Err(NnError::Dimension(format!(
                "example {} has {} attributes, dataset arity is {}",
                example.id,
                example.attributes.len(),
                self.arity()
            )));
        }
        if self.examples.contains_key(&example.id) {
            return Err(NnError::DuplicateKey(format!(
                "example id {} already present in dataset",
                example.id
            )));
        }
        self.examples.insert(example.id, example);
        Ok(())
    }

    pub fn get(&self, id: u64) -> Option<&LabeledExample> {
        self.examples.get(&id)
    }

    pub fn examples(&self) -> impl Iterator<Item = &LabeledExample> {
        self.examples.values()
    }
}

/// The outcome of classifying a dataset: identifier → predicted label.
///
/// Built fresh per classification run and decoupled from the source dataset,
/// so the same examples can be classified any number of times.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Classification {
    labels: HashMap<u64, f64>,
}

impl Classification {
    pub fn new() -> Classification {
        Classification::default()
    }

    pub fn add(&mut self, id: u64, label: f64) -> Result<()> {
        if self.labels.contains_key(&id) {
            return Err(NnError::DuplicateKey(format!(
                "id {id} already classified in this run"
            )));
        }
        self.labels.insert(id, label);
        Ok(())
    }

    pub fn label(&self, id: u64) -> Option<f64> {
        self.labels.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
