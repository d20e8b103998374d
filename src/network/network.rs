use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::data::dataset::{Classification, Dataset, LabeledExample};
use crate::error::{NnError, Result};
use crate::error_fn::error_fn::ErrorFn;
use crate::label::labeler::Labeler;
use crate::layers::unit::Unit;
use crate::optim::update_rule::UpdateRule;

/// A feed-forward network: one declared input layer followed by an ordered
/// list of units, trained one example at a time by backpropagation.
///
/// The network exclusively owns all weight storage. A learning step borrows
/// it mutably, computes every unit's new weight matrix from a consistent
/// pre-step image, and only then commits; a failure anywhere in the step
/// leaves all weights untouched.
///
/// The network is usable for forward passes once the input layer and at
/// least one unit exist, and learnable once a learning rate and a labeler
/// are set as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    input_width: Option<usize>,
    units: Vec<Unit>,
    learning_rate: Option<f64>,
    bias: bool,
    labeler: Option<Labeler>,
}

impl Network {
    /// Creates an empty network. `bias` fixes whether a constant 1 input
    /// (with a matching extra weight per node) is appended at every layer;
    /// it cannot change once units exist, since it decides weight arity.
    pub fn new(bias: bool) -> Network {
        Network {
            input_width: None,
            units: Vec::new(),
            learning_rate: None,
            bias,
            labeler: None,
        }
    }

    /// Discards the topology (input layer and all units, with their
    /// weights). Learning rate, bias flag and labeler survive.
    pub fn reset(&mut self) {
        self.input_width = None;
        self.units.clear();
    }

    pub fn bias(&self) -> bool {
        self.bias
    }

    /// Bias can only change while no units exist; topology restoration calls
    /// this right after `reset()`.
    pub(crate) fn set_bias_unchecked(&mut self, bias: bool) {
        self.bias = bias;
    }

    pub fn learning_rate(&self) -> Option<f64> {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = Some(learning_rate);
    }

    pub fn labeler(&self) -> Option<Labeler> {
        self.labeler
    }

    pub fn set_labeler(&mut self, labeler: Labeler) {
        self.labeler = Some(labeler);
    }

    pub fn input_width(&self) -> Option<usize> {
        self.input_width
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Mutable unit access, e.g. to drive a TD update rule between steps.
    pub fn unit_mut(&mut self, index: usize) -> Option<&mut Unit> {
        self.units.get_mut(index)
    }

    /// Declares the input layer. Mandatory, and first.
    pub fn add_input(&mut self, width: usize) -> Result<()> {
        if width == 0 {
            return Err(NnError::Topology(
                "input layer needs at least one node".to_string(),
            ));
        }
        if self.input_width.is_some() {
            return Err(NnError::Topology(
                "input layer already declared; reset() first".to_string(),
            ));
        }
        self.input_width = Some(width);
        Ok(())
    }

    /// Appends a unit as the new output layer, wired to the previous layer's
    /// width (+1 when bias is enabled). The error function defaults by
    /// position: `Output` at the terminal unit, `WeightedSum` elsewhere.
    pub fn add_unit(
        &mut self,
        node_nb: usize,
        activation: Activation,
        update_rule: UpdateRule,
    ) -> Result<()> {
        self.add_unit_full(node_nb, activation, update_rule, None)
    }

    /// `add_unit` with an explicit error-function override for the unit.
    pub fn add_unit_with_error(
        &mut self,
        node_nb: usize,
        activation: Activation,
        update_rule: UpdateRule,
        error_fn: ErrorFn,
    ) -> Result<()> {
        self.add_unit_full(node_nb, activation, update_rule, Some(error_fn))
    }

    fn add_unit_full(
        &mut self,
        node_nb: usize,
        activation: Activation,
        update_rule: UpdateRule,
        error_fn: Option<ErrorFn>,
    ) -> Result<()> {
        let previous_width = match self.units.last() {
            Some(unit) => unit.node_nb(),
            None => self.input_width.ok_or_else(|| {
                NnError::Topology("declare the input layer before adding units".to_string())
            })?,
        };
        let previous_width = previous_width + usize::from(self.bias);

        let unit = Unit::new(node_nb, previous_width, activation, update_rule, error_fn)?;
        self.units.push(unit);
        Ok(())
    }

    /// Forward pass returning every intermediate vector, starting with the
    /// input itself and ending with the terminal unit's outputs.
    ///
    /// When bias is enabled the constant 1 is appended in place to each
    /// vector before it feeds the next unit, so non-terminal entries of the
    /// result carry it. The backward pass depends on that.
    pub fn compute_output(&self, input: &[f64]) -> Result<Vec<Vec<f64>>> {
        let input_width = self.input_width.ok_or_else(|| {
            NnError::Topology("network has no input layer".to_string())
        })?;
        if self.units.is_empty() {
            return Err(NnError::Topology("network has no units".to_string()));
        }
        if input.len() != input_width {
            return Err(NnError::Dimension(format!(
                "input has {} attributes, input layer expects {}",
                input.len(),
                input_width
            )));
        }

        let mut values: Vec<Vec<f64>> = vec![input.to_vec()];
        for unit in &self.units {
            let index = values.len() - 1;
            if self.bias {
                values[index].push(1.0);
            }
            let outputs = unit.compute_output(&values[index])?;
            values.push(outputs);
        }
        Ok(values)
    }

    /// Forward pass returning only the terminal output vector.
    pub fn compute(&self, input: &[f64]) -> Result<Vec<f64>> {
        let mut values = self.compute_output(input)?;
        Ok(values.pop().unwrap_or_default())
    }

    /// Forward pass plus label decoding through the labeler.
    pub fn classify(&self, input: &[f64]) -> Result<f64> {
        let labeler = self.labeler.ok_or_else(|| {
            NnError::Configuration("no labeler set on this network".to_string())
        })?;
        let output = self.compute(input)?;
        labeler.vector_to_label(&output)
    }

    /// Classifies every example of a dataset into a fresh classification.
    pub fn classify_dataset(&self, dataset: &Dataset) -> Result<Classification> {
        let mut classification = Classification::new();
        for example in dataset.examples() {
            let label = self.classify(example.attributes())?;
            classification.add(example.id(), label)?;
        }
        Ok(classification)
    }

    /// One learning step on a single example.
    ///
    /// Strictly sequential: forward pass, target encoding, backward error
    /// pass (terminal unit with output semantics, the rest propagating
    /// through the pre-step weights), bias-error trim, delta computation
    /// (`learning_rate * error * input`), then update-rule application with
    /// an all-units-at-once commit.
    pub fn learn(&mut self, example: &LabeledExample) -> Result<()> {
        let learning_rate = self.learning_rate.ok_or_else(|| {
            NnError::Configuration("no learning rate set on this network".to_string())
        })?;
        let labeler = self.labeler.ok_or_else(|| {
            NnError::Configuration("no labeler set on this network".to_string())
        })?;

        let outputs = self.compute_output(example.attributes())?;

        let unit_count = self.units.len();
        let terminal_width = self.units[unit_count - 1].node_nb();
        let desired = labeler.label_to_vector(example.label(), terminal_width)?;

        // Backward error pass, last unit first. `previous_weights` holds the
        // weights of the unit processed just before (the successor in
        // forward order), captured before any mutation.
        let mut errors: Vec<Vec<f64>> = Vec::with_capacity(unit_count);
        let mut previous_weights: Option<Vec<Vec<f64>>> = None;
        for index in (0..unit_count).rev() {
            let is_output_unit = index == unit_count - 1;
            let unit_errors = self.units[index].compute_errors(
                is_output_unit,
                errors.last().map(|successor| successor.as_slice()),
                &desired,
                &outputs[index + 1],
                previous_weights.as_deref(),
            )?;
            errors.push(unit_errors);
            previous_weights = Some(self.units[index].weights());
        }
        // Collected backward; forward order from here on.
        errors.reverse();

        // The bias pseudo-input has no upstream edge to blame: drop its error
        // everywhere but at the terminal unit, which never grew one.
        if self.bias {
            for unit_errors in errors.iter_mut().take(unit_count - 1) {
                unit_errors.pop();
            }
        }

        // Deltas from the forward-pass intermediates (bias constants already
        // appended where applicable).
        let deltas: Vec<Vec<Vec<f64>>> = errors
            .iter()
            .zip(outputs.iter())
            .map(|(unit_errors, unit_input)| {
                unit_errors
                    .iter()
                    .map(|error| {
                        unit_input
                            .iter()
                            .map(|input| learning_rate * error * input)
                            .collect()
                    })
                    .collect()
            })
            .collect();

        // Every unit's new matrix is computed before any weight moves.
        let mut new_weights = Vec::with_capacity(unit_count);
        for (unit, unit_deltas) in self.units.iter_mut().zip(deltas.iter()) {
            new_weights.push(unit.compute_update(unit_deltas, &outputs)?);
        }
        for (unit, unit_weights) in self.units.iter_mut().zip(new_weights) {
            unit.set_weights(unit_weights)?;
        }
        Ok(())
    }

    /// Runs the learning step over every example of the dataset, `nb_cycles`
    /// times. Examples come in dataset map order, which is not guaranteed
    /// stable; supply pre-shuffled ids upstream if ordering matters.
    pub fn learn_cycles(&mut self, dataset: &Dataset, nb_cycles: usize) -> Result<()> {
        for _ in 0..nb_cycles {
            for example in dataset.examples() {
                self.learn(example)?;
            }
        }
        Ok(())
    }

    /// All weights in layer/node/edge enumeration order.
    pub fn weights(&self) -> Vec<Vec<Vec<f64>>> {
        self.units.iter().map(|unit| unit.weights()).collect()
    }

    /// Replaces all weights. The nested shape must match the topology
    /// exactly; nothing is written until every layer has been checked.
    pub fn set_weights(&mut self, weights: Vec<Vec<Vec<f64>>>) -> Result<()> {
        if weights.len() != self.units.len() {
            return Err(NnError::Dimension(format!(
                "{} weight matrices for {} units",
                weights.len(),
                self.units.len()
            )));
        }
        for (index, (unit, unit_weights)) in self.units.iter().zip(weights.iter()).enumerate() {
            let current = unit.weights();
            let shape_matches = unit_weights.len() == current.len()
                && unit_weights
                    .iter()
                    .zip(current.iter())
                    .all(|(new, old)| new.len() == old.len());
            if !shape_matches {
                return Err(NnError::Dimension(format!(
                    "weight matrix shape mismatch at unit {}",
                    index + 2
                )));
            }
        }
        for (unit, unit_weights) in self.units.iter_mut().zip(weights) {
            unit.set_weights(unit_weights)?;
        }
        Ok(())
    }

    /// Serializes the full network (topology, strategies and weights) to a
    /// pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file written by `save_json`.
    pub fn load_json(path: &str) -> Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
