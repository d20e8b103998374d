use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::error::{NnError, Result};
use crate::error_fn::error_fn::ErrorFn;
use crate::network::network::Network;
use crate::optim::update_rule::UpdateRule;

/// Structural description of one non-input unit, with strategies referenced
/// by registered name so the record stays independent of concrete types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTopology {
    pub node_nb: usize,
    pub activation: String,
    pub update_rule: String,
    /// `None` means "use the layer-position default".
    pub error_fn: Option<String>,
}

/// Full structural description of a network (layer count, widths and
/// attached strategies), independent of its current weight values.
///
/// Can be saved and restored separately from the weights, so an architecture
/// can be stored before any training happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub learning_rate: f64,
    pub bias: bool,
    pub input_width: usize,
    pub units: Vec<UnitTopology>,
}

impl Topology {
    /// Total layer count, input layer included.
    pub fn nb_units(&self) -> usize {
        self.units.len() + 1
    }

    /// Serializes the topology to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `Topology` from a JSON file.
    pub fn load_json(path: &str) -> Result<Topology> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Network {
    /// Extracts the structural descriptor of this network.
    pub fn topology(&self) -> Result<Topology> {
        let input_width = self.input_width().ok_or_else(|| {
            NnError::Topology("network has no input layer to describe".to_string())
        })?;
        let learning_rate = self.learning_rate().ok_or_else(|| {
            NnError::Configuration(
                "no learning rate set; a topology record requires one".to_string(),
            )
        })?;

        let units = self
            .units()
            .iter()
            .map(|unit| UnitTopology {
                node_nb: unit.node_nb(),
                activation: unit.activation().name().to_string(),
                update_rule: unit.update_rule().name().to_string(),
                error_fn: unit.error_fn().map(|error_fn| error_fn.name().to_string()),
            })
            .collect();

        Ok(Topology {
            learning_rate,
            bias: self.bias(),
            input_width,
            units,
        })
    }

    /// Rebuilds this network from a topology descriptor.
    ///
    /// Any prior topology is fully discarded first, and the layers are
    /// reconstructed from the input layer onward through the same
    /// `add_input`/`add_unit` path as manual construction, so the same
    /// invariants hold either way. Weights come out freshly randomized;
    /// import them separately if needed.
    pub fn set_topology(&mut self, topology: &Topology) -> Result<()> {
        self.reset();
        self.set_learning_rate(topology.learning_rate);
        self.set_bias_unchecked(topology.bias);
        self.add_input(topology.input_width)?;

        for unit in &topology.units {
            let activation = Activation::from_name(&unit.activation)?;
            let update_rule = UpdateRule::from_name(&unit.update_rule)?;
            match &unit.error_fn {
                Some(name) => {
                    let error_fn = ErrorFn::from_name(name)?;
                    self.add_unit_with_error(unit.node_nb, activation, update_rule, error_fn)?;
                }
                None => self.add_unit(unit.node_nb, activation, update_rule)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_network() -> Network {
        let mut network = Network::new(true);
        network.set_learning_rate(0.1);
        network.add_input(4).unwrap();
        network
            .add_unit(3, Activation::Sigmoid, UpdateRule::GradientStep)
            .unwrap();
        network
            .add_unit_with_error(
                2,
                Activation::Linear,
                UpdateRule::GradientStep,
                ErrorFn::Output,
            )
            .unwrap();
        network
    }

    #[test]
    fn topology_describes_layers_and_strategies() {
        let topology = sample_network().topology().unwrap();
        assert_eq!(topology.nb_units(), 3);
        assert_eq!(topology.input_width, 4);
        assert_eq!(topology.units[0].node_nb, 3);
        assert_eq!(topology.units[0].activation, "ac_sigmoid");
        assert_eq!(topology.units[0].update_rule, "up_backpropagation");
        assert_eq!(topology.units[0].error_fn, None);
        assert_eq!(topology.units[1].error_fn.as_deref(), Some("er_output"));
    }

    #[test]
    fn set_topology_round_trips_onto_a_fresh_network() {
        let topology = sample_network().topology().unwrap();

        let mut restored = Network::new(false);
        restored.set_topology(&topology).unwrap();
        assert_eq!(restored.topology().unwrap(), topology);

        // Weight shapes follow the descriptor: 3 nodes of 5 weights (bias),
        // then 2 nodes of 4.
        let weights = restored.weights();
        assert_eq!(weights[0].len(), 3);
        assert_eq!(weights[0][0].len(), 5);
        assert_eq!(weights[1].len(), 2);
        assert_eq!(weights[1][0].len(), 4);
    }

    #[test]
    fn set_topology_discards_any_prior_structure() {
        let mut network = Network::new(false);
        network.set_learning_rate(0.9);
        network.add_input(7).unwrap();
        network
            .add_unit(7, Activation::Linear, UpdateRule::GradientStep)
            .unwrap();

        let topology = sample_network().topology().unwrap();
        network.set_topology(&topology).unwrap();
        assert_eq!(network.input_width(), Some(4));
        assert_eq!(network.units().len(), 2);
        assert_eq!(network.learning_rate(), Some(0.1));
        assert!(network.bias());
    }

    #[test]
    fn unknown_strategy_names_fail_resolution() {
        let mut topology = sample_network().topology().unwrap();
        topology.units[0].activation = "ac_tanh".to_string();
        let mut network = Network::new(false);
        assert!(matches!(
            network.set_topology(&topology),
            Err(NnError::NameResolution(_))
        ));
    }

    #[test]
    fn topology_without_learning_rate_is_a_configuration_error() {
        let mut network = Network::new(false);
        network.add_input(2).unwrap();
        network
            .add_unit(1, Activation::Linear, UpdateRule::GradientStep)
            .unwrap();
        assert!(matches!(
            network.topology(),
            Err(NnError::Configuration(_))
        ));
    }
}
