use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};
use crate::network::network::Network;
use crate::network::topology::{Topology, UnitTopology};

/// One weight table row: fully 1-indexed, with the input layer implicitly
/// unit 1, so weighted units start at id 2.
#[derive(Debug, Serialize, Deserialize)]
struct WeightRecord {
    id_unit: usize,
    id_node: usize,
    id_weight: usize,
    weight: f64,
}

/// CSV persistence collaborator for networks.
///
/// Writes two flat files next to each other, named from a common prefix:
/// `<prefix>_str.csv` holds the topology as a two-row field/value table and
/// `<prefix>_wgt.csv` holds one row per weight edge.
pub struct NetworkIoCsv {
    prefix: PathBuf,
}

impl NetworkIoCsv {
    pub fn new<P: Into<PathBuf>>(prefix: P) -> NetworkIoCsv {
        NetworkIoCsv {
            prefix: prefix.into(),
        }
    }

    fn structure_path(&self) -> PathBuf {
        append_suffix(&self.prefix, "_str.csv")
    }

    fn weights_path(&self) -> PathBuf {
        append_suffix(&self.prefix, "_wgt.csv")
    }

    /// Writes the network's topology as a field row followed by a value row.
    ///
    /// Fields: `learning_rate`, `bias`, `nb_units`, `unit1_nbnodes` (input
    /// width), then `unitN_nbnodes` / `unitN_activation` / `unitN_updator` /
    /// `unitN_errorfn` per weighted unit, N starting at 2. An absent error
    /// function writes the `None` sentinel.
    pub fn write_structure(&self, network: &Network) -> Result<()> {
        let topology = network.topology()?;

        let mut fields = vec![
            ("learning_rate".to_string(), topology.learning_rate.to_string()),
            ("bias".to_string(), topology.bias.to_string()),
            ("nb_units".to_string(), topology.nb_units().to_string()),
            ("unit1_nbnodes".to_string(), topology.input_width.to_string()),
        ];
        for (offset, unit) in topology.units.iter().enumerate() {
            let id_unit = offset + 2;
            fields.push((format!("unit{id_unit}_nbnodes"), unit.node_nb.to_string()));
            fields.push((format!("unit{id_unit}_activation"), unit.activation.clone()));
            fields.push((format!("unit{id_unit}_updator"), unit.update_rule.clone()));
            fields.push((
                format!("unit{id_unit}_errorfn"),
                unit.error_fn.clone().unwrap_or_else(|| "None".to_string()),
            ));
        }

        let mut writer = csv::Writer::from_path(self.structure_path())?;
        writer.write_record(fields.iter().map(|(field, _)| field.as_str()))?;
        writer.write_record(fields.iter().map(|(_, value)| value.as_str()))?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a structure file and rebuilds the given network from it.
    pub fn read_structure(&self, network: &mut Network) -> Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(self.structure_path())?;

        let mut rows = reader.records();
        let fields = rows.next().transpose()?.ok_or_else(|| {
            NnError::Value("structure file is missing its field row".to_string())
        })?;
        let values = rows.next().transpose()?.ok_or_else(|| {
            NnError::Value("structure file is missing its value row".to_string())
        })?;

        let record: HashMap<String, String> = fields
            .iter()
            .zip(values.iter())
            .map(|(field, value)| (field.to_string(), value.to_string()))
            .collect();

        let nb_units: usize = parse_field(&record, "nb_units")?;
        let mut units = Vec::with_capacity(nb_units.saturating_sub(1));
        for id_unit in 2..=nb_units {
            let error_fn = field(&record, &format!("unit{id_unit}_errorfn"))?;
            units.push(UnitTopology {
                node_nb: parse_field(&record, &format!("unit{id_unit}_nbnodes"))?,
                activation: field(&record, &format!("unit{id_unit}_activation"))?,
                update_rule: field(&record, &format!("unit{id_unit}_updator"))?,
                error_fn: if error_fn == "None" { None } else { Some(error_fn) },
            });
        }

        let topology = Topology {
            learning_rate: parse_field(&record, "learning_rate")?,
            bias: parse_field(&record, "bias")?,
            input_width: parse_field(&record, "unit1_nbnodes")?,
            units,
        };
        network.set_topology(&topology)
    }

    /// Writes every weight as a `(id_unit, id_node, id_weight, weight)` row
    /// in layer/node/edge enumeration order.
    pub fn write_weights(&self, network: &Network) -> Result<()> {
        let mut writer = csv::Writer::from_path(self.weights_path())?;
        for (offset, unit_weights) in network.weights().iter().enumerate() {
            for (index_node, node_weights) in unit_weights.iter().enumerate() {
                for (index_weight, weight) in node_weights.iter().enumerate() {
                    writer.serialize(WeightRecord {
                        id_unit: offset + 2,
                        id_node: index_node + 1,
                        id_weight: index_weight + 1,
                        weight: *weight,
                    })?;
                }
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Reads a weight file into the network. The network's topology must
    /// already match: rows addressing a unit, node or edge the network does
    /// not have fail with a dimension error and nothing is committed.
    pub fn read_weights(&self, network: &mut Network) -> Result<()> {
        let mut weights = network.weights();

        let mut reader = csv::Reader::from_path(self.weights_path())?;
        for record in reader.deserialize() {
            let row: WeightRecord = record?;
            let slot = weights
                .get_mut(row.id_unit.wrapping_sub(2))
                .and_then(|unit| unit.get_mut(row.id_node.wrapping_sub(1)))
                .and_then(|node| node.get_mut(row.id_weight.wrapping_sub(1)))
                .ok_or_else(|| {
                    NnError::Dimension(format!(
                        "weight row (unit {}, node {}, weight {}) does not fit the topology",
                        row.id_unit, row.id_node, row.id_weight
                    ))
                })?;
            *slot = row.weight;
        }

        network.set_weights(weights)
    }
}

fn append_suffix(prefix: &PathBuf, suffix: &str) -> PathBuf {
    let mut path = prefix.clone().into_os_string();
    path.push(suffix);
    PathBuf::from(path)
}

fn field(record: &HashMap<String, String>, key: &str) -> Result<String> {
    record.get(key).cloned().ok_or_else(|| {
        NnError::Value(format!("structure file is missing the '{key}' field"))
    })
}

fn parse_field<T: std::str::FromStr>(record: &HashMap<String, String>, key: &str) -> Result<T> {
    let value = field(record, key)?;
    value.parse::<T>().map_err(|_| {
        NnError::Value(format!("cannot parse '{value}' for the '{key}' field"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::Activation;
    use crate::error_fn::error_fn::ErrorFn;
    use crate::optim::update_rule::UpdateRule;
    use tempfile::tempdir;

    fn sample_network() -> Network {
        let mut network = Network::new(true);
        network.set_learning_rate(0.2);
        network.add_input(2).unwrap();
        network
            .add_unit(3, Activation::Sigmoid, UpdateRule::GradientStep)
            .unwrap();
        network
            .add_unit_with_error(
                1,
                Activation::Sigmoid,
                UpdateRule::GradientStep,
                ErrorFn::Output,
            )
            .unwrap();
        network
    }

    #[test]
    fn structure_round_trips_through_csv() {
        let dir = tempdir().unwrap();
        let io = NetworkIoCsv::new(dir.path().join("model"));

        let network = sample_network();
        io.write_structure(&network).unwrap();

        let mut restored = Network::new(false);
        io.read_structure(&mut restored).unwrap();
        assert_eq!(
            restored.topology().unwrap(),
            network.topology().unwrap()
        );
    }

    #[test]
    fn weights_round_trip_through_csv() {
        let dir = tempdir().unwrap();
        let io = NetworkIoCsv::new(dir.path().join("model"));

        let network = sample_network();
        io.write_weights(&network).unwrap();

        let mut restored = sample_network();
        io.read_weights(&mut restored).unwrap();
        assert_eq!(restored.weights(), network.weights());
    }

    #[test]
    fn weight_rows_outside_the_topology_are_rejected() {
        let dir = tempdir().unwrap();
        let io = NetworkIoCsv::new(dir.path().join("model"));

        io.write_weights(&sample_network()).unwrap();

        // A narrower network cannot absorb the same weight table.
        let mut narrow = Network::new(true);
        narrow.set_learning_rate(0.2);
        narrow.add_input(2).unwrap();
        narrow
            .add_unit(1, Activation::Sigmoid, UpdateRule::GradientStep)
            .unwrap();
        let before = narrow.weights();
        let err = io.read_weights(&mut narrow);
        assert!(matches!(err, Err(NnError::Dimension(_))));
        assert_eq!(narrow.weights(), before);
    }
}
