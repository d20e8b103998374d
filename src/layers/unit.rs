use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::error::{NnError, Result};
use crate::error_fn::error_fn::ErrorFn;
use crate::optim::update_rule::UpdateRule;

/// One computational node: a weight per incoming signal, including the extra
/// bias weight when the network has bias enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    weights: Vec<f64>,
}

impl Node {
    /// Creates a node with `previous_node_nb` weights drawn uniformly from
    /// [-1, 1].
    pub fn new(previous_node_nb: usize) -> Node {
        let mut rng = rand::thread_rng();
        let weights = (0..previous_node_nb)
            .map(|_| rng.gen::<f64>() * 2.0 - 1.0)
            .collect();
        Node { weights }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn set_weights(&mut self, weights: Vec<f64>) -> Result<()> {
        if weights.len() != self.weights.len() {
            return Err(NnError::Dimension(format!(
                "node expects {} weights, got {}",
                self.weights.len(),
                weights.len()
            )));
        }
        self.weights = weights;
        Ok(())
    }

    /// Weighted sum of `input` against this node's weights, activated.
    pub fn compute_output(&self, input: &[f64], activation: Activation) -> Result<f64> {
        activation.compute(input, &self.weights)
    }
}

/// One unit (layer) of the network: an ordered group of nodes sharing an
/// activation, an update rule and an optional error-function override.
///
/// The input layer is not a `Unit`; it exists only as the network's declared
/// input width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    nodes: Vec<Node>,
    activation: Activation,
    update_rule: UpdateRule,
    error_fn: Option<ErrorFn>,
}

impl Unit {
    pub fn new(
        node_nb: usize,
        previous_node_nb: usize,
        activation: Activation,
        update_rule: UpdateRule,
        error_fn: Option<ErrorFn>,
    ) -> Result<Unit> {
        if node_nb == 0 {
            return Err(NnError::Topology(
                "a unit needs at least one node".to_string(),
            ));
        }

        let nodes = (0..node_nb).map(|_| Node::new(previous_node_nb)).collect();
        Ok(Unit {
            nodes,
            activation,
            update_rule,
            error_fn,
        })
    }

    pub fn node_nb(&self) -> usize {
        self.nodes.len()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn update_rule(&self) -> &UpdateRule {
        &self.update_rule
    }

    /// Mutable access to the update rule, e.g. to feed reward and successor
    /// output to a TD rule between learning steps.
    pub fn update_rule_mut(&mut self) -> &mut UpdateRule {
        &mut self.update_rule
    }

    pub fn error_fn(&self) -> Option<ErrorFn> {
        self.error_fn
    }

    /// Weights of all nodes, in node order.
    pub fn weights(&self) -> Vec<Vec<f64>> {
        self.nodes.iter().map(|node| node.weights.clone()).collect()
    }

    /// Replaces every node's weights. The matrix must match the unit's shape.
    pub fn set_weights(&mut self, weights: Vec<Vec<f64>>) -> Result<()> {
        if weights.len() != self.nodes.len() {
            return Err(NnError::Dimension(format!(
                "unit expects {} weight rows, got {}",
                self.nodes.len(),
                weights.len()
            )));
        }
        for (node, row) in self.nodes.iter_mut().zip(weights) {
            node.set_weights(row)?;
        }
        Ok(())
    }

    /// Output of every node for the given input vector.
    pub fn compute_output(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.nodes
            .iter()
            .map(|node| node.compute_output(input, self.activation))
            .collect()
    }

    /// Error vector for this unit. The attached error function wins when one
    /// is set; otherwise the terminal unit uses `Output` semantics and every
    /// other unit uses `WeightedSum`.
    pub fn compute_errors(
        &self,
        is_output_unit: bool,
        next_errors: Option<&[f64]>,
        desired_output: &[f64],
        outputs: &[f64],
        next_weights: Option<&[Vec<f64>]>,
    ) -> Result<Vec<f64>> {
        let error_fn = self.error_fn.unwrap_or(if is_output_unit {
            ErrorFn::Output
        } else {
            ErrorFn::WeightedSum
        });
        error_fn.compute_errors(
            next_errors,
            desired_output,
            outputs,
            next_weights,
            self.activation,
        )
    }

    /// New weight matrix from the unit's update rule. Does not commit; the
    /// network applies all units' matrices together.
    pub fn compute_update(
        &mut self,
        deltas: &[Vec<f64>],
        all_outputs: &[Vec<f64>],
    ) -> Result<Vec<Vec<f64>>> {
        let weights = self.weights();
        self.update_rule.compute_update(&weights, deltas, all_outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_with_weights(weights: Vec<Vec<f64>>, activation: Activation) -> Unit {
        let mut unit = Unit::new(
            weights.len(),
            weights[0].len(),
            activation,
            UpdateRule::GradientStep,
            None,
        )
        .unwrap();
        unit.set_weights(weights).unwrap();
        unit
    }

    #[test]
    fn node_weights_start_in_unit_interval() {
        let node = Node::new(64);
        assert_eq!(node.weights().len(), 64);
        assert!(node.weights().iter().all(|w| (-1.0..=1.0).contains(w)));
    }

    #[test]
    fn node_rejects_wrong_weight_count() {
        let mut node = Node::new(3);
        assert!(matches!(
            node.set_weights(vec![1.0]),
            Err(NnError::Dimension(_))
        ));
    }

    #[test]
    fn zero_node_unit_is_a_topology_error() {
        let err = Unit::new(0, 2, Activation::Linear, UpdateRule::GradientStep, None);
        assert!(matches!(err, Err(NnError::Topology(_))));
    }

    #[test]
    fn unit_computes_per_node_outputs() {
        let unit = unit_with_weights(
            vec![vec![1.0, 0.0], vec![0.0, 2.0]],
            Activation::Linear,
        );
        let outputs = unit.compute_output(&[3.0, 4.0]).unwrap();
        assert_eq!(outputs, vec![3.0, 8.0]);
    }

    #[test]
    fn unit_output_is_deterministic_for_fixed_weights() {
        let unit = unit_with_weights(vec![vec![0.3, -0.7]], Activation::Sigmoid);
        let first = unit.compute_output(&[0.5, 0.25]).unwrap();
        let second = unit.compute_output(&[0.5, 0.25]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unit_rejects_mismatched_input_arity() {
        let unit = unit_with_weights(vec![vec![1.0, 1.0]], Activation::Linear);
        assert!(matches!(
            unit.compute_output(&[1.0]),
            Err(NnError::Dimension(_))
        ));
    }

    #[test]
    fn set_weights_rejects_wrong_row_count() {
        let mut unit = unit_with_weights(vec![vec![1.0, 1.0]], Activation::Linear);
        assert!(matches!(
            unit.set_weights(vec![vec![1.0, 1.0], vec![0.0, 0.0]]),
            Err(NnError::Dimension(_))
        ));
    }

    #[test]
    fn positional_default_picks_output_or_weighted_sum() {
        let unit = unit_with_weights(vec![vec![1.0]], Activation::Linear);

        let output_errors = unit
            .compute_errors(true, None, &[2.0], &[0.5], None)
            .unwrap();
        assert_eq!(output_errors, vec![1.5]);

        // As a hidden unit without next-layer weights this must fail loudly.
        let err = unit.compute_errors(false, None, &[], &[0.5], None);
        assert!(matches!(err, Err(NnError::Topology(_))));
    }

    #[test]
    fn error_fn_override_wins_over_position() {
        let mut unit = Unit::new(
            1,
            1,
            Activation::Linear,
            UpdateRule::GradientStep,
            Some(ErrorFn::Output),
        )
        .unwrap();
        unit.set_weights(vec![vec![1.0]]).unwrap();

        // Hidden position, but the override makes it use Output semantics.
        let errors = unit
            .compute_errors(false, None, &[1.0], &[0.25], None)
            .unwrap();
        assert_eq!(errors, vec![0.75]);
    }
}
