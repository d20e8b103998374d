use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};
use crate::registry;

/// Turns per-edge weight deltas into a unit's new weight matrix.
///
/// Deltas arrive with the network learning rate already baked in
/// (`learning_rate * error * input`, computed by the caller); neither rule
/// applies a rate of its own. Rules return the full new matrix instead of
/// mutating in place so the network can commit all units at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UpdateRule {
    /// Plain gradient step: `new = old + delta`, elementwise.
    GradientStep,
    /// TD(λ) reinforcement-style update with per-edge eligibility traces.
    TdLambda(TdLambda),
}

/// State for the TD(λ) update.
///
/// The eligibility traces live here, not in caller-supplied buffers: one
/// trace per edge, decayed by `gamma * lambda` on every step and accumulating
/// the step's delta. The driver feeds `reward` and `next_output` between
/// learning steps; `current_output` is read from the forward pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdLambda {
    pub gamma: f64,
    pub lambda: f64,
    reward: f64,
    next_output: f64,
    traces: Vec<Vec<f64>>,
}

impl TdLambda {
    pub fn new(gamma: f64, lambda: f64) -> TdLambda {
        TdLambda {
            gamma,
            lambda,
            reward: 0.0,
            next_output: 0.0,
            traces: Vec::new(),
        }
    }

    /// Reward observed since the previous learning step.
    pub fn set_reward(&mut self, reward: f64) {
        self.reward = reward;
    }

    /// Network output for the successor state, as estimated by the driver.
    pub fn set_next_output(&mut self, next_output: f64) {
        self.next_output = next_output;
    }

    /// Clears the traces, e.g. at an episode boundary.
    pub fn reset_traces(&mut self) {
        self.traces.clear();
    }

    pub fn traces(&self) -> &[Vec<f64>] {
        &self.traces
    }

    fn step(
        &mut self,
        weights: &[Vec<f64>],
        deltas: &[Vec<f64>],
        current_output: f64,
    ) -> Result<Vec<Vec<f64>>> {
        if self.traces.is_empty() {
            self.traces = deltas.iter().map(|row| vec![0.0; row.len()]).collect();
        }
        check_shape(&self.traces, deltas, "eligibility traces")?;

        let decay = self.gamma * self.lambda;
        for (trace_row, delta_row) in self.traces.iter_mut().zip(deltas.iter()) {
            for (trace, delta) in trace_row.iter_mut().zip(delta_row.iter()) {
                *trace = decay * *trace + delta;
            }
        }

        let td_error = self.reward + self.gamma * self.next_output - current_output;
        Ok(weights
            .iter()
            .zip(self.traces.iter())
            .map(|(weight_row, trace_row)| {
                weight_row
                    .iter()
                    .zip(trace_row.iter())
                    .map(|(weight, trace)| weight + td_error * trace)
                    .collect()
            })
            .collect())
    }
}

impl Default for TdLambda {
    fn default() -> TdLambda {
        TdLambda::new(0.001, 0.1)
    }
}

impl UpdateRule {
    /// Computes a unit's new weight matrix from its current weights and the
    /// caller-computed deltas. `outputs` is the full forward-pass sequence;
    /// only the TD rule reads it (terminal output, first node).
    pub fn compute_update(
        &mut self,
        weights: &[Vec<f64>],
        deltas: &[Vec<f64>],
        outputs: &[Vec<f64>],
    ) -> Result<Vec<Vec<f64>>> {
        check_shape(weights, deltas, "weight deltas")?;

        match self {
            UpdateRule::GradientStep => Ok(weights
                .iter()
                .zip(deltas.iter())
                .map(|(weight_row, delta_row)| {
                    weight_row
                        .iter()
                        .zip(delta_row.iter())
                        .map(|(weight, delta)| weight + delta)
                        .collect()
                })
                .collect()),

            UpdateRule::TdLambda(td) => {
                let current_output = outputs
                    .last()
                    .and_then(|values| values.first())
                    .copied()
                    .ok_or_else(|| {
                        NnError::Dimension(
                            "TD update needs a terminal output value".to_string(),
                        )
                    })?;
                td.step(weights, deltas, current_output)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UpdateRule::GradientStep => "up_backpropagation",
            UpdateRule::TdLambda(_) => "up_tdlearning",
        }
    }

    pub fn from_name(name: &str) -> Result<UpdateRule> {
        registry::check_prefix(name, registry::UPDATE_RULE_PREFIX)?;
        match name {
            "up_backpropagation" => Ok(UpdateRule::GradientStep),
            "up_tdlearning" => Ok(UpdateRule::TdLambda(TdLambda::default())),
            _ => Err(registry::unknown(name, "update rule")),
        }
    }
}

fn check_shape(left: &[Vec<f64>], right: &[Vec<f64>], what: &str) -> Result<()> {
    if left.len() != right.len()
        || left
            .iter()
            .zip(right.iter())
            .any(|(l, r)| l.len() != r.len())
    {
        return Err(NnError::Dimension(format!(
            "{what} do not match the unit's weight matrix shape"
        )));
    }
    Ok(())
}
