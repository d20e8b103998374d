use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::error::{NnError, Result};
use crate::registry;

/// Backward error propagation for one unit.
///
/// A unit normally gets its error function from its position (`Output` at
/// the terminal unit, `WeightedSum` everywhere else) but can carry an
/// explicit override. Error values are plain floating point with no clipping;
/// blow-up under a pathological learning rate is the caller's problem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ErrorFn {
    /// Terminal-unit error: `derivative(output[i]) * (desired[i] - output[i])`.
    Output,
    /// Hidden-unit error: for node i, sum `next_error[j] * next_weights[j][i]`
    /// over the next unit's nodes j, times `derivative(output[i])`.
    WeightedSum,
}

impl ErrorFn {
    /// Computes this unit's error vector, one scalar per node.
    ///
    /// `outputs` is this unit's own output vector from the forward pass (with
    /// the bias constant still appended for non-terminal units).
    /// `next_errors`/`next_weights` belong to the unit one step closer to the
    /// output and are `None` at the terminal unit.
    pub fn compute_errors(
        &self,
        next_errors: Option<&[f64]>,
        desired_output: &[f64],
        outputs: &[f64],
        next_weights: Option<&[Vec<f64>]>,
        activation: Activation,
    ) -> Result<Vec<f64>> {
        match self {
            ErrorFn::Output => {
                if desired_output.len() != outputs.len() {
                    return Err(NnError::Dimension(format!(
                        "output error over {} desired values and {} outputs",
                        desired_output.len(),
                        outputs.len()
                    )));
                }

                Ok(desired_output
                    .iter()
                    .zip(outputs.iter())
                    .map(|(desired, computed)| {
                        activation.derivative(*computed) * (desired - computed)
                    })
                    .collect())
            }

            ErrorFn::WeightedSum => {
                let next_weights = next_weights.ok_or_else(|| {
                    NnError::Topology(
                        "weighted-sum error needs next-unit weights; \
                         none exist at the output unit"
                            .to_string(),
                    )
                })?;
                let next_errors = next_errors.ok_or_else(|| {
                    NnError::Topology(
                        "weighted-sum error needs next-unit errors; \
                         none exist at the output unit"
                            .to_string(),
                    )
                })?;

                let width = next_weights.first().map(|row| row.len()).unwrap_or(0);
                if width != outputs.len() {
                    return Err(NnError::Dimension(format!(
                        "weighted-sum error over {} next-unit weight columns \
                         and {} outputs",
                        width,
                        outputs.len()
                    )));
                }

                let mut error_sum = vec![0.0; width];
                for (next_error, weights) in next_errors.iter().zip(next_weights.iter()) {
                    if weights.len() != width {
                        return Err(NnError::Dimension(format!(
                            "ragged next-unit weights: expected {width}, got {}",
                            weights.len()
                        )));
                    }
                    for (sum, weight) in error_sum.iter_mut().zip(weights.iter()) {
                        *sum += next_error * weight;
                    }
                }

                Ok(error_sum
                    .iter()
                    .zip(outputs.iter())
                    .map(|(sum, computed)| activation.derivative(*computed) * sum)
                    .collect())
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorFn::Output => "er_output",
            ErrorFn::WeightedSum => "er_weightedsum",
        }
    }

    pub fn from_name(name: &str) -> Result<ErrorFn> {
        registry::check_prefix(name, registry::ERROR_FN_PREFIX)?;
        match name {
            "er_output" => Ok(ErrorFn::Output),
            "er_weightedsum" => Ok(ErrorFn::WeightedSum),
            _ => Err(registry::unknown(name, "error function")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_error_is_derivative_times_difference() {
        let errors = ErrorFn::Output
            .compute_errors(None, &[1.0, 0.0], &[0.25, 0.75], None, Activation::Linear)
            .unwrap();
        assert_eq!(errors, vec![0.75, -0.75]);
    }

    #[test]
    fn output_error_uses_post_activation_derivative() {
        // Sigmoid derivative at an output of 0.5 is 0.25.
        let errors = ErrorFn::Output
            .compute_errors(None, &[1.0], &[0.5], None, Activation::Sigmoid)
            .unwrap();
        assert!((errors[0] - 0.125).abs() < 1e-12);
    }

    #[test]
    fn output_error_rejects_length_mismatch() {
        let err = ErrorFn::Output.compute_errors(None, &[1.0], &[0.5, 0.5], None, Activation::Linear);
        assert!(matches!(err, Err(NnError::Dimension(_))));
    }

    #[test]
    fn weighted_sum_propagates_through_next_weights() {
        // Next unit: 2 nodes with errors [1.0, -2.0] and 3 incoming weights each.
        let next_weights = vec![vec![0.5, 1.0, 2.0], vec![1.0, 0.0, -1.0]];
        let errors = ErrorFn::WeightedSum
            .compute_errors(
                Some(&[1.0, -2.0]),
                &[],
                &[1.0, 1.0, 1.0],
                Some(&next_weights),
                Activation::Linear,
            )
            .unwrap();
        // Column sums: 0.5*1 + 1*(-2) = -1.5; 1*1 + 0*(-2) = 1; 2*1 + (-1)*(-2) = 4.
        assert_eq!(errors, vec![-1.5, 1.0, 4.0]);
    }

    #[test]
    fn weighted_sum_at_output_unit_is_a_topology_error() {
        let err = ErrorFn::WeightedSum.compute_errors(None, &[1.0], &[0.5], None, Activation::Linear);
        assert!(matches!(err, Err(NnError::Topology(_))));
    }

    #[test]
    fn weighted_sum_rejects_output_width_mismatch() {
        let next_weights = vec![vec![1.0, 1.0]];
        let err = ErrorFn::WeightedSum.compute_errors(
            Some(&[1.0]),
            &[],
            &[0.5],
            Some(&next_weights),
            Activation::Linear,
        );
        assert!(matches!(err, Err(NnError::Dimension(_))));
    }

    #[test]
    fn names_round_trip() {
        for error_fn in [ErrorFn::Output, ErrorFn::WeightedSum] {
            assert_eq!(ErrorFn::from_name(error_fn.name()).unwrap(), error_fn);
        }
        assert!(ErrorFn::from_name("er_squared").is_err());
        assert!(ErrorFn::from_name("la_max").is_err());
    }
}
