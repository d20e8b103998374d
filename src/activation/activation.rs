use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::vector::weighted_sum;
use crate::registry;

/// Scalar activation applied by every node of a unit after its weighted sum.
///
/// Each variant is stateless and deterministic. `derivative()` takes the
/// *activated output* of the function, not its input: the sigmoid derivative
/// is expressed as `o * (1 - o)`, which only works when callers pass the
/// post-activation value. The backward pass relies on this convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Activation {
    /// activate(x) = x; derivative = 1.
    Linear,
    /// Step function: 1 if x > 0, else -1. The derivative is 1 by convention;
    /// the function is not differentiable at 0, which makes this variant
    /// unsuitable below another trainable unit.
    Perceptron,
    /// activate(x) = 1 / (1 + e^-x); derivative(o) = o * (1 - o).
    Sigmoid,
}

impl Activation {
    pub fn activate(&self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Perceptron => {
                if x > 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }

    /// Derivative evaluated at the activated output `o = activate(x)`.
    pub fn derivative(&self, activated: f64) -> f64 {
        match self {
            Activation::Linear => 1.0,
            Activation::Perceptron => 1.0,
            Activation::Sigmoid => activated * (1.0 - activated),
        }
    }

    /// Weighted sum of `inputs` against `weights`, then activation.
    pub fn compute(&self, inputs: &[f64], weights: &[f64]) -> Result<f64> {
        Ok(self.activate(weighted_sum(inputs, weights)?))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Activation::Linear => "ac_linear",
            Activation::Perceptron => "ac_perceptron",
            Activation::Sigmoid => "ac_sigmoid",
        }
    }

    pub fn from_name(name: &str) -> Result<Activation> {
        registry::check_prefix(name, registry::ACTIVATION_PREFIX)?;
        match name {
            "ac_linear" => Ok(Activation::Linear),
            "ac_perceptron" => Ok(Activation::Perceptron),
            "ac_sigmoid" => Ok(Activation::Sigmoid),
            _ => Err(registry::unknown(name, "activation")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Finite-difference check: derivative(activate(x)) against
    /// (f(x + h) - f(x - h)) / 2h.
    fn assert_derivative_matches(activation: Activation, x: f64) {
        let h = 1e-6;
        let numeric = (activation.activate(x + h) - activation.activate(x - h)) / (2.0 * h);
        let analytic = activation.derivative(activation.activate(x));
        assert!(
            (numeric - analytic).abs() < 1e-5,
            "{:?} at x={x}: numeric {numeric} vs analytic {analytic}",
            activation
        );
    }

    #[test]
    fn linear_derivative_matches_finite_difference() {
        for x in [-2.0, -0.5, 0.0, 0.3, 4.0] {
            assert_derivative_matches(Activation::Linear, x);
        }
    }

    #[test]
    fn sigmoid_derivative_matches_finite_difference() {
        for x in [-3.0, -1.0, 0.0, 0.7, 2.5] {
            assert_derivative_matches(Activation::Sigmoid, x);
        }
    }

    #[test]
    fn perceptron_steps_at_zero() {
        assert_eq!(Activation::Perceptron.activate(0.1), 1.0);
        assert_eq!(Activation::Perceptron.activate(0.0), -1.0);
        assert_eq!(Activation::Perceptron.activate(-0.1), -1.0);
        // Documented convention, not a real derivative.
        assert_eq!(Activation::Perceptron.derivative(1.0), 1.0);
    }

    #[test]
    fn sigmoid_is_bounded() {
        assert!(Activation::Sigmoid.activate(40.0) > 0.999);
        assert!(Activation::Sigmoid.activate(-40.0) < 0.001);
    }

    #[test]
    fn compute_applies_activation_to_weighted_sum() {
        let value = Activation::Linear.compute(&[1.0, 2.0], &[3.0, -1.0]).unwrap();
        assert_eq!(value, 1.0);
    }

    #[test]
    fn names_round_trip() {
        for activation in [Activation::Linear, Activation::Perceptron, Activation::Sigmoid] {
            assert_eq!(Activation::from_name(activation.name()).unwrap(), activation);
        }
    }

    #[test]
    fn from_name_rejects_unknown_and_wrong_prefix() {
        assert!(Activation::from_name("ac_tanh").is_err());
        assert!(Activation::from_name("up_backpropagation").is_err());
    }
}
