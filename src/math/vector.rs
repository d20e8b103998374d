use crate::error::{NnError, Result};

/// Dot product of an input vector and a weight vector of equal length.
///
/// This is the weighted sum every node computes before activation. Mismatched
/// lengths are a contract violation, not a truncation.
pub fn weighted_sum(inputs: &[f64], weights: &[f64]) -> Result<f64> {
    if inputs.len() != weights.len() {
        return Err(NnError::Dimension(format!(
            "weighted sum over {} inputs and {} weights",
            inputs.len(),
            weights.len()
        )));
    }

    Ok(inputs
        .iter()
        .zip(weights.iter())
        .map(|(input, weight)| input * weight)
        .sum())
}
