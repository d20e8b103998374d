use crate::error::{NnError, Result};

/// Configuration for one training run.
///
/// # Fields
/// - `metric_name`: registered metric name (`me_` prefix) used for the
///                       stopping check
/// - `target_value`: training stops once the metric reaches this value
/// - `max_iterations`: iteration cap; `None` means unbounded
/// - `check_interval`: learning cycles to run between metric checks
pub struct TrainConfig {
    pub metric_name: String,
    pub target_value: f64,
    pub max_iterations: Option<usize>,
    pub check_interval: usize,
}

impl TrainConfig {
    pub fn new(
        metric_name: &str,
        target_value: f64,
        max_iterations: Option<usize>,
        check_interval: usize,
    ) -> TrainConfig {
        TrainConfig {
            metric_name: metric_name.to_string(),
            target_value,
            max_iterations,
            check_interval,
        }
    }

    /// Parameter-range checks, run before any training happens.
    pub fn validate(&self) -> Result<()> {
        if self.check_interval < 1 {
            return Err(NnError::Value(
                "check_interval has to be greater or equal to 1".to_string(),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(NnError::Value(
                "max_iterations has to be at least 1 when bounded".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_sane_parameters() {
        let config = TrainConfig::new("me_accuracy", 0.9, Some(1000), 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unbounded_cap_is_valid() {
        let config = TrainConfig::new("me_accuracy", 0.9, None, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_check_interval() {
        let config = TrainConfig::new("me_accuracy", 0.9, Some(1000), 0);
        assert!(matches!(config.validate(), Err(NnError::Value(_))));
    }

    #[test]
    fn rejects_zero_bounded_cap() {
        let config = TrainConfig::new("me_accuracy", 0.9, Some(0), 100);
        assert!(matches!(config.validate(), Err(NnError::Value(_))));
    }
}
