use tracing::debug;

use crate::data::dataset::Dataset;
use crate::error::Result;
use crate::metric::metric::Metric;
use crate::network::network::Network;
use crate::registry;
use crate::train::train_config::TrainConfig;

/// Drives repeated learning cycles against a metric-based stopping
/// condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainingLoop {
    /// Learn until the metric reaches the target value or the iteration cap
    /// runs out, checking every `check_interval` cycles.
    MetricDriven,
}

impl TrainingLoop {
    /// Trains `network` on `dataset` until the configured metric *equals or
    /// exceeds* the target, or the iteration cap is reached.
    ///
    /// Returns the number of iterations executed, accumulated in
    /// `check_interval` steps. A caller distinguishes "converged" from
    /// "budget exhausted" by comparing the result to `max_iterations`, with
    /// the caveat that a run converging exactly on the final check is
    /// indistinguishable from exhaustion.
    ///
    /// The loop assumes the metric grows with network quality; a metric that
    /// does not can spin to exhaustion without warning.
    pub fn train(
        &self,
        network: &mut Network,
        dataset: &Dataset,
        config: &TrainConfig,
    ) -> Result<usize> {
        match self {
            TrainingLoop::MetricDriven => {
                config.validate()?;
                registry::check_prefix(&config.metric_name, registry::METRIC_PREFIX)?;
                let metric = Metric::from_name(&config.metric_name)?;

                let mut iterations = 0;
                let mut metric_value = f64::NEG_INFINITY;
                while config.max_iterations.map_or(true, |max| iterations < max)
                    && metric_value < config.target_value
                {
                    network.learn_cycles(dataset, config.check_interval)?;
                    let classification = network.classify_dataset(dataset)?;
                    metric_value = metric.compute(dataset, &classification);
                    iterations += config.check_interval;
                    debug!(
                        iterations,
                        metric = config.metric_name.as_str(),
                        value = metric_value,
                        target = config.target_value,
                        "training check"
                    );
                }
                Ok(iterations)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TrainingLoop::MetricDriven => "tr_metric",
        }
    }

    pub fn from_name(name: &str) -> Result<TrainingLoop> {
        registry::check_prefix(name, registry::TRAINING_LOOP_PREFIX)?;
        match name {
            "tr_metric" => Ok(TrainingLoop::MetricDriven),
            _ => Err(registry::unknown(name, "training loop")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::Activation;
    use crate::data::dataset::LabeledExample;
    use crate::error::NnError;
    use crate::label::labeler::Labeler;
    use crate::optim::update_rule::UpdateRule;

    fn trainable_network() -> Network {
        let mut network = Network::new(true);
        network.add_input(1).unwrap();
        network
            .add_unit(1, Activation::Sigmoid, UpdateRule::GradientStep)
            .unwrap();
        network.set_learning_rate(0.5);
        network.set_labeler(Labeler::MaxIndex);
        network
    }

    fn trivial_dataset() -> Dataset {
        // Single example, trivially separable.
        let mut dataset = Dataset::new(vec!["x".to_string()]);
        dataset.add(LabeledExample::new(0, vec![1.0], 2.0)).unwrap();
        dataset
    }

    #[test]
    fn unreachable_target_exhausts_exactly_the_cap() {
        let mut network = trainable_network();
        let config = TrainConfig::new("me_accuracy", 1.01, Some(50), 10);
        let iterations = TrainingLoop::MetricDriven
            .train(&mut network, &trivial_dataset(), &config)
            .unwrap();
        assert_eq!(iterations, 50);
    }

    #[test]
    fn reachable_target_stops_early() {
        let mut network = trainable_network();
        let config = TrainConfig::new("me_accuracy", 0.99, Some(10_000), 10);
        let iterations = TrainingLoop::MetricDriven
            .train(&mut network, &trivial_dataset(), &config)
            .unwrap();
        assert!(iterations < 10_000);
    }

    #[test]
    fn invalid_check_interval_is_rejected_before_training() {
        let mut network = trainable_network();
        let config = TrainConfig::new("me_accuracy", 0.9, Some(100), 0);
        let err = TrainingLoop::MetricDriven.train(&mut network, &trivial_dataset(), &config);
        assert!(matches!(err, Err(NnError::Value(_))));
    }

    #[test]
    fn wrong_metric_prefix_fails_resolution() {
        let mut network = trainable_network();
        let config = TrainConfig::new("ac_sigmoid", 0.9, Some(100), 10);
        let err = TrainingLoop::MetricDriven.train(&mut network, &trivial_dataset(), &config);
        assert!(matches!(err, Err(NnError::NameResolution(_))));
    }

    #[test]
    fn names_round_trip() {
        assert_eq!(
            TrainingLoop::from_name("tr_metric").unwrap(),
            TrainingLoop::MetricDriven
        );
        assert!(TrainingLoop::from_name("tr_batch").is_err());
        assert!(TrainingLoop::from_name("me_accuracy").is_err());
    }
}
