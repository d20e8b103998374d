use synapse_nn::{
    Activation, Dataset, LabeledExample, Labeler, Network, Normalizer, Result, TrainConfig,
    TrainingLoop, UpdateRule,
};

/// XOR with labels 1 (false) and 2 (true), inputs rescaled to [-1, 1].
fn xor_dataset() -> Result<Dataset> {
    let rows = [
        ([0.0, 0.0], 1.0),
        ([0.0, 1.0], 2.0),
        ([1.0, 0.0], 2.0),
        ([1.0, 1.0], 1.0),
    ];

    let mut dataset = Dataset::new(vec!["x1".to_string(), "x2".to_string()]);
    for (id, (attributes, label)) in rows.iter().enumerate() {
        dataset.add(LabeledExample::new(id as u64, attributes.to_vec(), *label))?;
    }

    let normalizer = Normalizer::fit(&dataset)?;
    normalizer.apply(&dataset, -1.0, 1.0)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let dataset = xor_dataset()?;

    let mut network = Network::new(true);
    network.add_input(2)?;
    network.add_unit(3, Activation::Sigmoid, UpdateRule::GradientStep)?;
    network.add_unit(1, Activation::Sigmoid, UpdateRule::GradientStep)?;
    network.set_learning_rate(0.1);
    network.set_labeler(Labeler::MaxIndex);

    let config = TrainConfig::new("me_accuracy", 0.95, Some(10_000), 100);
    let iterations = TrainingLoop::MetricDriven.train(&mut network, &dataset, &config)?;

    if Some(iterations) == config.max_iterations {
        println!("gave up after {iterations} iterations (unlucky initial weights?)");
    } else {
        println!("converged after {iterations} iterations");
    }

    let classification = network.classify_dataset(&dataset)?;
    for id in 0..4 {
        let example = dataset.get(id).expect("xor row");
        println!(
            "{:?} -> label {} (expected {})",
            example.attributes(),
            classification.label(id).unwrap_or(f64::NAN),
            example.label()
        );
    }
    Ok(())
}
