use sigmoid_net::{train, NetworkSpec, TrainConfig};

fn main() -> sigmoid_net::Result<()> {
    env_logger::init();

    let spec = NetworkSpec {
        name: Some("xor".into()),
        learning_rate: 0.5,
        seed: Some(7),
        ..NetworkSpec::new(vec![2, 4, 1])
    };
    let mut network = spec.build()?;

    let inputs = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    let expected_outputs = vec![
        vec![1.0],
        vec![0.0],
        vec![1.0],
        vec![0.0],
    ];

    let config = TrainConfig::new(10000).log_every(1000);
    if let Some(stats) = train(&mut network, &inputs, &expected_outputs, &config)? {
        println!("Epoch {}: cost = {:.6}", stats.epoch, stats.mean_cost);
    }

    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", input, network.predict(input)?[0]);
    }

    network.save()?;
    println!("Saved to {}", network.identity().display());
    Ok(())
}
