use std::time::Instant;

use log::info;

use crate::error::{NetError, Result};
use crate::network::network::NeuralNetwork;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// One online pass: every sample gets its own forward pass and update, in order.
/// Returns the mean cost, each sample measured before its update.
pub fn train_epoch(
    network: &mut NeuralNetwork,
    inputs: &[Vec<f64>],
    expected_outputs: &[Vec<f64>],
) -> Result<f64> {
    check_samples(inputs, expected_outputs)?;

    let mut total_cost = 0.0;
    for (input, expected) in inputs.iter().zip(expected_outputs) {
        network.train(input, expected)?;
        total_cost += network.cost(expected)?;
    }

    Ok(total_cost / inputs.len() as f64)
}

/// Mean cost over the samples without touching the parameters.
pub fn evaluate(
    network: &mut NeuralNetwork,
    inputs: &[Vec<f64>],
    expected_outputs: &[Vec<f64>],
) -> Result<f64> {
    check_samples(inputs, expected_outputs)?;

    let mut total_cost = 0.0;
    for (input, expected) in inputs.iter().zip(expected_outputs) {
        network.predict(input)?;
        total_cost += network.cost(expected)?;
    }

    Ok(total_cost / inputs.len() as f64)
}

/// Runs `config.epochs` online passes and returns the stats of the last one,
/// or `None` when `config.epochs` is zero.
pub fn train(
    network: &mut NeuralNetwork,
    inputs: &[Vec<f64>],
    expected_outputs: &[Vec<f64>],
    config: &TrainConfig,
) -> Result<Option<EpochStats>> {
    let mut last = None;

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();
        let mean_cost = train_epoch(network, inputs, expected_outputs)?;
        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            mean_cost,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };

        if epoch == config.epochs || (config.log_every > 0 && epoch % config.log_every == 0) {
            info!("epoch {epoch}/{}: cost = {mean_cost:.6}", config.epochs);
        }
        last = Some(stats);
    }

    Ok(last)
}

fn check_samples(inputs: &[Vec<f64>], expected_outputs: &[Vec<f64>]) -> Result<()> {
    if inputs.is_empty() || inputs.len() != expected_outputs.len() {
        return Err(NetError::DimensionMismatch {
            what: "expected outputs per input",
            got: expected_outputs.len(),
            expected: inputs.len().max(1),
        });
    }
    Ok(())
}
