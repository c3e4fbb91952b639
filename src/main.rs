use std::env;

use anyhow::Context;
use log::info;
use sigmoid_net::NetworkSpec;

/// Builds a fresh network and saves it next to the working directory.
///
/// Usage:
///   sigmoid-net [spec.json]
///
/// Without a spec the network is 3 inputs, 4 hidden nodes, 2 outputs.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let spec = match env::args().nth(1) {
        Some(path) => NetworkSpec::load_json(&path)
            .with_context(|| format!("failed to read network spec {path}"))?,
        None => NetworkSpec::new(vec![3, 4, 2]),
    };

    let network = spec.build().context("failed to build network")?;
    network.save().context("failed to save network")?;

    info!("wrote {:?} network", network.layer_sizes());
    println!("{}", network.identity().display());
    Ok(())
}
