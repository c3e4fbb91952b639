//! Flat-text persistence.
//!
//! ```text
//! learning_rate: 0.03
//! structure: 3
//! 3 4 2
//!
//!
//! <bias of layer 1, node 0>
//! <its 3 incoming weights>
//! <bias of layer 1, node 1>
//! ...
//! ```
//!
//! Readers split on whitespace, so line breaks only matter for humans. Files
//! from the older revision of the format start directly at `structure:` and
//! fall back to [`DEFAULT_LEARNING_RATE`].

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::{FromStr, SplitWhitespace};

use log::{debug, info};

use crate::error::{NetError, Result};
use crate::network::network::{NeuralNetwork, DEFAULT_LEARNING_RATE};
use crate::network::snapshot::{LayerSnapshot, NetworkSnapshot};

const LEARNING_RATE_KEY: &str = "learning_rate:";
const STRUCTURE_KEY: &str = "structure:";

impl NeuralNetwork {
    /// Restores a network from the text file at `path`, which also becomes its identity.
    pub fn load(path: impl AsRef<Path>) -> Result<NeuralNetwork> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let snapshot = parse(&text)?;
        let network = NeuralNetwork::from_snapshot(snapshot, path)?;
        debug!("restored network {:?} from {}", network.layer_sizes(), path.display());
        Ok(network)
    }

    /// Writes the network to its identity path.
    pub fn save(&self) -> Result<()> {
        let file = File::create(&self.identity)?;
        let mut out = BufWriter::new(file);
        self.write_text(&mut out)?;
        out.flush()?;
        info!("saved network {:?} to {}", self.layer_sizes(), self.identity.display());
        Ok(())
    }

    /// Rebinds the identity to `path`, then saves there.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.identity = path.into();
        self.save()
    }

    /// Removes the file at the identity path. A missing file is fine.
    pub fn delete_file(&self) -> Result<()> {
        match fs::remove_file(&self.identity) {
            Ok(()) => {
                debug!("deleted {}", self.identity.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Renders the text representation to any writer.
    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let topology = &self.topology;
        writeln!(out, "{LEARNING_RATE_KEY} {}", self.learning_rate)?;
        writeln!(out, "{STRUCTURE_KEY} {}", topology.layer_count())?;
        writeln!(out, "{}", join(topology.sizes()))?;

        for layer in 1..topology.layer_count() {
            writeln!(out)?;
            for node in 0..topology.width(layer) {
                writeln!(out)?;
                writeln!(out, "{}", self.biases[topology.bias_index(layer, node)])?;
                write!(out, "{}", join(&self.weights[topology.weight_row(layer, node)]))?;
            }
        }
        writeln!(out)
    }

    pub fn to_text(&self) -> String {
        let mut buf = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.write_text(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn join<T: std::fmt::Display>(values: &[T]) -> String {
    let mut line = String::new();
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        let _ = write!(line, "{v}");
    }
    line
}

/// Parses the text representation into a snapshot. Shape checks against the
/// declared sizes happen in [`NeuralNetwork::from_snapshot`].
pub fn parse(text: &str) -> Result<NetworkSnapshot> {
    let mut tokens = Tokens::new(text);

    let learning_rate = match tokens.next_token("header")? {
        LEARNING_RATE_KEY => {
            let rate = tokens.number::<f64>("learning rate")?;
            tokens.expect(STRUCTURE_KEY)?;
            rate
        }
        STRUCTURE_KEY => {
            debug!("no learning rate in header, using {DEFAULT_LEARNING_RATE}");
            DEFAULT_LEARNING_RATE
        }
        other => {
            return Err(NetError::corrupt(format!(
                "expected `{LEARNING_RATE_KEY}` or `{STRUCTURE_KEY}`, found `{other}`"
            )))
        }
    };

    let layer_count: usize = tokens.number("layer count")?;
    if layer_count < 2 {
        return Err(NetError::corrupt(format!("declared {layer_count} layers, need at least 2")));
    }
    // Sizes come from the file, so nothing is pre-allocated from them; a
    // corrupt size runs out of tokens instead of exhausting memory.
    let mut layer_sizes = Vec::new();
    for _ in 0..layer_count {
        layer_sizes.push(tokens.number::<usize>("layer size")?);
    }
    if layer_sizes.contains(&0) {
        return Err(NetError::corrupt(format!(
            "layer sizes {layer_sizes:?} contain an empty layer"
        )));
    }

    let mut layers = Vec::new();
    for pair in layer_sizes.windows(2) {
        let (fan_in, width) = (pair[0], pair[1]);
        let mut biases = Vec::new();
        let mut weights = Vec::new();
        for _ in 0..width {
            biases.push(tokens.number::<f64>("bias")?);
            let mut row = Vec::new();
            for _ in 0..fan_in {
                row.push(tokens.number::<f64>("weight")?);
            }
            weights.push(row);
        }
        layers.push(LayerSnapshot { biases, weights });
    }

    if let Some(extra) = tokens.inner.next() {
        return Err(NetError::corrupt(format!(
            "unexpected trailing token `{extra}` after {} layers",
            layer_count
        )));
    }

    Ok(NetworkSnapshot {
        learning_rate,
        layer_sizes,
        layers,
    })
}

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
    consumed: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Tokens {
            inner: text.split_whitespace(),
            consumed: 0,
        }
    }

    fn next_token(&mut self, what: &str) -> Result<&'a str> {
        let token = self.inner.next().ok_or_else(|| {
            NetError::corrupt(format!("truncated after {} tokens, expected {what}", self.consumed))
        })?;
        self.consumed += 1;
        Ok(token)
    }

    fn expect(&mut self, key: &str) -> Result<()> {
        match self.next_token(key)? {
            token if token == key => Ok(()),
            token => Err(NetError::corrupt(format!("expected `{key}`, found `{token}`"))),
        }
    }

    fn number<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.next_token(what)?;
        token.parse().map_err(|_| {
            NetError::corrupt(format!("token {} (`{token}`) is not a valid {what}", self.consumed))
        })
    }
}
