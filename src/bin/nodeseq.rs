use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use nodeseq::{InsertPolicy, NodeSeq, SeqConfig};
use tracing_subscriber::EnvFilter;

/// Read integers from stdin until the first non-integer token, then run a
/// few sequence operations on them.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// What to do with insert positions past the end: clamp or reject
    #[arg(long, default_value = "clamp")]
    policy: InsertPolicy,
    /// Log filter, e.g. "debug" or "nodeseq=trace". Defaults to RUST_LOG, then "warn"
    #[arg(long)]
    log_level: Option<String>,
    /// Also insert VALUE at 1-based POS before reporting
    #[arg(long, num_args = 2, value_names = ["POS", "VALUE"], allow_negative_numbers = true)]
    insert: Option<Vec<i64>>,
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Integers up to the first token that does not parse as one.
fn read_values(input: impl BufRead) -> Result<Vec<i64>> {
    let mut values = Vec::new();
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            // Undecodable bytes count as a non-numeric token.
            Err(e) if e.kind() == io::ErrorKind::InvalidData => return Ok(values),
            Err(e) => return Err(e).context("reading stdin"),
        };
        for token in line.split_whitespace() {
            match token.parse::<i64>() {
                Ok(v) => values.push(v),
                Err(_) => return Ok(values),
            }
        }
    }
    Ok(values)
}

fn render(seq: &NodeSeq<i64>) -> String {
    let parts: Vec<String> = seq.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let values = read_values(io::stdin().lock())?;
    let config = SeqConfig::default()
        .with_insert_policy(args.policy)
        .with_capacity(values.len());
    let mut seq = NodeSeq::with_config(config).context("preallocating sequence")?;
    seq.extend_tail(values.iter().copied())
        .context("building sequence")?;

    if let Some(&[pos, value]) = args.insert.as_deref() {
        let pos = usize::try_from(pos).context("insert position must be non-negative")?;
        seq.insert_at(pos, value)
            .with_context(|| format!("inserting {value} at {pos}"))?;
    }

    let mut out = io::stdout().lock();
    writeln!(out, "sequence: {}", render(&seq))?;
    writeln!(out, "length:   {}", seq.len())?;
    if let Ok(mid) = seq.find_middle() {
        if let Some(v) = seq.get(mid) {
            writeln!(out, "middle:   {v}")?;
        }
    }
    if let Ok(last) = seq.find_from_end(1) {
        if let Some(v) = seq.get(last) {
            writeln!(out, "last:     {v}")?;
        }
    }

    let mut sorted = values;
    sorted.sort_unstable();
    let sorted = NodeSeq::from_values(sorted).context("building sorted copy")?;
    let merged = NodeSeq::merge(&sorted, &sorted).context("merging")?;
    writeln!(out, "merged:   {}", render(&merged))?;

    seq.reverse().context("reversing")?;
    writeln!(out, "reversed: {}", render(&seq))?;
    seq.destroy();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_first_non_integer() {
        let input = "10 20\n30 x 40\n50\n";
        assert_eq!(read_values(input.as_bytes()).unwrap(), vec![10, 20, 30]);
    }

    #[test]
    fn stops_at_invalid_utf8() {
        let input: &[u8] = b"1 2\n\xff\xfe 3\n4\n";
        assert_eq!(read_values(input).unwrap(), vec![1, 2]);
    }

    #[test]
    fn renders_in_order() {
        let seq = NodeSeq::from_values([3, 1, 2]).unwrap();
        assert_eq!(render(&seq), "[3, 1, 2]");
    }
}
