//! `revscore extract`
//!
//! Reads JSON-lines revision records:
//!
//! ```text
//! {"text": "...", "parent_text": "...", "label": true}
//! ```
//!
//! `parent_text` may be missing or null for page creations, and `label` may
//! be left out for unlabeled revisions. Records are resolved in parallel
//! batches and written to stdout as values/labels rows.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Args;
use revscore_core::extract::extract_batch;
use revscore_core::resolve::{Cache, ResolverConfig};
use revscore_core::scoring::{tsv, Label};
use serde::Deserialize;
use tracing::{info, warn};

use crate::features::{FeatureArgs, Selection};

#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub features: FeatureArgs,

    /// JSON-lines revision records [default: stdin]
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Write a `#` header line naming the columns
    #[arg(long)]
    pub header: bool,

    /// Records resolved per parallel batch
    #[arg(long, default_value_t = 1000)]
    pub batch_size: usize,

    /// Maximum number of nodes in progress while resolving one record
    #[arg(long, env = "REVSCORE_MAX_DEPTH", default_value_t = ResolverConfig::DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

#[derive(Debug, Deserialize)]
struct Record {
    text: Option<String>,
    #[serde(default)]
    parent_text: Option<String>,
    #[serde(default)]
    label: Option<serde_json::Value>,
}

fn json_label(value: &serde_json::Value) -> Option<Label> {
    match value {
        serde_json::Value::Bool(b) => Some(Label::Bool(*b)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Label::Int)
            .or_else(|| n.as_f64().map(Label::real)),
        serde_json::Value::String(s) => Some(Label::Text(s.clone())),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct Totals {
    written: usize,
    failed: usize,
}

/// Resolve one batch and write its rows in input order.
fn flush<W: Write>(
    selection: &Selection,
    config: ResolverConfig,
    batch: &mut Vec<(usize, Record)>,
    out: &mut W,
    totals: &mut Totals,
) -> Result<()> {
    if batch.is_empty() {
        return Ok(());
    }

    let (revision, parent) = selection.inputs;
    let caches = batch
        .iter()
        .map(|(_, record)| {
            Cache::new()
                .with(revision, record.text.clone())
                .with(parent, record.parent_text.clone())
        })
        .collect();
    let results = extract_batch(&selection.graph, &(), config, &selection.targets, caches);

    for ((line, record), result) in batch.drain(..).zip(results) {
        match result {
            Ok(values) => {
                let label = record.label.as_ref().and_then(|value| {
                    let label = json_label(value);
                    if label.is_none() {
                        warn!(line, "ignoring label that is not a bool, number or string");
                    }
                    label
                });
                tsv::write_row(&mut *out, &values, label.as_ref())?;
                totals.written += 1;
            }
            Err(err) => {
                warn!(line, error = %err, "skipping record");
                totals.failed += 1;
            }
        }
    }
    Ok(())
}

fn extract<R: BufRead, W: Write>(
    args: &ExtractArgs,
    selection: &Selection,
    reader: R,
    out: &mut W,
) -> Result<Totals> {
    let config = ResolverConfig::default().with_max_depth(args.max_depth);
    if args.header {
        tsv::write_header(&mut *out, selection.names.as_slice())?;
    }

    let mut totals = Totals::default();
    let mut batch = Vec::with_capacity(args.batch_size);
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("could not read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(&line)
            .with_context(|| format!("line {}: malformed record", index + 1))?;
        batch.push((index + 1, record));

        if batch.len() >= args.batch_size {
            flush(selection, config, &mut batch, out, &mut totals)?;
        }
    }
    flush(selection, config, &mut batch, out, &mut totals)?;
    out.flush()?;
    Ok(totals)
}

pub fn run(args: ExtractArgs) -> Result<()> {
    ensure!(args.batch_size > 0, "--batch-size must be positive");
    let selection = args.features.select()?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("could not open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let mut out = BufWriter::new(io::stdout().lock());

    let totals = extract(&args, &selection, reader, &mut out)?;
    info!(written = totals.written, failed = totals.failed, "extraction finished");
    Ok(())
}
