//! Test statistics for scorer models.
//!
//! | Statistic | What it measures                                   |
//! |-----------|----------------------------------------------------|
//! | accuracy  | share of predictions equal to the actual label     |
//! | ROC-AUC   | how well the label probability ranks positives     |
//! | table     | counts per (actual, predicted) label pair          |
//!
//! With exactly two labels the greater one is the positive class and a single
//! AUC is reported. Otherwise each label gets a one-vs-rest AUC.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Label, Score};

/// Area under the ROC curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RocAuc {
    /// `None` when the test set has no positives or no negatives.
    Binary { positive: Label, auc: Option<f64> },
    PerLabel(BTreeMap<Label, Option<f64>>),
}

/// Statistics for one test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStats {
    /// Number of observations tested
    pub n: usize,
    pub accuracy: f64,
    pub roc: RocAuc,
    /// Every label that was either actual or predicted, sorted.
    pub labels: Vec<Label>,
    /// actual -> predicted -> count
    pub table: BTreeMap<Label, BTreeMap<Label, usize>>,
}

impl TestStats {
    /// Compute statistics from `(score, actual label)` pairs.
    pub fn from_scored(scored: &[(Score, Label)]) -> Self {
        let n = scored.len();

        let mut table: BTreeMap<Label, BTreeMap<Label, usize>> = BTreeMap::new();
        let mut labels = BTreeSet::new();
        let mut correct = 0;
        for (score, actual) in scored {
            if score.prediction == *actual {
                correct += 1;
            }
            *table
                .entry(actual.clone())
                .or_default()
                .entry(score.prediction.clone())
                .or_default() += 1;
            labels.insert(actual.clone());
            labels.insert(score.prediction.clone());
        }
        let labels: Vec<Label> = labels.into_iter().collect();

        let accuracy = if n == 0 { 0.0 } else { correct as f64 / n as f64 };

        let roc = match labels.as_slice() {
            [_, positive] => RocAuc::Binary {
                positive: positive.clone(),
                auc: auc(scored, positive),
            },
            _ => RocAuc::PerLabel(
                labels
                    .iter()
                    .map(|label| (label.clone(), auc(scored, label)))
                    .collect(),
            ),
        };

        Self {
            n,
            accuracy,
            roc,
            labels,
            table,
        }
    }

    /// How often `actual` was predicted as `predicted`.
    pub fn count(&self, actual: &Label, predicted: &Label) -> usize {
        self.table
            .get(actual)
            .and_then(|row| row.get(predicted))
            .copied()
            .unwrap_or(0)
    }
}

/// One-vs-rest AUC for `positive`, using its predicted probability as the
/// ranking score.
fn auc(scored: &[(Score, Label)], positive: &Label) -> Option<f64> {
    let ranked: Vec<(f64, bool)> = scored
        .iter()
        .map(|(score, actual)| {
            let p = score.probability.get(positive).copied().unwrap_or(0.0);
            (p, actual == positive)
        })
        .collect();
    mann_whitney(ranked)
}

/// Mann-Whitney U statistic normalized to `[0, 1]`. Tied scores share their
/// average rank, so a tie between a positive and a negative counts one half.
fn mann_whitney(mut ranked: Vec<(f64, bool)>) -> Option<f64> {
    let positives = ranked.iter().filter(|(_, positive)| *positive).count();
    let negatives = ranked.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let mut rank_sum = 0.0;
    let mut start = 0;
    while start < ranked.len() {
        let mut end = start + 1;
        while end < ranked.len() && ranked[end].0 == ranked[start].0 {
            end += 1;
        }
        // ranks are 1-based: start+1 ..= end
        let average = (start + 1 + end) as f64 / 2.0;
        let tied_positives = ranked[start..end].iter().filter(|(_, positive)| *positive).count();
        rank_sum += average * tied_positives as f64;
        start = end;
    }

    let p = positives as f64;
    let u = rank_sum - p * (p + 1.0) / 2.0;
    Some(u / (p * negatives as f64))
}

fn write_table(f: &mut fmt::Formatter<'_>, rows: &[Vec<String>]) -> fmt::Result {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|row| row.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for row in rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(f, "{}", line.trim_end())?;
    }
    Ok(())
}

fn format_auc(auc: Option<f64>) -> String {
    auc.map(|a| format!("{:.3}", a)).unwrap_or_else(|| "n/a".to_string())
}

impl fmt::Display for TestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy: {:.3}", self.accuracy)?;
        writeln!(f)?;

        match &self.roc {
            RocAuc::Binary { auc, .. } => writeln!(f, "ROC-AUC: {}", format_auc(*auc))?,
            RocAuc::PerLabel(per_label) => {
                writeln!(f, "ROC-AUC:")?;
                let rows: Vec<Vec<String>> = per_label
                    .iter()
                    .map(|(label, auc)| vec![label.to_string(), format_auc(*auc)])
                    .collect();
                write_table(f, &rows)?;
            }
        }
        writeln!(f)?;

        let mut rows = Vec::with_capacity(self.labels.len() + 1);
        rows.push(
            std::iter::once(String::new())
                .chain(self.labels.iter().map(Label::to_string))
                .collect(),
        );
        for actual in &self.labels {
            rows.push(
                std::iter::once(actual.to_string())
                    .chain(
                        self.labels
                            .iter()
                            .map(|predicted| self.count(actual, predicted).to_string()),
                    )
                    .collect(),
            );
        }
        write_table(f, &rows)
    }
}
