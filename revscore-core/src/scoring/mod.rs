//! Scorer Models
//!
//! The engine stops at feature values. A [`ScorerModel`] consumes ordered
//! vectors of those values plus a label, learns from them, and predicts labels
//! for new vectors. This module defines that seam, the label types used on it,
//! and the tab-separated file format used to move observations between
//! extraction and training ([`tsv`]).
//!
//! [`NearestCentroid`] is a small reference model so that training and testing
//! can be exercised end to end. [`TestStats`] summarizes how a model does on
//! held-out observations.

mod centroid;
mod stats;
pub mod tsv;

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use ordered_float::OrderedFloat;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::{DecodeError, Value, ValueType};

pub use centroid::{CentroidParams, NearestCentroid};
pub use stats::{RocAuc, TestStats};

/// Errors raised while reading observations or training, scoring and
/// persisting models.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected {expected} columns, found {found}")]
    Columns {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}, column {column}: {source}")]
    Value {
        line: usize,
        column: usize,
        #[source]
        source: DecodeError,
    },

    #[error("line {line}: {raw:?} is not a valid {expected} label")]
    Label {
        line: usize,
        raw: String,
        expected: LabelType,
    },

    #[error("unknown label type {0:?} (expected int, float, str or bool)")]
    UnknownLabelType(String),

    #[error("cannot train on an empty set of observations")]
    EmptyTrainingSet,

    #[error("expected {expected} feature values, found {found}")]
    Dimension { expected: usize, found: usize },

    #[error("feature {index} is {found}, which is not numeric")]
    NonNumeric { index: usize, found: ValueType },

    #[error("the model has not been trained")]
    Untrained,

    #[error("could not write model: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("could not read model: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// A decoded label.
///
/// Labels are ordered so that reports list them consistently; for booleans
/// `False` sorts before `True`, which makes `True` the positive class.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    Bool(bool),
    Int(i64),
    Real(OrderedFloat<f64>),
    Text(String),
}

impl Label {
    pub fn real(x: f64) -> Self {
        Label::Real(OrderedFloat(x))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Bool(true) => f.write_str("True"),
            Label::Bool(false) => f.write_str("False"),
            Label::Int(n) => write!(f, "{}", n),
            Label::Real(x) => write!(f, "{}", x),
            Label::Text(s) => f.write_str(s),
        }
    }
}

/// How the label column of a values/labels file is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelType {
    Int,
    Float,
    #[default]
    Str,
    Bool,
}

impl LabelType {
    /// Decode a raw label. Returns `None` when it does not parse.
    ///
    /// Boolean labels are permissive: `True`, `true`, `1`, `T`, `y` and `Y`
    /// are true, anything else is false.
    pub fn decode(&self, raw: &str) -> Option<Label> {
        match self {
            LabelType::Int => raw.trim().parse().ok().map(Label::Int),
            LabelType::Float => raw.trim().parse().ok().map(Label::real),
            LabelType::Str => Some(Label::Text(raw.to_string())),
            LabelType::Bool => Some(Label::Bool(matches!(
                raw,
                "True" | "true" | "1" | "T" | "y" | "Y"
            ))),
        }
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LabelType::Int => "int",
            LabelType::Float => "float",
            LabelType::Str => "str",
            LabelType::Bool => "bool",
        };
        f.write_str(name)
    }
}

impl FromStr for LabelType {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(LabelType::Int),
            "float" => Ok(LabelType::Float),
            "str" => Ok(LabelType::Str),
            "bool" => Ok(LabelType::Bool),
            other => Err(ScoringError::UnknownLabelType(other.to_string())),
        }
    }
}

/// One feature vector and its label.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub values: Vec<Value>,
    pub label: Label,
}

impl Observation {
    pub fn new(values: Vec<Value>, label: Label) -> Self {
        Self { values, label }
    }
}

/// A model's output for one feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub prediction: Label,
    /// Probability per known label; sums to 1.
    pub probability: BTreeMap<Label, f64>,
}

/// A model trained on feature vectors.
pub trait ScorerModel {
    /// Version string recorded with the model, if any.
    fn version(&self) -> Option<&str>;

    fn train(&mut self, observations: &[Observation]) -> Result<(), ScoringError>;

    fn score(&self, values: &[Value]) -> Result<Score, ScoringError>;

    /// Score every observation and compare predictions to labels.
    fn test(&self, observations: &[Observation]) -> Result<TestStats, ScoringError> {
        let scored = observations
            .iter()
            .map(|observation| Ok((self.score(&observation.values)?, observation.label.clone())))
            .collect::<Result<Vec<_>, ScoringError>>()?;
        Ok(TestStats::from_scored(&scored))
    }

    /// Serialize the trained model.
    fn dump(&self, writer: &mut dyn Write) -> Result<(), ScoringError>;
}

/// Shuffle and split observations into `(train, test)`.
///
/// The first `test_prop` share of the shuffled observations is held out for
/// testing; the remainder is for training.
pub fn train_test_split<R: Rng + ?Sized>(
    mut observations: Vec<Observation>,
    test_prop: f64,
    rng: &mut R,
) -> (Vec<Observation>, Vec<Observation>) {
    observations.shuffle(rng);
    let test_size = (observations.len() as f64 * test_prop.clamp(0.0, 1.0)) as usize;
    let train = observations.split_off(test_size);
    (train, observations)
}

/// Numeric view of a feature value. Absent values read as zero.
pub(crate) fn numeric(index: usize, value: &Value) -> Result<f64, ScoringError> {
    match value.value_type() {
        None => Ok(0.0),
        Some(found) => value
            .as_real()
            .ok_or(ScoringError::NonNumeric { index, found }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_labels_are_permissive() {
        for raw in ["True", "true", "1", "T", "y", "Y"] {
            assert_eq!(LabelType::Bool.decode(raw), Some(Label::Bool(true)), "{}", raw);
        }
        assert_eq!(LabelType::Bool.decode("no"), Some(Label::Bool(false)));
    }

    #[test]
    fn numeric_labels_must_parse() {
        assert_eq!(LabelType::Int.decode(" 3"), Some(Label::Int(3)));
        assert_eq!(LabelType::Int.decode("3.5"), None);
        assert_eq!(LabelType::Float.decode("3.5"), Some(Label::Real(OrderedFloat(3.5))));
        assert_eq!(LabelType::Str.decode("damaging"), Some(Label::Text("damaging".into())));
    }

    #[test]
    fn label_type_from_str() {
        assert_eq!("bool".parse::<LabelType>().unwrap(), LabelType::Bool);
        assert!(matches!(
            "double".parse::<LabelType>(),
            Err(ScoringError::UnknownLabelType(_))
        ));
    }

    #[test]
    fn labels_order_false_before_true() {
        assert!(Label::Bool(false) < Label::Bool(true));
        assert_eq!(Label::Bool(true).to_string(), "True");
    }

    #[test]
    fn split_holds_out_the_test_share() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let observations: Vec<Observation> = (0..10)
            .map(|i| Observation::new(vec![Value::Int(i)], Label::Int(i)))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        let (train, test) = train_test_split(observations, 0.6, &mut rng);

        assert_eq!(test.len(), 6);
        assert_eq!(train.len(), 4);

        let mut labels: Vec<Label> = train.iter().chain(&test).map(|o| o.label.clone()).collect();
        labels.sort();
        assert_eq!(labels, (0..10).map(Label::Int).collect::<Vec<_>>());
    }

    #[test]
    fn numeric_view() {
        assert_eq!(numeric(0, &Value::Absent).unwrap(), 0.0);
        assert_eq!(numeric(0, &Value::Bool(true)).unwrap(), 1.0);
        assert_eq!(numeric(0, &Value::Int(4)).unwrap(), 4.0);
        assert!(matches!(
            numeric(2, &Value::Text("x".into())),
            Err(ScoringError::NonNumeric { index: 2, found: ValueType::Text })
        ));
    }
}
