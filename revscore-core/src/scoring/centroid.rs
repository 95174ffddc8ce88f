//! Nearest-centroid classifier.
//!
//! Training averages the feature vectors of each label. Scoring measures the
//! distance from a vector to every centroid, predicts the closest label and
//! turns distances into probabilities with a softmax over their negatives.
//! Features are divided by their standard deviation first (unless `scale` is
//! turned off) so that a count in the thousands does not drown out a ratio.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{numeric, Label, Observation, Score, ScorerModel, ScoringError};
use crate::value::Value;

/// Construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CentroidParams {
    /// Scale each feature by its standard deviation.
    pub scale: bool,
}

impl Default for CentroidParams {
    fn default() -> Self {
        Self { scale: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestCentroid {
    version: Option<String>,
    features: Vec<String>,
    params: CentroidParams,
    scale: Vec<f64>,
    centroids: Vec<(Label, Vec<f64>)>,
}

impl NearestCentroid {
    /// An untrained model over the named features.
    pub fn new(features: Vec<String>, params: CentroidParams, version: Option<String>) -> Self {
        Self {
            version,
            features,
            params,
            scale: Vec::new(),
            centroids: Vec::new(),
        }
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn params(&self) -> CentroidParams {
        self.params
    }

    pub fn is_trained(&self) -> bool {
        !self.centroids.is_empty()
    }

    /// Labels seen in training, in order.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.centroids.iter().map(|(label, _)| label)
    }

    /// Read a model written by [`ScorerModel::dump`].
    pub fn load<R: Read>(reader: R) -> Result<Self, ScoringError> {
        Ok(rmp_serde::from_read(reader)?)
    }

    fn vector(&self, values: &[Value]) -> Result<Vec<f64>, ScoringError> {
        if values.len() != self.features.len() {
            return Err(ScoringError::Dimension {
                expected: self.features.len(),
                found: values.len(),
            });
        }
        values
            .iter()
            .enumerate()
            .map(|(index, value)| numeric(index, value))
            .collect()
    }

    fn distance(&self, x: &[f64], centroid: &[f64]) -> f64 {
        x.iter()
            .zip(centroid)
            .zip(&self.scale)
            .map(|((x, c), s)| ((x - c) / s).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

impl ScorerModel for NearestCentroid {
    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn train(&mut self, observations: &[Observation]) -> Result<(), ScoringError> {
        if observations.is_empty() {
            return Err(ScoringError::EmptyTrainingSet);
        }

        let vectors = observations
            .iter()
            .map(|observation| self.vector(&observation.values))
            .collect::<Result<Vec<_>, _>>()?;
        let dims = self.features.len();
        let n = vectors.len() as f64;

        let mut mean = vec![0.0; dims];
        for vector in &vectors {
            for (m, x) in mean.iter_mut().zip(vector) {
                *m += x / n;
            }
        }

        self.scale = if self.params.scale {
            (0..dims)
                .map(|d| {
                    let variance =
                        vectors.iter().map(|v| (v[d] - mean[d]).powi(2)).sum::<f64>() / n;
                    let std = variance.sqrt();
                    if std > 0.0 {
                        std
                    } else {
                        1.0
                    }
                })
                .collect()
        } else {
            vec![1.0; dims]
        };

        let mut sums: BTreeMap<&Label, (Vec<f64>, usize)> = BTreeMap::new();
        for (observation, vector) in observations.iter().zip(&vectors) {
            let (sum, count) = sums
                .entry(&observation.label)
                .or_insert_with(|| (vec![0.0; dims], 0));
            for (s, x) in sum.iter_mut().zip(vector) {
                *s += x;
            }
            *count += 1;
        }

        self.centroids = sums
            .into_iter()
            .map(|(label, (sum, count))| {
                let centroid = sum.into_iter().map(|s| s / count as f64).collect();
                (label.clone(), centroid)
            })
            .collect();

        debug!(
            observations = observations.len(),
            labels = self.centroids.len(),
            "trained nearest centroid"
        );
        Ok(())
    }

    fn score(&self, values: &[Value]) -> Result<Score, ScoringError> {
        if !self.is_trained() {
            return Err(ScoringError::Untrained);
        }
        let x = self.vector(values)?;

        let distances: Vec<f64> = self
            .centroids
            .iter()
            .map(|(_, centroid)| self.distance(&x, centroid))
            .collect();

        let closest = distances
            .iter()
            .enumerate()
            .fold(0, |best, (i, d)| if *d < distances[best] { i } else { best });
        let nearest = distances[closest];

        // shifted by the nearest distance so the largest exponent is zero
        let weights: Vec<f64> = distances.iter().map(|d| (nearest - d).exp()).collect();
        let total: f64 = weights.iter().sum();

        let probability = self
            .centroids
            .iter()
            .zip(&weights)
            .map(|((label, _), w)| (label.clone(), w / total))
            .collect();

        Ok(Score {
            prediction: self.centroids[closest].0.clone(),
            probability,
        })
    }

    fn dump(&self, writer: &mut dyn Write) -> Result<(), ScoringError> {
        let bytes = rmp_serde::to_vec_named(self)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }
}
