//! k-nearest-neighbors crop classifier
//!
//! Ranks every reference example by Euclidean distance to the query, keeps
//! the `k` closest, and turns their labels into confidence-scored votes.
//!
//! Determinism rules:
//! - neighbors with equal distance keep dataset order (stable sort)
//! - vote counts are tallied in first-occurrence order among the neighbors
//! - predictions with equal confidence keep that first-occurrence order

use crate::dataset::{ReferenceDataset, TrainingExample};
use crate::distance::euclidean_distance;
use crate::error::{Error, Result};
use crate::explain::Recommendation;
use crate::measurements::QueryPoint;
use ahash::AHashMap;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Neighbor count used by the recommendation form
pub const DEFAULT_K: usize = 5;

/// A reference example's label paired with its distance to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub label: String,
    pub distance: f64,
}

/// One ranked crop suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub crop: String,
    /// Share of the neighbor set voting for `crop`, as a whole percentage
    pub confidence: u8,
    /// Labels of all selected neighbors, nearest first. Identical across
    /// every result of one call.
    pub neighbors: Vec<String>,
}

/// Classify `query` against `dataset` using its `k` nearest examples.
///
/// `k` larger than the dataset is clamped to the dataset size. An empty
/// dataset, `k == 0` or a non-finite query field fail with
/// [`Error::InvalidInput`] before any distance is computed.
pub fn classify(
    query: &QueryPoint,
    dataset: &[TrainingExample],
    k: usize,
) -> Result<Vec<PredictionResult>> {
    let neighbors = nearest_neighbors(query, dataset, k)?;
    Ok(vote(&neighbors, dataset.len()))
}

/// Aggregate a neighbor set and log the outcome of one classification
fn vote(neighbors: &[Neighbor], dataset_size: usize) -> Vec<PredictionResult> {
    let results = aggregate_votes(neighbors);

    debug!(
        k = neighbors.len(),
        dataset_size,
        top = results.first().map(|r| r.crop.as_str()).unwrap_or(""),
        "classified query"
    );

    results
}

/// Select the `min(k, dataset.len())` examples closest to `query`, nearest first.
pub fn nearest_neighbors(
    query: &QueryPoint,
    dataset: &[TrainingExample],
    k: usize,
) -> Result<Vec<Neighbor>> {
    if dataset.is_empty() {
        return Err(Error::invalid_input("dataset must not be empty"));
    }
    if k == 0 {
        return Err(Error::invalid_input("k must be a positive integer"));
    }
    query.validate()?;

    let k = k.min(dataset.len());

    let mut ranked: Vec<(OrderedFloat<f64>, usize)> = dataset
        .iter()
        .enumerate()
        .map(|(idx, example)| {
            (
                OrderedFloat(euclidean_distance(query, &example.measurements)),
                idx,
            )
        })
        .collect();

    // Stable: equal distances stay in dataset order
    ranked.sort_by_key(|(distance, _)| *distance);

    Ok(ranked
        .into_iter()
        .take(k)
        .map(|(distance, idx)| Neighbor {
            label: dataset[idx].label.clone(),
            distance: distance.into_inner(),
        })
        .collect())
}

/// Count votes per label in first-occurrence order
pub fn tally_votes(neighbors: &[Neighbor]) -> Vec<(&str, usize)> {
    let mut positions: AHashMap<&str, usize> = AHashMap::new();
    let mut tally: Vec<(&str, usize)> = Vec::new();

    for neighbor in neighbors {
        let label = neighbor.label.as_str();
        match positions.get(label) {
            Some(&pos) => tally[pos].1 += 1,
            None => {
                positions.insert(label, tally.len());
                tally.push((label, 1));
            }
        }
    }

    tally
}

/// Turn a neighbor set into predictions sorted by descending confidence
pub fn aggregate_votes(neighbors: &[Neighbor]) -> Vec<PredictionResult> {
    if neighbors.is_empty() {
        return Vec::new();
    }

    let k = neighbors.len();
    let neighbor_labels: Vec<String> = neighbors.iter().map(|n| n.label.clone()).collect();

    let mut results: Vec<PredictionResult> = tally_votes(neighbors)
        .into_iter()
        .map(|(label, count)| PredictionResult {
            crop: label.to_string(),
            confidence: confidence_percent(count, k),
            neighbors: neighbor_labels.clone(),
        })
        .collect();

    // Stable: ties keep first-occurrence order
    results.sort_by(|a, b| b.confidence.cmp(&a.confidence));

    results
}

/// `count / k` as a percentage, rounded half away from zero.
///
/// Computed in integers so `.5` boundaries are exact. A label that received
/// at least one vote never scores below 1.
pub fn confidence_percent(count: usize, k: usize) -> u8 {
    if k == 0 {
        return 0;
    }
    let count = count.min(k);
    let percent = (200 * count + k) / (2 * k);
    if count > 0 {
        percent.max(1) as u8
    } else {
        0
    }
}

/// Configuration for [`KnnClassifier`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Neighbors consulted per query
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize {
    DEFAULT_K
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { k: DEFAULT_K }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::invalid_input("k must be a positive integer"));
        }
        Ok(())
    }
}

/// A classifier bound to a reference dataset and a default neighbor count.
///
/// Holds no mutable state, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    dataset: ReferenceDataset,
    config: ClassifierConfig,
}

impl KnnClassifier {
    pub fn new(dataset: ReferenceDataset, config: ClassifierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { dataset, config })
    }

    /// Classifier over the compiled-in crop table with `k = 5`
    pub fn builtin() -> Result<Self> {
        Self::new(ReferenceDataset::builtin()?, ClassifierConfig::default())
    }

    pub fn dataset(&self) -> &ReferenceDataset {
        &self.dataset
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn recommend(&self, query: &QueryPoint) -> Result<Vec<PredictionResult>> {
        self.recommend_with_k(query, self.config.k)
    }

    pub fn recommend_with_k(&self, query: &QueryPoint, k: usize) -> Result<Vec<PredictionResult>> {
        classify(query, self.dataset.examples(), k)
    }

    /// Predictions plus the neighbor distances that produced them
    pub fn explain(&self, query: &QueryPoint) -> Result<Recommendation> {
        self.explain_with_k(query, self.config.k)
    }

    pub fn explain_with_k(&self, query: &QueryPoint, k: usize) -> Result<Recommendation> {
        let neighbors = nearest_neighbors(query, self.dataset.examples(), k)?;
        let predictions = vote(&neighbors, self.dataset.len());
        Ok(Recommendation::new(predictions, neighbors))
    }

    /// Classify many queries in parallel. Output order matches input order
    /// and each entry equals what [`KnnClassifier::recommend`] returns.
    pub fn recommend_batch(&self, queries: &[QueryPoint]) -> Vec<Result<Vec<PredictionResult>>> {
        self.recommend_batch_with_k(queries, self.config.k)
    }

    pub fn recommend_batch_with_k(
        &self,
        queries: &[QueryPoint],
        k: usize,
    ) -> Vec<Result<Vec<PredictionResult>>> {
        queries
            .par_iter()
            .map(|query| self.recommend_with_k(query, k))
            .collect()
    }
}
