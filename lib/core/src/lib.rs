//! # cropknn Core
//!
//! Core library for the cropknn crop recommender.
//!
//! This crate provides the reference data and the classifier:
//!
//! - [`Measurements`] - The seven soil and climate features of a sample
//! - [`ReferenceDataset`] - Immutable, validated table of labeled examples
//! - [`classify`] - k-nearest-neighbors vote over a dataset
//! - [`KnnClassifier`] - A dataset bound to a default `k`, with batch support
//! - [`Recommendation`] - Predictions plus the neighbor distances behind them
//!
//! ## Example
//!
//! ```rust
//! use cropknn_core::{KnnClassifier, Measurements};
//!
//! let classifier = KnnClassifier::builtin().unwrap();
//!
//! let query = Measurements::new(90.0, 42.0, 43.0, 20.0, 82.0, 6.5, 202.0);
//! let results = classifier.recommend(&query).unwrap();
//!
//! assert_eq!(results[0].crop, "Rice (அரிசி)");
//! assert_eq!(results[0].confidence, 80);
//! ```

pub mod classifier;
pub mod dataset;
pub mod distance;
pub mod error;
pub mod explain;
pub mod measurements;

pub use classifier::{
    aggregate_votes, classify, confidence_percent, nearest_neighbors, tally_votes,
    ClassifierConfig, KnnClassifier, Neighbor, PredictionResult, DEFAULT_K,
};
pub use dataset::{ReferenceDataset, TrainingExample};
pub use distance::{euclidean_distance, squared_euclidean_distance};
pub use error::{Error, Result};
pub use explain::{narrate, Recommendation, RecommendationStats};
pub use measurements::{Measurements, QueryPoint, FEATURE_COUNT, FEATURE_NAMES};
