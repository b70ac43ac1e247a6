//! # cropknn
//!
//! Explainable crop recommendation from soil nutrients and climate readings.
//!
//! cropknn ranks crops with a k-nearest-neighbors vote over a compiled-in
//! reference table and reports, for every suggestion, how confident the vote
//! was and which neighbors cast it.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! cargo install cropknn
//! cropknn serve --http-port 8080
//! ```
//!
//! ### From the Command Line
//!
//! ```bash
//! cropknn recommend --n 90 --p 42 --k-nutrient 43 --temperature 20 \
//!     --humidity 82 --ph 6.5 --rainfall 202
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use cropknn::prelude::*;
//!
//! let classifier = KnnClassifier::builtin().unwrap();
//! let recommendation = classifier.explain(&Measurements::REFERENCE_QUERY).unwrap();
//!
//! let top = recommendation.top().unwrap();
//! assert_eq!(top.crop, "Rice (அரிசி)");
//! assert_eq!(top.neighbors.len(), 5);
//! ```
//!
//! ## Crate Structure
//!
//! - [`cropknn-core`](https://docs.rs/cropknn-core) - Dataset, distance, classifier, explainability
//! - [`cropknn-api`](https://docs.rs/cropknn-api) - REST API

// Re-export core types
pub use cropknn_core::{
    classify, ClassifierConfig, KnnClassifier,
    Measurements, QueryPoint, TrainingExample, ReferenceDataset,
    Neighbor, PredictionResult, Recommendation, RecommendationStats,
    DEFAULT_K,
    Error, Result,
};

// Re-export API
pub use cropknn_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        classify, ClassifierConfig, KnnClassifier,
        Measurements, QueryPoint, TrainingExample, ReferenceDataset,
        Neighbor, PredictionResult, Recommendation, RecommendationStats,
        DEFAULT_K,
        Error, Result,
        RestApi,
    };
}

/// Distance functions used by the classifier
pub mod distance {
    pub use cropknn_core::distance::{euclidean_distance, squared_euclidean_distance};
}
