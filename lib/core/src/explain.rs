//! Explainability for crop recommendations
//!
//! Keeps the neighbor distances that produced a set of predictions and
//! derives summary numbers and a narration sentence from them.

use crate::classifier::{Neighbor, PredictionResult};
use serde::{Deserialize, Serialize};

/// Predictions together with the neighbor set they were voted from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Effective neighbor count after clamping
    pub k: usize,
    pub predictions: Vec<PredictionResult>,
    /// Nearest first
    pub neighbors: Vec<Neighbor>,
}

impl Recommendation {
    pub fn new(predictions: Vec<PredictionResult>, neighbors: Vec<Neighbor>) -> Self {
        Self {
            k: neighbors.len(),
            predictions,
            neighbors,
        }
    }

    /// Highest ranked prediction
    pub fn top(&self) -> Option<&PredictionResult> {
        self.predictions.first()
    }

    /// Sentence read aloud for the top prediction
    pub fn narration(&self) -> Option<String> {
        self.top().map(narrate)
    }

    pub fn stats(&self, dataset_size: usize) -> RecommendationStats {
        RecommendationStats::compute(self, dataset_size)
    }
}

/// Narration text for a single prediction
pub fn narrate(result: &PredictionResult) -> String {
    format!(
        "Based on K-Nearest Neighbors analysis, I recommend growing {}. Prediction confidence is {} percent.",
        result.crop, result.confidence
    )
}

/// Summary statistics for one recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationStats {
    /// Number of reference examples searched
    pub dataset_size: usize,
    /// Neighbors consulted
    pub k: usize,
    /// Distinct crops among the neighbors
    pub distinct_crops: usize,
    pub nearest_distance: f64,
    pub mean_distance: f64,
    pub top_crop: Option<String>,
    pub top_confidence: Option<u8>,
}

impl RecommendationStats {
    pub fn compute(recommendation: &Recommendation, dataset_size: usize) -> Self {
        let neighbors = &recommendation.neighbors;
        if neighbors.is_empty() {
            return Self {
                dataset_size,
                k: 0,
                distinct_crops: 0,
                nearest_distance: 0.0,
                mean_distance: 0.0,
                top_crop: None,
                top_confidence: None,
            };
        }

        let mean_distance =
            neighbors.iter().map(|n| n.distance).sum::<f64>() / neighbors.len() as f64;
        let top = recommendation.top();

        Self {
            dataset_size,
            k: neighbors.len(),
            distinct_crops: recommendation.predictions.len(),
            nearest_distance: neighbors[0].distance, // Neighbors are sorted
            mean_distance,
            top_crop: top.map(|r| r.crop.clone()),
            top_confidence: top.map(|r| r.confidence),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::aggregate_votes;

    fn neighbor(label: &str, distance: f64) -> Neighbor {
        Neighbor {
            label: label.to_string(),
            distance,
        }
    }

    fn create_test_recommendation() -> Recommendation {
        let neighbors = vec![
            neighbor("Rice", 0.0),
            neighbor("Rice", 2.0),
            neighbor("Jute", 4.0),
            neighbor("Rice", 6.0),
        ];
        Recommendation::new(aggregate_votes(&neighbors), neighbors)
    }

    #[test]
    fn test_narration() {
        let rec = create_test_recommendation();
        assert_eq!(
            rec.narration().unwrap(),
            "Based on K-Nearest Neighbors analysis, I recommend growing Rice. Prediction confidence is 75 percent."
        );
    }

    #[test]
    fn test_empty_narration() {
        let rec = Recommendation::new(Vec::new(), Vec::new());
        assert!(rec.narration().is_none());
        assert!(rec.top().is_none());
    }

    #[test]
    fn test_stats() {
        let rec = create_test_recommendation();
        let stats = rec.stats(33);

        assert_eq!(stats.dataset_size, 33);
        assert_eq!(stats.k, 4);
        assert_eq!(stats.distinct_crops, 2);
        assert_eq!(stats.nearest_distance, 0.0);
        assert!((stats.mean_distance - 3.0).abs() < 1e-9);
        assert_eq!(stats.top_crop.as_deref(), Some("Rice"));
        assert_eq!(stats.top_confidence, Some(75));
    }

    #[test]
    fn test_empty_stats() {
        let stats = Recommendation::new(Vec::new(), Vec::new()).stats(5);
        assert_eq!(stats.dataset_size, 5);
        assert_eq!(stats.k, 0);
        assert!(stats.top_crop.is_none());
    }

    #[test]
    fn test_recommendation_serialization() {
        let json = serde_json::to_string(&create_test_recommendation()).unwrap();
        assert!(json.contains("\"predictions\""));
        assert!(json.contains("\"confidence\":75"));
        assert!(json.contains("\"distance\""));
    }
}
