//! Reference dataset
//!
//! The labeled crop table the classifier searches. It is compiled into the
//! binary, validated once when a [`ReferenceDataset`] is built, and never
//! mutated afterwards.

use crate::error::{Error, Result};
use crate::measurements::{Measurements, FEATURE_COUNT, FEATURE_NAMES};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// One labeled reference point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingExample {
    #[serde(flatten)]
    pub measurements: Measurements,
    /// Opaque crop identifier, e.g. `"Rice (அரிசி)"`
    pub label: String,
}

impl TrainingExample {
    pub fn new(measurements: Measurements, label: impl Into<String>) -> Self {
        Self {
            measurements,
            label: label.into(),
        }
    }
}

/// Built-in rows: N, P, K, temperature, humidity, ph, rainfall, label.
/// Several rows per crop keep the neighbor search dense enough per class.
const CROP_TABLE: &[([f64; FEATURE_COUNT], &str)] = &[
    ([90.0, 42.0, 43.0, 20.0, 82.0, 6.5, 202.0], "Rice (அரிசி)"),
    ([85.0, 58.0, 41.0, 21.0, 80.0, 7.0, 220.0], "Rice (அரிசி)"),
    ([60.0, 55.0, 44.0, 23.0, 83.0, 6.4, 250.0], "Rice (அரிசி)"),
    ([75.0, 40.0, 40.0, 20.0, 81.0, 6.0, 210.0], "Rice (அரிசி)"),

    ([70.0, 45.0, 20.0, 24.0, 65.0, 6.8, 80.0], "Maize (மக்காச்சோளம்)"),
    ([80.0, 50.0, 18.0, 26.0, 60.0, 6.2, 90.0], "Maize (மக்காச்சோளம்)"),
    ([78.0, 48.0, 22.0, 22.0, 62.0, 6.5, 85.0], "Maize (மக்காச்சோளம்)"),

    ([40.0, 60.0, 80.0, 18.0, 18.0, 7.2, 80.0], "Chickpea (சுண்டல்)"),
    ([35.0, 65.0, 75.0, 19.0, 20.0, 7.4, 85.0], "Chickpea (சுண்டல்)"),

    ([20.0, 60.0, 20.0, 20.0, 20.0, 5.7, 100.0], "Kidneybeans (ராஜ்மா)"),
    ([25.0, 65.0, 25.0, 22.0, 22.0, 5.8, 110.0], "Kidneybeans (ராஜ்மா)"),

    ([25.0, 65.0, 20.0, 28.0, 55.0, 5.8, 150.0], "Pigeonpeas (துவரம் பருப்பு)"),
    ([30.0, 60.0, 25.0, 29.0, 50.0, 6.0, 140.0], "Pigeonpeas (துவரம் பருப்பு)"),

    ([20.0, 50.0, 20.0, 28.0, 50.0, 6.5, 40.0], "Mothbeans (நரி பயறு)"),
    ([10.0, 40.0, 15.0, 29.0, 45.0, 7.0, 35.0], "Mothbeans (நரி பயறு)"),

    ([20.0, 50.0, 20.0, 28.0, 85.0, 6.8, 50.0], "Mungbean (பச்சை பயறு)"),

    ([40.0, 60.0, 20.0, 26.0, 80.0, 7.0, 65.0], "Blackgram (உளுந்து)"),

    ([20.0, 70.0, 20.0, 22.0, 65.0, 6.8, 45.0], "Lentil (மைசூர் பருப்பு)"),

    ([30.0, 20.0, 40.0, 22.0, 90.0, 6.5, 105.0], "Pomegranate (மாதுளை)"),

    ([100.0, 75.0, 50.0, 27.0, 80.0, 6.0, 100.0], "Banana (வாழை)"),
    ([110.0, 80.0, 55.0, 28.0, 82.0, 6.2, 110.0], "Banana (வாழை)"),

    ([20.0, 25.0, 30.0, 30.0, 50.0, 5.5, 90.0], "Mango (மாம்பழம்)"),

    ([25.0, 130.0, 200.0, 25.0, 80.0, 6.0, 66.0], "Grapes (திராட்சை)"),

    ([100.0, 10.0, 50.0, 25.0, 85.0, 6.5, 50.0], "Watermelon (தர்பூசணி)"),

    ([100.0, 15.0, 50.0, 28.0, 90.0, 6.7, 50.0], "Muskmelon (முலாம் பழம்)"),

    ([20.0, 130.0, 200.0, 22.0, 90.0, 6.0, 110.0], "Apple (ஆப்பிள்)"),

    ([20.0, 10.0, 30.0, 25.0, 90.0, 7.0, 110.0], "Orange (ஆரஞ்சு)"),

    ([50.0, 55.0, 50.0, 33.0, 90.0, 6.7, 150.0], "Papaya (பப்பாளி)"),

    ([20.0, 20.0, 30.0, 27.0, 95.0, 5.8, 150.0], "Coconut (தேங்காய்)"),

    ([120.0, 55.0, 35.0, 25.0, 75.0, 6.5, 80.0], "Cotton (பருத்தி)"),
    ([115.0, 50.0, 30.0, 26.0, 78.0, 6.8, 85.0], "Cotton (பருத்தி)"),

    ([80.0, 45.0, 40.0, 25.0, 80.0, 6.8, 170.0], "Jute (சணல்)"),

    ([100.0, 20.0, 30.0, 24.0, 60.0, 6.5, 150.0], "Coffee (காபி)"),
];

/// Immutable, validated collection of training examples
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct ReferenceDataset {
    examples: Vec<TrainingExample>,
}

impl ReferenceDataset {
    /// Build a dataset, checking that it is non-empty, every label is
    /// non-blank and every numeric field is finite.
    pub fn new(examples: Vec<TrainingExample>) -> Result<Self> {
        if examples.is_empty() {
            return Err(Error::invalid_dataset("dataset cannot be empty"));
        }

        for (row, example) in examples.iter().enumerate() {
            if example.label.trim().is_empty() {
                return Err(Error::invalid_dataset(format!("row {} has an empty label", row)));
            }
            if let Some(field) = example.measurements.first_non_finite() {
                return Err(Error::invalid_dataset(format!(
                    "row {} ('{}') has non-finite field '{}'",
                    row, example.label, field
                )));
            }
        }

        Ok(Self { examples })
    }

    /// The compiled-in crop recommendation table
    pub fn builtin() -> Result<Self> {
        let examples = CROP_TABLE
            .iter()
            .map(|(values, label)| TrainingExample::new(Measurements::from(*values), *label))
            .collect();
        Self::new(examples)
    }

    #[inline]
    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, TrainingExample> {
        self.examples.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Distinct labels in order of first appearance
    pub fn labels(&self) -> Vec<&str> {
        let mut seen = AHashSet::new();
        self.examples
            .iter()
            .map(|e| e.label.as_str())
            .filter(|label| seen.insert(*label))
            .collect()
    }

    /// Number of examples carrying `label`
    pub fn count_label(&self, label: &str) -> usize {
        self.examples.iter().filter(|e| e.label == label).count()
    }

    /// Names of the numeric columns, in storage order
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

impl AsRef<[TrainingExample]> for ReferenceDataset {
    fn as_ref(&self) -> &[TrainingExample] {
        &self.examples
    }
}

impl<'a> IntoIterator for &'a ReferenceDataset {
    type Item = &'a TrainingExample;
    type IntoIter = std::slice::Iter<'a, TrainingExample>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.iter()
    }
}
