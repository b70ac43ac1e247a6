//! Soil and climate measurements
//!
//! The seven numeric features every reference example carries and every
//! query supplies. Serialized with the short agronomic names (`N`, `P`, `K`)
//! used by the crop recommendation data.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of numeric features in a measurement
pub const FEATURE_COUNT: usize = 7;

/// Feature names in the order returned by [`Measurements::as_array`]
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "N",
    "P",
    "K",
    "temperature",
    "humidity",
    "ph",
    "rainfall",
];

/// Soil nutrient levels plus environmental readings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Measurements {
    /// Nitrogen index (roughly 0-200)
    #[serde(rename = "N")]
    pub nitrogen: f64,
    /// Phosphorus index (roughly 0-200)
    #[serde(rename = "P")]
    pub phosphorus: f64,
    /// Potassium index (roughly 0-200)
    #[serde(rename = "K")]
    pub potassium: f64,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Soil pH
    pub ph: f64,
    /// Millimeters
    pub rainfall: f64,
}

/// A classification request carries the same fields as a training example, minus the label.
pub type QueryPoint = Measurements;

impl Measurements {
    /// Values the recommendation form is pre-filled with. They match one of
    /// the rice rows of the built-in dataset.
    pub const REFERENCE_QUERY: Measurements = Measurements {
        nitrogen: 90.0,
        phosphorus: 42.0,
        potassium: 43.0,
        temperature: 20.0,
        humidity: 82.0,
        ph: 6.5,
        rainfall: 202.0,
    };

    #[inline]
    #[must_use]
    pub const fn new(
        nitrogen: f64,
        phosphorus: f64,
        potassium: f64,
        temperature: f64,
        humidity: f64,
        ph: f64,
        rainfall: f64,
    ) -> Self {
        Self {
            nitrogen,
            phosphorus,
            potassium,
            temperature,
            humidity,
            ph,
            rainfall,
        }
    }

    /// Features in [`FEATURE_NAMES`] order
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }

    /// Name of the first non-finite feature, if any
    pub fn first_non_finite(&self) -> Option<&'static str> {
        self.as_array()
            .iter()
            .zip(FEATURE_NAMES)
            .find(|(value, _)| !value.is_finite())
            .map(|(_, name)| name)
    }

    /// Reject NaN and infinite values. Ranges are not checked: out-of-range
    /// readings are legal and just land further away from every example.
    pub fn validate(&self) -> Result<()> {
        match self.first_non_finite() {
            Some(name) => Err(Error::invalid_input(format!(
                "field '{}' must be a finite number",
                name
            ))),
            None => Ok(()),
        }
    }
}

impl From<[f64; FEATURE_COUNT]> for Measurements {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        let [n, p, k, temperature, humidity, ph, rainfall] = values;
        Self::new(n, p, k, temperature, humidity, ph, rainfall)
    }
}
