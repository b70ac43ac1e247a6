//! Distance between measurements
//!
//! Plain Euclidean distance over the seven raw features. No scaling is
//! applied, so wide-range columns (rainfall) weigh more than narrow ones (pH).

use crate::measurements::Measurements;

/// Squared L2 distance over all features
#[inline]
pub fn squared_euclidean_distance(a: &Measurements, b: &Measurements) -> f64 {
    a.as_array()
        .iter()
        .zip(b.as_array().iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

/// L2 (Euclidean) distance over all features
#[inline]
pub fn euclidean_distance(a: &Measurements, b: &Measurements) -> f64 {
    squared_euclidean_distance(a, b).sqrt()
}
