//! # cropknn API
//!
//! HTTP surface for the crop recommender. Renders classifier output as JSON
//! for front ends that collect soil and weather readings.

pub mod rest;

pub use rest::RestApi;
