//! Core types for glacier surface mass-balance models
//!
//! Provides the [`model::MassBalanceModel`] interface together with the pieces the
//! concrete models are assembled from: monthly climate records, elevation
//! domains, the temperature-index kernel and a bias-keyed interpolant cache.

pub mod cache;
pub mod calibration;
pub mod climate;
pub mod config;
pub mod elevation;
pub mod interpolate;
pub mod kernel;
pub mod model;

pub mod errors;

/// Floating point type used throughout the models.
pub type FloatValue = f64;
