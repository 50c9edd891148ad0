//! Glacier surface mass-balance models
//!
//! # Models
//!
//! - [`components::ConstantGradientMassBalance`]: analytic linear gradient around an ELA
//! - [`components::EquilibriumMassBalance`]: climatological balance over a fixed reference window
//! - [`components::TemperatureBiasMassBalance`]: reference-window climate perturbed by a temperature bias
//! - [`components::HistoricalMassBalance`]: year-by-year balance over the full climate record

pub mod components;
