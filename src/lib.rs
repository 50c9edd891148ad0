//! Python bindings for the glacier mass-balance models
//!
//! The extension module is importable as `_lib` and exposes a single
//! `MassBalanceModel` class with one constructor per model.

pub mod python;
