//! Interpolant cache keyed by bias
//!
//! Building an interpolant means re-running the monthly kernel over the whole
//! elevation domain. During a calibration search only the bias changes, so each
//! distinct bias gets its own interpolant, built once and kept for the lifetime
//! of the owning model.

use crate::errors::MBResult;
use crate::interpolate::LinearInterpolator;
use crate::FloatValue;
use std::collections::HashMap;

/// Hashable key for a bias value.
///
/// Uses the bit pattern so that lookups are exact. `-0.0` and `0.0` map to the
/// same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BiasKey(u64);

impl From<FloatValue> for BiasKey {
    fn from(bias: FloatValue) -> Self {
        let bias = if bias == 0.0 { 0.0 } else { bias };
        Self(bias.to_bits())
    }
}

/// Lazily populated mapping from bias value to interpolant.
#[derive(Debug, Clone, Default)]
pub struct InterpolantCache {
    interpolants: HashMap<BiasKey, LinearInterpolator>,
    builds: usize,
}

impl InterpolantCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the interpolant for `bias`, building it with `build` on a miss.
    ///
    /// A failed build leaves the cache untouched.
    pub fn get_or_try_insert_with<F>(
        &mut self,
        bias: FloatValue,
        build: F,
    ) -> MBResult<&LinearInterpolator>
    where
        F: FnOnce(FloatValue) -> MBResult<LinearInterpolator>,
    {
        let key = BiasKey::from(bias);
        if !self.interpolants.contains_key(&key) {
            log::debug!("Building interpolant for bias {}", bias);
            let interp = build(bias)?;
            self.builds += 1;
            self.interpolants.insert(key, interp);
        }
        Ok(&self.interpolants[&key])
    }

    pub fn contains(&self, bias: FloatValue) -> bool {
        self.interpolants.contains_key(&BiasKey::from(bias))
    }

    /// Number of cached interpolants.
    pub fn len(&self) -> usize {
        self.interpolants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interpolants.is_empty()
    }

    /// Number of interpolants built since creation.
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Drop all cached interpolants.
    pub fn clear(&mut self) {
        self.interpolants.clear();
    }
}
