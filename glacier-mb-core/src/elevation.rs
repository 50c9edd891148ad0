//! Elevation domains
//!
//! The interpolated models sample mass balance on a regular elevation grid that
//! extends beyond the observed glacier surface, so the glacier can grow or thin
//! during a run without leaving the sampled range.

use crate::errors::{MBResult, MassBalanceError};
use crate::FloatValue;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Source of glacier surface elevations.
pub trait GlacierGeometry {
    /// All surface elevations of the glacier (m), in no particular order.
    fn surface_heights(&self) -> Vec<FloatValue>;
}

impl GlacierGeometry for [FloatValue] {
    fn surface_heights(&self) -> Vec<FloatValue> {
        self.to_vec()
    }
}

impl GlacierGeometry for Vec<FloatValue> {
    fn surface_heights(&self) -> Vec<FloatValue> {
        self.clone()
    }
}

impl GlacierGeometry for Array1<FloatValue> {
    fn surface_heights(&self) -> Vec<FloatValue> {
        self.to_vec()
    }
}

/// A single glacier flowline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flowline {
    /// Surface elevation along the flowline (m)
    pub surface_h: Array1<FloatValue>,
}

impl Flowline {
    pub fn new(surface_h: Array1<FloatValue>) -> Self {
        Self { surface_h }
    }
}

/// Heights from every flowline are concatenated.
impl GlacierGeometry for [Flowline] {
    fn surface_heights(&self) -> Vec<FloatValue> {
        self.iter()
            .flat_map(|fl| fl.surface_h.iter().copied())
            .collect()
    }
}

impl GlacierGeometry for Vec<Flowline> {
    fn surface_heights(&self) -> Vec<FloatValue> {
        self.as_slice().surface_heights()
    }
}

/// Padding applied below the lowest and above the highest surface elevation (m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainPadding {
    pub below: FloatValue,
    pub above: FloatValue,
}

impl DomainPadding {
    /// Padding used by the models based on the t* equilibrium climate.
    pub const EQUILIBRIUM: Self = Self {
        below: 200.0,
        above: 1200.0,
    };

    /// Padding used by the models based on the present-day climate.
    pub const PRESENT_DAY: Self = Self {
        below: 100.0,
        above: 200.0,
    };

    pub fn new(below: FloatValue, above: FloatValue) -> Self {
        Self { below, above }
    }
}

/// Regularly spaced, strictly increasing elevation samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationDomain {
    heights: Array1<FloatValue>,
}

impl ElevationDomain {
    /// Build a domain of `n_pixels` elevations spanning the padded extent of a
    /// glacier's surface.
    pub fn from_geometry<G>(geometry: &G, padding: DomainPadding, n_pixels: usize) -> MBResult<Self>
    where
        G: GlacierGeometry + ?Sized,
    {
        Self::from_heights(&geometry.surface_heights(), padding, n_pixels)
    }

    /// Build a domain spanning `[min(heights) - below, max(heights) + above]`.
    pub fn from_heights(
        heights: &[FloatValue],
        padding: DomainPadding,
        n_pixels: usize,
    ) -> MBResult<Self> {
        if heights.is_empty() {
            return Err(MassBalanceError::InvalidDomain(
                "glacier geometry has no surface elevations".to_string(),
            ));
        }
        if heights.iter().any(|h| !h.is_finite()) {
            return Err(MassBalanceError::InvalidDomain(
                "surface elevations must be finite".to_string(),
            ));
        }
        if n_pixels < 2 {
            return Err(MassBalanceError::InvalidDomain(format!(
                "need at least two elevation samples, got {}",
                n_pixels
            )));
        }

        let min = heights.iter().copied().fold(FloatValue::INFINITY, FloatValue::min);
        let max = heights
            .iter()
            .copied()
            .fold(FloatValue::NEG_INFINITY, FloatValue::max);
        let (start, end) = (min - padding.below, max + padding.above);
        if !(end > start) {
            return Err(MassBalanceError::InvalidDomain(format!(
                "empty elevation range [{}, {}]",
                start, end
            )));
        }
        log::debug!(
            "Elevation domain [{}, {}] with {} samples",
            start,
            end,
            n_pixels
        );

        Ok(Self {
            heights: Array1::linspace(start, end, n_pixels),
        })
    }

    pub fn heights(&self) -> ArrayView1<'_, FloatValue> {
        self.heights.view()
    }

    pub fn into_heights(self) -> Array1<FloatValue> {
        self.heights
    }

    /// Lowest and highest sample.
    pub fn bounds(&self) -> (FloatValue, FloatValue) {
        (self.heights[0], self.heights[self.heights.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}
