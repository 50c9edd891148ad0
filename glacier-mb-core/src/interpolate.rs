//! Piecewise-linear interpolation over elevation
//!
//! Queries outside the node range are extrapolated linearly from the first or
//! last segment. Glacier surfaces can drift past the padded domain over a long
//! run, so extrapolation never fails.

use crate::errors::{MBResult, MassBalanceError};
use crate::FloatValue;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// A 1-D piecewise-linear function `y(x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Nodes")]
pub struct LinearInterpolator {
    x: Array1<FloatValue>,
    y: Array1<FloatValue>,
}

#[derive(Deserialize)]
struct Nodes {
    x: Array1<FloatValue>,
    y: Array1<FloatValue>,
}

impl TryFrom<Nodes> for LinearInterpolator {
    type Error = MassBalanceError;

    fn try_from(nodes: Nodes) -> MBResult<Self> {
        Self::new(nodes.x, nodes.y)
    }
}

impl LinearInterpolator {
    /// Build an interpolator from nodes.
    ///
    /// `x` must be finite and strictly increasing, with at least two nodes.
    pub fn new(x: Array1<FloatValue>, y: Array1<FloatValue>) -> MBResult<Self> {
        if x.len() != y.len() {
            return Err(MassBalanceError::MismatchedSeries {
                name: "y".to_string(),
                expected: x.len(),
                found: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(MassBalanceError::InvalidDomain(
                "at least two interpolation nodes are required".to_string(),
            ));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(MassBalanceError::InvalidDomain(
                "interpolation nodes must be finite".to_string(),
            ));
        }
        if x.iter().zip(x.iter().skip(1)).any(|(x0, x1)| x1 <= x0) {
            return Err(MassBalanceError::InvalidDomain(
                "interpolation nodes must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { x, y })
    }

    /// The `(min, max)` range covered by the nodes.
    pub fn domain(&self) -> (FloatValue, FloatValue) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    pub fn x(&self) -> ArrayView1<'_, FloatValue> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView1<'_, FloatValue> {
        self.y.view()
    }

    /// Evaluate the function at a single point.
    pub fn value(&self, x: FloatValue) -> FloatValue {
        let n = self.x.len();
        // Index of the segment [i, i + 1] used for x, clamped to the end segments
        let upper = self
            .x
            .as_slice()
            .map(|xs| xs.partition_point(|&node| node <= x))
            .unwrap_or_else(|| self.x.iter().take_while(|&&node| node <= x).count());
        let i = upper.saturating_sub(1).min(n - 2);

        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    /// Evaluate the function at every point of `xs`.
    pub fn evaluate(&self, xs: ArrayView1<'_, FloatValue>) -> Array1<FloatValue> {
        xs.mapv(|x| self.value(x))
    }
}
