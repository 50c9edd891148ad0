//! Monthly temperature-index mass-balance kernel
//!
//! Turns an elevation-by-month grid of air temperature and the matching
//! precipitation into a mass-balance field. All grids are laid out as
//! `[n_heights, n_months]`.
//!
//! For each cell:
//! ```text
//! mb = f_solid(t) * prcp - mu_star * max(t - temp_melt, 0)
//! ```
//!
//! with the solid fraction ramping linearly from 1 at `temp_all_solid` to 0 at
//! `temp_all_liq`.

use crate::config::invalid;
use crate::errors::{MBResult, MassBalanceError};
use crate::FloatValue;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use serde::{Deserialize, Serialize};

/// Precipitation-phase and melt thresholds (°C).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdValues")]
pub struct MeltThresholds {
    temp_all_solid: FloatValue,
    temp_all_liq: FloatValue,
    temp_melt: FloatValue,
}

/// Unchecked thresholds as they appear in serialised models.
#[derive(Deserialize)]
struct ThresholdValues {
    temp_all_solid: FloatValue,
    temp_all_liq: FloatValue,
    temp_melt: FloatValue,
}

impl TryFrom<ThresholdValues> for MeltThresholds {
    type Error = MassBalanceError;

    fn try_from(values: ThresholdValues) -> MBResult<Self> {
        Self::new(values.temp_all_solid, values.temp_all_liq, values.temp_melt)
    }
}

impl MeltThresholds {
    /// Create a validated set of thresholds.
    ///
    /// `temp_all_solid` must be strictly below `temp_all_liq`, otherwise the
    /// solid-fraction ramp is undefined.
    pub fn new(
        temp_all_solid: FloatValue,
        temp_all_liq: FloatValue,
        temp_melt: FloatValue,
    ) -> MBResult<Self> {
        if !(temp_all_solid.is_finite() && temp_all_liq.is_finite() && temp_melt.is_finite()) {
            return Err(invalid("thresholds", "temperature thresholds must be finite"));
        }
        if temp_all_solid >= temp_all_liq {
            return Err(invalid(
                "temp_all_solid",
                "must be strictly lower than temp_all_liq",
            ));
        }
        Ok(Self {
            temp_all_solid,
            temp_all_liq,
            temp_melt,
        })
    }

    pub fn temp_all_solid(&self) -> FloatValue {
        self.temp_all_solid
    }

    pub fn temp_all_liq(&self) -> FloatValue {
        self.temp_all_liq
    }

    pub fn temp_melt(&self) -> FloatValue {
        self.temp_melt
    }

    /// Temperature above the melt threshold, clipped at zero.
    #[inline]
    pub fn melt_term(&self, temp: FloatValue) -> FloatValue {
        (temp - self.temp_melt).max(0.0)
    }

    /// Fraction of precipitation falling as snow.
    #[inline]
    pub fn solid_fraction(&self, temp: FloatValue) -> FloatValue {
        let fac = 1.0 - (temp - self.temp_all_solid) / (self.temp_all_liq - self.temp_all_solid);
        fac.clamp(0.0, 1.0)
    }
}

/// Extrapolate monthly temperatures to a set of elevations.
///
/// `temp[h, m] = temp[m] + grad[m] * (heights[h] - ref_hgt)`
pub fn temperature_on_heights(
    temp: ArrayView1<FloatValue>,
    grad: ArrayView1<FloatValue>,
    ref_hgt: FloatValue,
    heights: ArrayView1<FloatValue>,
) -> MBResult<Array2<FloatValue>> {
    if grad.len() != temp.len() {
        return Err(MassBalanceError::MismatchedSeries {
            name: "grad".to_string(),
            expected: temp.len(),
            found: grad.len(),
        });
    }
    Ok(Array2::from_shape_fn(
        (heights.len(), temp.len()),
        |(h, m)| temp[m] + grad[m] * (heights[h] - ref_hgt),
    ))
}

/// Temperature-index kernel parameterised by the temperature sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassBalanceKernel {
    /// Temperature sensitivity (mm w.e. K-1 month-1)
    pub mu_star: FloatValue,
    pub thresholds: MeltThresholds,
}

impl MassBalanceKernel {
    pub fn new(mu_star: FloatValue, thresholds: MeltThresholds) -> Self {
        Self {
            mu_star,
            thresholds,
        }
    }

    /// Degree-day-like melt forcing for every cell.
    pub fn melt(&self, temp2d: ArrayView2<FloatValue>) -> Array2<FloatValue> {
        temp2d.mapv(|t| self.thresholds.melt_term(t))
    }

    /// Solid precipitation for every cell.
    ///
    /// `prcp` holds one value per month and is shared by all elevations.
    pub fn solid_precipitation(
        &self,
        temp2d: ArrayView2<FloatValue>,
        prcp: ArrayView1<FloatValue>,
    ) -> MBResult<Array2<FloatValue>> {
        check_months(temp2d, prcp)?;
        let mut solid = temp2d.mapv(|t| self.thresholds.solid_fraction(t));
        solid *= &prcp;
        Ok(solid)
    }

    /// Net monthly balance for every cell: solid precipitation minus melt.
    pub fn monthly(
        &self,
        temp2d: ArrayView2<FloatValue>,
        prcp: ArrayView1<FloatValue>,
    ) -> MBResult<Array2<FloatValue>> {
        let mut balance = self.solid_precipitation(temp2d, prcp)?;
        Zip::from(&mut balance)
            .and(&temp2d)
            .for_each(|b, &t| *b -= self.mu_star * self.thresholds.melt_term(t));
        Ok(balance)
    }

    /// Annual balance per elevation.
    ///
    /// The monthly balances are summed along the month axis and divided by the
    /// number of years they cover, giving the mean annual balance.
    pub fn annual(
        &self,
        temp2d: ArrayView2<FloatValue>,
        prcp: ArrayView1<FloatValue>,
        n_years: usize,
    ) -> MBResult<Array1<FloatValue>> {
        if n_years == 0 || temp2d.ncols() != 12 * n_years {
            return Err(MassBalanceError::IncompleteYears {
                months: temp2d.ncols(),
            });
        }
        let monthly = self.monthly(temp2d, prcp)?;
        Ok(monthly.sum_axis(Axis(1)) / n_years as FloatValue)
    }
}

fn check_months(temp2d: ArrayView2<FloatValue>, prcp: ArrayView1<FloatValue>) -> MBResult<()> {
    if temp2d.ncols() != prcp.len() {
        return Err(MassBalanceError::MismatchedSeries {
            name: "prcp".to_string(),
            expected: temp2d.ncols(),
            found: prcp.len(),
        });
    }
    Ok(())
}
