//! Model configuration
//!
//! Physical constants and default thresholds shared by every mass-balance model.
//! A configuration is passed explicitly to each constructor instead of being read
//! from global state.

use crate::errors::{MBResult, MassBalanceError};
use crate::kernel::MeltThresholds;
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of seconds in a (365 day) year.
pub const SEC_IN_YEAR: FloatValue = 365.0 * 24.0 * 3600.0;

/// Density of ice (kg m-3).
pub const RHO_ICE: FloatValue = 900.0;

/// Configuration for the mass-balance models.
///
/// # Default Values
///
/// | Field | Default |
/// |---|---|
/// | `rho` | 900 kg m-3 |
/// | `sec_in_year` | 31 536 000 s |
/// | `temp_all_solid` | 0 °C |
/// | `temp_all_liq` | 2 °C |
/// | `temp_melt` | -1 °C |
/// | `mu_star_halfperiod` | 15 yr |
/// | `n_pixels` | 1000 |
/// | `present_day_period` | 1983 - 2003 |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassBalanceConfig {
    /// Ice density (kg m-3).
    pub rho: FloatValue,

    /// Seconds per year, used to convert annual balances to rates.
    pub sec_in_year: FloatValue,

    /// Temperature at or below which all precipitation is solid (°C).
    pub temp_all_solid: FloatValue,

    /// Temperature at or above which all precipitation is liquid (°C).
    pub temp_all_liq: FloatValue,

    /// Temperature above which ice melt occurs (°C).
    pub temp_melt: FloatValue,

    /// Half-width of the climate window centred on t* (years).
    pub mu_star_halfperiod: i32,

    /// Number of elevation samples in the domains built by the models.
    pub n_pixels: usize,

    /// Inclusive calendar window used as the "present-day" reference period.
    pub present_day_period: (i32, i32),
}

impl Default for MassBalanceConfig {
    fn default() -> Self {
        Self {
            rho: RHO_ICE,
            sec_in_year: SEC_IN_YEAR,
            temp_all_solid: 0.0,
            temp_all_liq: 2.0,
            temp_melt: -1.0,
            mu_star_halfperiod: 15,
            n_pixels: 1000,
            present_day_period: (1983, 2003),
        }
    }
}

impl MassBalanceConfig {
    /// Parse a configuration from a TOML document.
    ///
    /// Missing keys fall back to their defaults. The result is validated.
    pub fn from_toml_str(content: &str) -> MBResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a TOML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> MBResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check that the configuration is physically meaningful.
    pub fn validate(&self) -> MBResult<()> {
        if !(self.rho > 0.0) {
            return Err(invalid("rho", "ice density must be strictly positive"));
        }
        if !(self.sec_in_year > 0.0) {
            return Err(invalid("sec_in_year", "must be strictly positive"));
        }
        if self.mu_star_halfperiod < 0 {
            return Err(invalid("mu_star_halfperiod", "must not be negative"));
        }
        if self.n_pixels < 2 {
            return Err(invalid("n_pixels", "at least two elevation samples are needed"));
        }
        if self.present_day_period.0 > self.present_day_period.1 {
            return Err(invalid(
                "present_day_period",
                "first year must not be after the last year",
            ));
        }
        self.thresholds().map(|_| ())
    }

    /// The precipitation-phase and melt thresholds.
    pub fn thresholds(&self) -> MBResult<MeltThresholds> {
        MeltThresholds::new(self.temp_all_solid, self.temp_all_liq, self.temp_melt)
    }

    /// Convert an annual water-equivalent balance to an ice-thickness rate (m s-1).
    pub fn to_rate(&self, annual: FloatValue) -> FloatValue {
        annual / self.sec_in_year / self.rho
    }
}

pub(crate) fn invalid(name: &str, reason: &str) -> MassBalanceError {
    MassBalanceError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
