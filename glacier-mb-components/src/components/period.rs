use glacier_mb_core::calibration::Calibration;
use glacier_mb_core::config::MassBalanceConfig;
use serde::{Deserialize, Serialize};

/// Climate period a model is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferencePeriod {
    /// `t_star` ± `mu_star_halfperiod`, the glacier's calibration climate
    TStar,
    /// The configured present-day window (1983-2003 by default)
    PresentDay,
}

impl ReferencePeriod {
    /// Inclusive year range of the period.
    pub fn years(&self, calibration: &Calibration, config: &MassBalanceConfig) -> (i32, i32) {
        match self {
            ReferencePeriod::TStar => calibration.reference_window(config.mu_star_halfperiod),
            ReferencePeriod::PresentDay => config.present_day_period,
        }
    }
}
