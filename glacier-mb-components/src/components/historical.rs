//! Historical mass balance
//!
//! Year-by-year mass balance driven by the full monthly climate record. The
//! 12-month block of the requested year is extrapolated to the requested
//! elevations and summed over the year; nothing is cached.
//!
//! The bias is stored but not applied: this model reproduces the observed
//! climate as-is.

use glacier_mb_core::calibration::CalibrationStore;
use glacier_mb_core::climate::{ClimateProvider, ClimateRecord};
use glacier_mb_core::config::MassBalanceConfig;
use glacier_mb_core::errors::{MBResult, MassBalanceError};
use glacier_mb_core::kernel::MassBalanceKernel;
use glacier_mb_core::model::MassBalanceModel;
use glacier_mb_core::FloatValue;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Time-varying mass balance over the whole climate record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalMassBalance {
    record: ClimateRecord,
    kernel: MassBalanceKernel,
    bias: FloatValue,
    sec_in_year: FloatValue,
    rho: FloatValue,
}

impl HistoricalMassBalance {
    pub fn new<C, S>(climate: &C, store: &S, config: &MassBalanceConfig) -> MBResult<Self>
    where
        C: ClimateProvider + ?Sized,
        S: CalibrationStore + ?Sized,
    {
        config.validate()?;
        let calibration = store.calibration()?;
        let record = climate.monthly_record()?;
        log::info!(
            "Built historical mass balance for [{}, {}]",
            record.first_year(),
            record.last_year()
        );

        Ok(Self {
            record,
            kernel: MassBalanceKernel::new(calibration.mu_star, config.thresholds()?),
            bias: 0.0,
            sec_in_year: config.sec_in_year,
            rho: config.rho,
        })
    }

    /// Years available in the climate record.
    pub fn years(&self) -> &[i32] {
        self.record.years()
    }

    /// Annual balance (mm w.e. yr-1) at `heights` for `year`.
    pub fn annual_balance(
        &self,
        heights: ArrayView1<FloatValue>,
        year: i32,
    ) -> MBResult<Array1<FloatValue>> {
        let block = self.record.year(year)?;
        let temp_2d = block.temperature_on_heights(heights)?;
        self.kernel.annual(temp_2d.view(), block.prcp(), 1)
    }
}

#[typetag::serde]
impl MassBalanceModel for HistoricalMassBalance {
    fn set_bias(&mut self, bias: FloatValue) {
        self.bias = bias;
    }

    fn bias(&self) -> FloatValue {
        self.bias
    }

    fn get_mb(
        &mut self,
        heights: ArrayView1<FloatValue>,
        year: Option<FloatValue>,
    ) -> MBResult<Array1<FloatValue>> {
        let year = year.ok_or(MassBalanceError::YearRequired)?;
        let mb_annual = self.annual_balance(heights, year.floor() as i32)?;
        Ok(mb_annual / self.sec_in_year / self.rho)
    }
}
