//! Equilibrium mass balance
//!
//! Climatological mass balance averaged over a fixed reference period. The
//! annual melt forcing and solid precipitation are averaged over the period at
//! each elevation of a padded domain, and
//! ```text
//! mb(h) = mean(prcp_solid)(h) - mu_star * mean(temp_melt)(h)
//! ```
//! is interpolated over elevation. The result does not depend on the year.

use crate::components::ReferencePeriod;
use glacier_mb_core::calibration::CalibrationStore;
use glacier_mb_core::climate::ClimateProvider;
use glacier_mb_core::config::MassBalanceConfig;
use glacier_mb_core::elevation::{DomainPadding, ElevationDomain, GlacierGeometry};
use glacier_mb_core::errors::MBResult;
use glacier_mb_core::interpolate::LinearInterpolator;
use glacier_mb_core::model::MassBalanceModel;
use glacier_mb_core::FloatValue;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Time-invariant mass balance of a reference climate period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquilibriumMassBalance {
    period: ReferencePeriod,
    years: (i32, i32),
    t_star: i32,
    mu_star: FloatValue,
    interp: LinearInterpolator,
    bias: FloatValue,
    sec_in_year: FloatValue,
    rho: FloatValue,
}

impl EquilibriumMassBalance {
    /// Equilibrium balance of the calibration period `t_star` ± `mu_star_halfperiod`.
    ///
    /// The domain is padded by 200 m below and 1200 m above the glacier.
    pub fn from_t_star<G, C, S>(
        geometry: &G,
        climate: &C,
        store: &S,
        config: &MassBalanceConfig,
        bias: FloatValue,
    ) -> MBResult<Self>
    where
        G: GlacierGeometry + ?Sized,
        C: ClimateProvider + ?Sized,
        S: CalibrationStore + ?Sized,
    {
        Self::new(
            geometry,
            climate,
            store,
            config,
            ReferencePeriod::TStar,
            DomainPadding::EQUILIBRIUM,
            bias,
        )
    }

    /// Equilibrium balance of the present-day period.
    ///
    /// The domain is padded by 100 m below and 200 m above the glacier.
    pub fn from_present_day<G, C, S>(
        geometry: &G,
        climate: &C,
        store: &S,
        config: &MassBalanceConfig,
        bias: FloatValue,
    ) -> MBResult<Self>
    where
        G: GlacierGeometry + ?Sized,
        C: ClimateProvider + ?Sized,
        S: CalibrationStore + ?Sized,
    {
        Self::new(
            geometry,
            climate,
            store,
            config,
            ReferencePeriod::PresentDay,
            DomainPadding::PRESENT_DAY,
            bias,
        )
    }

    /// Build the model for an arbitrary period and domain padding.
    pub fn new<G, C, S>(
        geometry: &G,
        climate: &C,
        store: &S,
        config: &MassBalanceConfig,
        period: ReferencePeriod,
        padding: DomainPadding,
        bias: FloatValue,
    ) -> MBResult<Self>
    where
        G: GlacierGeometry + ?Sized,
        C: ClimateProvider + ?Sized,
        S: CalibrationStore + ?Sized,
    {
        config.validate()?;
        let calibration = store.calibration()?;
        let years = period.years(&calibration, config);

        let domain = ElevationDomain::from_geometry(geometry, padding, config.n_pixels)?;
        let yearly =
            climate.yearly_climate_on_heights(domain.heights(), years, &config.thresholds()?)?;
        let (temp, prcp) = yearly.mean_over_years()?;
        let mb_on_h = prcp - temp * calibration.mu_star;

        let interp = LinearInterpolator::new(domain.into_heights(), mb_on_h)?;
        log::info!(
            "Built {:?} equilibrium mass balance for [{}, {}], mu* = {}",
            period,
            years.0,
            years.1,
            calibration.mu_star
        );

        Ok(Self {
            period,
            years,
            t_star: calibration.t_star,
            mu_star: calibration.mu_star,
            interp,
            bias,
            sec_in_year: config.sec_in_year,
            rho: config.rho,
        })
    }

    pub fn period(&self) -> ReferencePeriod {
        self.period
    }

    /// Inclusive year range the climate was averaged over.
    pub fn years(&self) -> (i32, i32) {
        self.years
    }

    pub fn t_star(&self) -> i32 {
        self.t_star
    }

    pub fn mu_star(&self) -> FloatValue {
        self.mu_star
    }

    /// Elevations the balance was sampled at.
    pub fn heights(&self) -> ArrayView1<'_, FloatValue> {
        self.interp.x()
    }

    /// Annual balance (mm w.e. yr-1) at the sampled elevations, without bias.
    pub fn annual_balance(&self) -> ArrayView1<'_, FloatValue> {
        self.interp.y()
    }
}

#[typetag::serde]
impl MassBalanceModel for EquilibriumMassBalance {
    fn set_bias(&mut self, bias: FloatValue) {
        self.bias = bias;
    }

    fn bias(&self) -> FloatValue {
        self.bias
    }

    fn get_mb(
        &mut self,
        heights: ArrayView1<FloatValue>,
        _year: Option<FloatValue>,
    ) -> MBResult<Array1<FloatValue>> {
        Ok(self
            .interp
            .evaluate(heights)
            .mapv(|mb| (mb + self.bias) / self.sec_in_year / self.rho))
    }
}
