//! Temperature-bias mass balance
//!
//! Uses the monthly climate of a fixed reference period and perturbs its
//! temperature by an offset derived from the bias. This is useful for finding
//! a possible past glacier state.
//!
//! The bias is expressed in negative hundredths of a degree:
//! ```text
//! delta_t = -bias / 100
//! ```
//!
//! Each new bias requires running the monthly kernel over the whole elevation
//! domain, so the resulting profile is cached per bias value.

use crate::components::ReferencePeriod;
use glacier_mb_core::cache::InterpolantCache;
use glacier_mb_core::calibration::CalibrationStore;
use glacier_mb_core::climate::ClimateProvider;
use glacier_mb_core::config::MassBalanceConfig;
use glacier_mb_core::elevation::{DomainPadding, ElevationDomain, GlacierGeometry};
use glacier_mb_core::errors::MBResult;
use glacier_mb_core::interpolate::LinearInterpolator;
use glacier_mb_core::kernel::MassBalanceKernel;
use glacier_mb_core::model::MassBalanceModel;
use glacier_mb_core::FloatValue;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Reference-period mass balance with a temperature offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureBiasMassBalance {
    period: ReferencePeriod,
    years: (i32, i32),
    kernel: MassBalanceKernel,
    n_years: usize,
    heights: Array1<FloatValue>,
    /// Monthly temperature at each elevation, `[n_heights, n_months]`
    temp_2d: Array2<FloatValue>,
    prcp: Array1<FloatValue>,
    bias: FloatValue,
    sec_in_year: FloatValue,
    rho: FloatValue,
    #[serde(skip)]
    cache: InterpolantCache,
}

impl TemperatureBiasMassBalance {
    /// Build the model from the monthly climate of `period`.
    ///
    /// The domain is padded by 200 m below and 1200 m above the glacier.
    pub fn new<G, C, S>(
        geometry: &G,
        climate: &C,
        store: &S,
        config: &MassBalanceConfig,
        period: ReferencePeriod,
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
        let record = climate.monthly_record()?.window(years.0, years.1)?;

        let domain =
            ElevationDomain::from_geometry(geometry, DomainPadding::EQUILIBRIUM, config.n_pixels)?;
        let temp_2d = record.temperature_on_heights(domain.heights())?;
        log::info!(
            "Built temperature-bias mass balance for [{}, {}] on {} elevations",
            years.0,
            years.1,
            domain.len()
        );

        Ok(Self {
            period,
            years,
            kernel: MassBalanceKernel::new(calibration.mu_star, config.thresholds()?),
            n_years: record.n_years(),
            heights: domain.into_heights(),
            temp_2d,
            prcp: record.prcp().to_owned(),
            bias,
            sec_in_year: config.sec_in_year,
            rho: config.rho,
            cache: InterpolantCache::new(),
        })
    }

    pub fn period(&self) -> ReferencePeriod {
        self.period
    }

    /// Inclusive year range of the climate used.
    pub fn years(&self) -> (i32, i32) {
        self.years
    }

    /// Elevations the balance is sampled at.
    pub fn heights(&self) -> ArrayView1<'_, FloatValue> {
        self.heights.view()
    }

    /// Temperature offset (K) corresponding to the current bias.
    pub fn temperature_offset(&self) -> FloatValue {
        temperature_offset(self.bias)
    }

    /// Number of bias values with a cached interpolant.
    pub fn cached_interpolants(&self) -> usize {
        self.cache.len()
    }

    /// Number of interpolants built so far.
    pub fn interpolant_builds(&self) -> usize {
        self.cache.builds()
    }

    /// Discard every cached interpolant.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

// TODO: the bias unit (negative hundredths of a degree) should become a plain temperature offset
fn temperature_offset(bias: FloatValue) -> FloatValue {
    -bias / 100.0
}

/// Mean annual balance on `heights` with the climate shifted by the bias.
fn build_interpolant(
    kernel: &MassBalanceKernel,
    heights: &Array1<FloatValue>,
    temp_2d: &Array2<FloatValue>,
    prcp: &Array1<FloatValue>,
    n_years: usize,
    bias: FloatValue,
) -> MBResult<LinearInterpolator> {
    let temp = temp_2d + temperature_offset(bias);
    let mb_annual = kernel.annual(temp.view(), prcp.view(), n_years)?;
    LinearInterpolator::new(heights.clone(), mb_annual)
}

#[typetag::serde]
impl MassBalanceModel for TemperatureBiasMassBalance {
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
        let Self {
            kernel,
            n_years,
            heights: domain,
            temp_2d,
            prcp,
            bias,
            sec_in_year,
            rho,
            cache,
            ..
        } = self;

        let interp = cache.get_or_try_insert_with(*bias, |bias| {
            build_interpolant(kernel, domain, temp_2d, prcp, *n_years, bias)
        })?;
        Ok(interp
            .evaluate(heights)
            .mapv(|mb| mb / *sec_in_year / *rho))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glacier_mb_core::calibration::Calibration;
    use glacier_mb_core::climate::ClimateRecord;
    use glacier_mb_core::config::{RHO_ICE, SEC_IN_YEAR};
    use is_close::is_close;
    use ndarray::array;

    /// 1980-2005 with a seasonal cycle of +-5 degC around 0 degC at 3000 m
    fn climate() -> ClimateRecord {
        let n = 26 * 12;
        let temp = Array1::from_iter(
            (0..n).map(|i| 5.0 * (2.0 * std::f64::consts::PI * (i % 12) as f64 / 12.0).cos()),
        );
        ClimateRecord::new(
            temp,
            Array1::from_elem(n, 80.0),
            Array1::from_elem(n, -0.0065),
            3000.0,
            2005,
        )
        .unwrap()
    }

    fn create_model(bias: FloatValue) -> TemperatureBiasMassBalance {
        TemperatureBiasMassBalance::new(
            &vec![2500.0, 3500.0],
            &climate(),
            &Calibration::new(8.0, 1990).unwrap(),
            &MassBalanceConfig {
                n_pixels: 300,
                ..Default::default()
            },
            ReferencePeriod::PresentDay,
            bias,
        )
        .unwrap()
    }

    #[test]
    fn construction() {
        let model = create_model(0.0);
        assert_eq!(model.years(), (1983, 2003));
        assert_eq!(model.heights().len(), 300);
        assert!(is_close!(model.heights()[0], 2300.0));
        assert_eq!(model.cached_interpolants(), 0);
    }

    #[test]
    fn offset_sign_convention() {
        let mut model = create_model(0.0);
        model.set_bias(100.0);
        assert!(is_close!(model.temperature_offset(), -1.0));
        model.set_bias(-50.0);
        assert!(is_close!(model.temperature_offset(), 0.5));
    }

    #[test]
    fn same_bias_is_served_from_cache() {
        let mut model = create_model(0.0);
        let heights = array![2600.0, 3000.0, 3400.0];

        let first = model.get_mb(heights.view(), None).unwrap();
        let second = model.get_mb(heights.view(), Some(2100.0)).unwrap();
        assert_eq!(first, second);
        assert_eq!(model.interpolant_builds(), 1);
        assert_eq!(model.cached_interpolants(), 1);
    }

    #[test]
    fn new_bias_adds_one_entry() {
        let mut model = create_model(0.0);
        let heights = array![2600.0, 3000.0, 3400.0];
        let reference = model.get_mb(heights.view(), None).unwrap();

        model.set_bias(100.0);
        let cooler = model.get_mb(heights.view(), None).unwrap();
        assert_eq!(model.cached_interpolants(), 2);
        // A positive bias cools the climate
        assert!(cooler.iter().zip(reference.iter()).all(|(c, r)| c > r));

        model.set_bias(0.0);
        let again = model.get_mb(heights.view(), None).unwrap();
        assert_eq!(again, reference);
        assert_eq!(model.interpolant_builds(), 2);
    }

    #[test]
    fn matches_kernel_at_domain_nodes() {
        let mut model = create_model(0.0);
        let node = model.heights()[120];
        let mb = model.get_mb(array![node].view(), None).unwrap();

        let record = climate().window(1983, 2003).unwrap();
        let temp_2d = record.temperature_on_heights(array![node].view()).unwrap();
        let annual = model
            .kernel
            .annual(temp_2d.view(), record.prcp(), record.n_years())
            .unwrap();
        assert!(is_close!(mb[0], annual[0] / SEC_IN_YEAR / RHO_ICE));
    }

    #[test]
    fn cache_is_not_serialised() {
        let mut model = create_model(0.0);
        model.get_mb(array![3000.0].view(), None).unwrap();
        let boxed: Box<dyn MassBalanceModel> = Box::new(model);

        let serialised = serde_json::to_string(&boxed).unwrap();
        let mut restored: Box<dyn MassBalanceModel> = serde_json::from_str(&serialised).unwrap();
        assert_eq!(restored.bias(), 0.0);
        assert!(restored.get_mb(array![3000.0].view(), None).is_ok());
    }

    #[test]
    fn restored_model_rejects_degenerate_thresholds() {
        let boxed: Box<dyn MassBalanceModel> = Box::new(create_model(0.0));
        let mut stored = serde_json::to_value(&boxed).unwrap();
        let solid = stored["kernel"]["thresholds"]["temp_all_solid"].clone();
        stored["kernel"]["thresholds"]["temp_all_liq"] = solid;
        assert!(serde_json::from_value::<Box<dyn MassBalanceModel>>(stored).is_err());
    }
}
