//! Behavioural tests shared by the mass-balance models.
//!
//! These tests drive the models only through the `MassBalanceModel` interface and
//! the file-backed collaborators.

use approx::assert_relative_eq;
use glacier_mb_components::components::{
    ConstantGradientMassBalance, ConstantGradientParameters, EquilibriumMassBalance,
    HistoricalMassBalance, ReferencePeriod, TemperatureBiasMassBalance,
};
use glacier_mb_core::calibration::{Calibration, CsvCalibrationStore, LOCAL_MUSTAR_FILE};
use glacier_mb_core::climate::{ClimateFile, ClimateRecord};
use glacier_mb_core::config::{MassBalanceConfig, RHO_ICE, SEC_IN_YEAR};
use glacier_mb_core::elevation::Flowline;
use glacier_mb_core::model::MassBalanceModel;
use glacier_mb_core::FloatValue;
use ndarray::{array, Array1};

/// Monthly climate for 1950-2010 with a seasonal cycle at 2800 m.
fn seasonal_climate() -> ClimateRecord {
    let n_years = 61;
    let n = n_years * 12;
    let temp = Array1::from_iter((0..n).map(|i| {
        let month = (i % 12) as FloatValue;
        let year = (i / 12) as FloatValue;
        // Warm summers in the middle of the hydrological year and a small trend
        -2.0 + 8.0 * (std::f64::consts::PI * month / 11.0).sin() + 0.01 * year
    }));
    let prcp = Array1::from_iter((0..n).map(|i| 60.0 + 20.0 * ((i % 12) as FloatValue / 11.0)));
    ClimateRecord::new(temp, prcp, Array1::from_elem(n, -0.0065), 2800.0, 2010).unwrap()
}

fn flowlines() -> Vec<Flowline> {
    vec![
        Flowline::new(Array1::linspace(3400.0, 2600.0, 40)),
        Flowline::new(Array1::linspace(3100.0, 2900.0, 10)),
    ]
}

fn calibration() -> Calibration {
    Calibration::new(7.5, 1975).unwrap()
}

fn config() -> MassBalanceConfig {
    MassBalanceConfig {
        n_pixels: 400,
        ..Default::default()
    }
}

fn is_non_decreasing(values: &Array1<FloatValue>) -> bool {
    values
        .iter()
        .zip(values.iter().skip(1))
        .all(|(a, b)| b >= a)
}

mod constant_gradient {
    use super::*;

    #[test]
    fn balance_at_ela_is_bias() {
        let mut model = ConstantGradientMassBalance::from_parameters(ConstantGradientParameters {
            ela_h: 2900.0,
            grad: 7.0,
        });
        model.set_bias(-300.0);
        let mb = model.get_mb(array![2900.0].view(), None).unwrap();
        assert_relative_eq!(mb[0], -300.0 / SEC_IN_YEAR / 1000.0);
    }

    #[test]
    fn toml_roundtrip() {
        let mut model: Box<dyn MassBalanceModel> = Box::new(
            ConstantGradientMassBalance::from_parameters(ConstantGradientParameters::new(3000.0)),
        );
        model.set_bias(12.0);

        let serialised = toml::to_string(&model).unwrap();
        let mut restored = toml::from_str::<Box<dyn MassBalanceModel>>(&serialised).unwrap();
        assert_eq!(restored.bias(), 12.0);

        let heights = array![2500.0, 3500.0];
        assert_eq!(
            restored.get_mb(heights.view(), None).unwrap(),
            model.get_mb(heights.view(), None).unwrap()
        );
    }
}

mod equilibrium {
    use super::*;

    #[test]
    fn non_decreasing_with_elevation() {
        for mut model in [
            EquilibriumMassBalance::from_t_star(
                &flowlines(),
                &seasonal_climate(),
                &calibration(),
                &config(),
                0.0,
            )
            .unwrap(),
            EquilibriumMassBalance::from_present_day(
                &flowlines(),
                &seasonal_climate(),
                &calibration(),
                &config(),
                0.0,
            )
            .unwrap(),
        ] {
            let heights = Array1::linspace(2000.0, 5000.0, 301);
            let mb = model.get_mb(heights.view(), None).unwrap();
            assert!(is_non_decreasing(&mb));
            assert!(mb[0] < 0.0);
        }
    }

    #[test]
    fn bias_shifts_uniformly() {
        let mut model = EquilibriumMassBalance::from_t_star(
            &flowlines(),
            &seasonal_climate(),
            &calibration(),
            &config(),
            0.0,
        )
        .unwrap();
        let heights = array![2700.0, 3000.0, 3300.0];
        let reference = model.get_mb(heights.view(), None).unwrap();

        model.set_bias(500.0);
        let shifted = model.get_mb(heights.view(), None).unwrap();
        for (s, r) in shifted.iter().zip(reference.iter()) {
            assert_relative_eq!(s - r, 500.0 / SEC_IN_YEAR / RHO_ICE, max_relative = 1e-9);
        }
    }

    #[test]
    fn extrapolates_beyond_domain() {
        let mut model = EquilibriumMassBalance::from_present_day(
            &flowlines(),
            &seasonal_climate(),
            &calibration(),
            &config(),
            0.0,
        )
        .unwrap();
        // The present-day domain ends at 3600 m
        let mb = model.get_mb(array![1000.0, 6000.0].view(), None).unwrap();
        assert!(mb.iter().all(|v| v.is_finite()));
    }
}

mod temperature_bias {
    use super::*;

    fn create_model(period: ReferencePeriod) -> TemperatureBiasMassBalance {
        TemperatureBiasMassBalance::new(
            &flowlines(),
            &seasonal_climate(),
            &calibration(),
            &config(),
            period,
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn repeated_bias_is_bit_identical() {
        let mut model = create_model(ReferencePeriod::TStar);
        let heights = Array1::linspace(2500.0, 3500.0, 11);

        let biases = [0.0, 50.0, -50.0, 50.0, 0.0];
        let mut first_seen = Vec::new();
        for (i, bias) in biases.iter().enumerate() {
            model.set_bias(*bias);
            let mb = model.get_mb(heights.view(), None).unwrap();
            if let Some(j) = biases[..i].iter().position(|b| b == bias) {
                assert_eq!(mb, first_seen[j]);
            }
            first_seen.push(mb);
        }
        assert_eq!(model.cached_interpolants(), 3);
        assert_eq!(model.interpolant_builds(), 3);
    }

    #[test]
    fn non_decreasing_with_elevation() {
        for period in [ReferencePeriod::TStar, ReferencePeriod::PresentDay] {
            let mut model = create_model(period);
            for bias in [-100.0, 0.0, 150.0] {
                model.set_bias(bias);
                let heights = Array1::linspace(2300.0, 4600.0, 200);
                let mb = model.get_mb(heights.view(), None).unwrap();
                assert!(is_non_decreasing(&mb));
            }
        }
    }

    #[test]
    fn warming_lowers_balance() {
        let mut model = create_model(ReferencePeriod::PresentDay);
        let heights = array![2700.0];
        let reference = model.get_mb(heights.view(), None).unwrap();
        // Negative bias means a warmer climate
        model.set_bias(-200.0);
        let warmer = model.get_mb(heights.view(), None).unwrap();
        assert!(warmer[0] < reference[0]);
    }
}

mod historical {
    use super::*;

    #[test]
    fn each_year_in_range() {
        let mut model =
            HistoricalMassBalance::new(&seasonal_climate(), &calibration(), &config()).unwrap();
        let heights = array![2600.0, 3000.0, 3400.0];
        for year in 1950..=2010 {
            let mb = model.get_mb(heights.view(), Some(year as FloatValue + 0.5)).unwrap();
            assert!(is_non_decreasing(&mb));
        }
        assert!(model.get_mb(heights.view(), Some(1949.0)).is_err());
        assert!(model.get_mb(heights.view(), Some(2011.0)).is_err());
    }

    #[test]
    fn years_differ_with_climate_trend() {
        let mut model =
            HistoricalMassBalance::new(&seasonal_climate(), &calibration(), &config()).unwrap();
        let heights = array![2800.0];
        let early = model.get_mb(heights.view(), Some(1950.0)).unwrap();
        let late = model.get_mb(heights.view(), Some(2010.0)).unwrap();
        assert!(late[0] < early[0]);
    }
}

mod scenario {
    use super::*;

    /// Constant 2 degC, 100 mm per month, no gradient, mu* = 5.
    #[test]
    fn warm_constant_climate() {
        let n = 12 * 25;
        let record = ClimateRecord::new(
            Array1::from_elem(n, 2.0),
            Array1::from_elem(n, 100.0),
            Array1::zeros(n),
            3000.0,
            2005,
        )
        .unwrap();
        let config = MassBalanceConfig {
            temp_all_solid: -1.0,
            temp_all_liq: 1.0,
            temp_melt: 0.0,
            n_pixels: 50,
            ..Default::default()
        };
        let calibration = Calibration::new(5.0, 1995).unwrap();
        let heights = array![2800.0, 3000.0, 3200.0];
        let expected = -120.0 / SEC_IN_YEAR / RHO_ICE;

        let mut models: Vec<Box<dyn MassBalanceModel>> = vec![
            Box::new(HistoricalMassBalance::new(&record, &calibration, &config).unwrap()),
            Box::new(
                TemperatureBiasMassBalance::new(
                    &vec![2900.0, 3100.0],
                    &record,
                    &calibration,
                    &config,
                    ReferencePeriod::PresentDay,
                    0.0,
                )
                .unwrap(),
            ),
            Box::new(
                EquilibriumMassBalance::from_present_day(
                    &vec![2900.0, 3100.0],
                    &record,
                    &calibration,
                    &config,
                    0.0,
                )
                .unwrap(),
            ),
        ];

        for model in models.iter_mut() {
            let mb = model.get_mb(heights.view(), Some(1990.0)).unwrap();
            for value in mb.iter() {
                assert_relative_eq!(*value, expected, max_relative = 1e-12);
            }
        }
    }
}

mod files {
    use super::*;
    use tempfile::tempdir;

    fn toml_array(values: impl Iterator<Item = FloatValue>) -> String {
        let items: Vec<String> = values.map(|v| format!("{:?}", v)).collect();
        format!("[{}]", items.join(", "))
    }

    #[test]
    fn models_from_glacier_directory() {
        let dir = tempdir().unwrap();
        let glacier_dir = dir.path().join("RGI60-11.00897");
        std::fs::create_dir_all(&glacier_dir).unwrap();
        std::fs::write(
            glacier_dir.join(LOCAL_MUSTAR_FILE),
            "rgi_id,t_star,mu_star\nRGI60-11.00897,1975,7.5\n",
        )
        .unwrap();

        let record = seasonal_climate();
        let time = (0..record.n_months()).map(|i| 1949.75 + i as FloatValue / 12.0);
        let content = format!(
            "ref_hgt = 2800.0\ntime = {}\ntemp = {}\nprcp = {}\ngrad = {}\n",
            toml_array(time),
            toml_array(record.temp().iter().copied()),
            toml_array(record.prcp().iter().copied()),
            toml_array(record.grad().iter().copied()),
        );
        let climate_path = glacier_dir.join("climate_monthly.toml");
        std::fs::write(&climate_path, content).unwrap();

        let store = CsvCalibrationStore::for_glacier(dir.path(), "RGI60-11.00897");
        let climate = ClimateFile::new(&climate_path);

        let mut from_files =
            EquilibriumMassBalance::from_t_star(&flowlines(), &climate, &store, &config(), 0.0)
                .unwrap();
        let mut in_memory = EquilibriumMassBalance::from_t_star(
            &flowlines(),
            &seasonal_climate(),
            &calibration(),
            &config(),
            0.0,
        )
        .unwrap();

        assert_eq!(from_files.years(), (1960, 1990));
        let heights = array![2700.0, 3100.0];
        let a = from_files.get_mb(heights.view(), None).unwrap();
        let b = in_memory.get_mb(heights.view(), None).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(*x, *y, max_relative = 1e-12);
        }

        let historical = HistoricalMassBalance::new(&climate, &store, &config()).unwrap();
        assert_eq!(historical.years().first(), Some(&1950));
        assert_eq!(historical.years().last(), Some(&2010));
    }
}
