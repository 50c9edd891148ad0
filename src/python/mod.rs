use glacier_mb_components::components::{
    ConstantGradientMassBalance, ConstantGradientParameters, EquilibriumMassBalance,
    HistoricalMassBalance, ReferencePeriod, TemperatureBiasMassBalance,
};
use glacier_mb_core::calibration::CsvCalibrationStore;
use glacier_mb_core::climate::ClimateFile;
use glacier_mb_core::config::MassBalanceConfig;
use glacier_mb_core::errors::MassBalanceError;
use glacier_mb_core::model::MassBalanceModel;
use glacier_mb_core::FloatValue;
use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pythonize::depythonize_bound;
use std::path::PathBuf;

fn to_py_err(err: MassBalanceError) -> PyErr {
    match err {
        MassBalanceError::Io(e) => PyIOError::new_err(e.to_string()),
        e => PyValueError::new_err(e.to_string()),
    }
}

/// Parse an optional dict of configuration overrides.
fn parse_config(config: Option<&Bound<'_, PyAny>>) -> PyResult<MassBalanceConfig> {
    let config = match config {
        Some(obj) => depythonize_bound::<MassBalanceConfig>(obj.clone())?,
        None => MassBalanceConfig::default(),
    };
    config.validate().map_err(to_py_err)?;
    Ok(config)
}

/// Python wrapper around any mass-balance model
///
/// Example:
///     mb = MassBalanceModel.temperature_bias(
///         surface_heights, "climate_monthly.toml", "local_mustar.csv"
///     )
///     mb.set_bias(-50.0)
///     rates = mb.get_mb(heights)
#[pyclass]
#[pyo3(name = "MassBalanceModel")]
#[derive(Debug)]
pub struct PyMassBalanceModel(pub Box<dyn MassBalanceModel>);

#[pymethods]
impl PyMassBalanceModel {
    /// Linear mass-balance profile around an equilibrium line altitude
    #[staticmethod]
    #[pyo3(signature = (ela_h, grad=3.0, bias=0.0))]
    fn constant_gradient(ela_h: FloatValue, grad: FloatValue, bias: FloatValue) -> Self {
        let mut model =
            ConstantGradientMassBalance::from_parameters(ConstantGradientParameters { ela_h, grad });
        model.set_bias(bias);
        Self(Box::new(model))
    }

    /// Equilibrium mass balance of the t* calibration period
    #[staticmethod]
    #[pyo3(signature = (surface_heights, climate_path, mustar_path, config=None, bias=0.0))]
    fn t_star(
        surface_heights: Vec<FloatValue>,
        climate_path: PathBuf,
        mustar_path: PathBuf,
        config: Option<&Bound<'_, PyAny>>,
        bias: FloatValue,
    ) -> PyResult<Self> {
        let model = EquilibriumMassBalance::from_t_star(
            &surface_heights,
            &ClimateFile::new(climate_path),
            &CsvCalibrationStore::new(mustar_path),
            &parse_config(config)?,
            bias,
        )
        .map_err(to_py_err)?;
        Ok(Self(Box::new(model)))
    }

    /// Equilibrium mass balance of the present-day period
    #[staticmethod]
    #[pyo3(signature = (surface_heights, climate_path, mustar_path, config=None, bias=0.0))]
    fn present_day(
        surface_heights: Vec<FloatValue>,
        climate_path: PathBuf,
        mustar_path: PathBuf,
        config: Option<&Bound<'_, PyAny>>,
        bias: FloatValue,
    ) -> PyResult<Self> {
        let model = EquilibriumMassBalance::from_present_day(
            &surface_heights,
            &ClimateFile::new(climate_path),
            &CsvCalibrationStore::new(mustar_path),
            &parse_config(config)?,
            bias,
        )
        .map_err(to_py_err)?;
        Ok(Self(Box::new(model)))
    }

    /// Reference-period mass balance with a temperature bias
    #[staticmethod]
    #[pyo3(signature = (surface_heights, climate_path, mustar_path, use_tstar=false, config=None, bias=0.0))]
    fn temperature_bias(
        surface_heights: Vec<FloatValue>,
        climate_path: PathBuf,
        mustar_path: PathBuf,
        use_tstar: bool,
        config: Option<&Bound<'_, PyAny>>,
        bias: FloatValue,
    ) -> PyResult<Self> {
        let period = if use_tstar {
            ReferencePeriod::TStar
        } else {
            ReferencePeriod::PresentDay
        };
        let model = TemperatureBiasMassBalance::new(
            &surface_heights,
            &ClimateFile::new(climate_path),
            &CsvCalibrationStore::new(mustar_path),
            &parse_config(config)?,
            period,
            bias,
        )
        .map_err(to_py_err)?;
        Ok(Self(Box::new(model)))
    }

    /// Year-by-year mass balance over the full climate record
    #[staticmethod]
    #[pyo3(signature = (climate_path, mustar_path, config=None))]
    fn historical(
        climate_path: PathBuf,
        mustar_path: PathBuf,
        config: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<Self> {
        let model = HistoricalMassBalance::new(
            &ClimateFile::new(climate_path),
            &CsvCalibrationStore::new(mustar_path),
            &parse_config(config)?,
        )
        .map_err(to_py_err)?;
        Ok(Self(Box::new(model)))
    }

    /// Restore a model saved with `to_toml`
    #[staticmethod]
    fn from_toml(content: &str) -> PyResult<Self> {
        toml::from_str::<Box<dyn MassBalanceModel>>(content)
            .map(Self)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn to_toml(&self) -> PyResult<String> {
        toml::to_string(&self.0).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn set_bias(&mut self, bias: FloatValue) {
        self.0.set_bias(bias);
    }

    #[getter]
    fn bias(&self) -> FloatValue {
        self.0.bias()
    }

    /// Mass-balance rate (m ice s-1) at each elevation
    #[pyo3(signature = (heights, year=None))]
    fn get_mb<'py>(
        &mut self,
        py: Python<'py>,
        heights: PyReadonlyArray1<'py, FloatValue>,
        year: Option<FloatValue>,
    ) -> PyResult<Bound<'py, PyArray1<FloatValue>>> {
        let mb = self
            .0
            .get_mb(heights.as_array(), year)
            .map_err(to_py_err)?;
        Ok(mb.into_pyarray_bound(py))
    }

    fn __repr__(&self) -> String {
        format!("<MassBalanceModel bias={}>", self.0.bias())
    }
}

#[pymodule]
#[pyo3(name = "_lib")]
fn glacier_mb(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_class::<PyMassBalanceModel>()?;
    Ok(())
}
