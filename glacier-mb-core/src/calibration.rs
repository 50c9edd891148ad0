//! Calibrated temperature sensitivity
//!
//! Every climate-driven model needs the glacier's calibrated temperature
//! sensitivity `mu_star` and, for the equilibrium models, the reference year
//! `t_star`. They are stored as a single-row CSV record:
//!
//! ```text
//! rgi_id,t_star,mu_star,bias
//! RGI50-11.00897,1927,185.4,-12.3
//! ```
//!
//! Only the `mu_star` and `t_star` columns are read.

use crate::errors::{MBResult, MassBalanceError};
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};

/// File name of the calibration record inside a glacier directory.
pub const LOCAL_MUSTAR_FILE: &str = "local_mustar.csv";

/// Calibrated parameters of a single glacier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Temperature sensitivity (mm w.e. K-1 month-1)
    pub mu_star: FloatValue,
    /// Centre year of the calibration climate period
    pub t_star: i32,
}

impl Calibration {
    pub fn new(mu_star: FloatValue, t_star: i32) -> MBResult<Self> {
        if !mu_star.is_finite() {
            return Err(MassBalanceError::InvalidCalibration(format!(
                "mu_star must be finite, got {}",
                mu_star
            )));
        }
        Ok(Self { mu_star, t_star })
    }

    /// Parse a single-row calibration record from CSV.
    pub fn from_csv_reader<R: Read>(reader: R) -> MBResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let rows = reader
            .deserialize::<Calibration>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| MassBalanceError::InvalidCalibration(e.to_string()))?;

        match rows.as_slice() {
            [row] => Self::new(row.mu_star, row.t_star),
            [] => Err(MassBalanceError::InvalidCalibration(
                "record contains no rows".to_string(),
            )),
            _ => Err(MassBalanceError::InvalidCalibration(format!(
                "expected a single row, found {}",
                rows.len()
            ))),
        }
    }

    /// The climate window `[t_star - halfperiod, t_star + halfperiod]`.
    pub fn reference_window(&self, halfperiod: i32) -> (i32, i32) {
        reference_window(self.t_star, halfperiod)
    }
}

/// Symmetric window of years centred on `t_star`.
pub fn reference_window(t_star: i32, halfperiod: i32) -> (i32, i32) {
    (t_star - halfperiod, t_star + halfperiod)
}

/// Source of calibrated glacier parameters.
pub trait CalibrationStore {
    fn calibration(&self) -> MBResult<Calibration>;
}

impl CalibrationStore for Calibration {
    fn calibration(&self) -> MBResult<Calibration> {
        Ok(*self)
    }
}

/// Calibration record stored as a CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvCalibrationStore {
    path: PathBuf,
}

impl CsvCalibrationStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Store for the glacier `glacier_id` inside a directory of glacier directories.
    pub fn for_glacier<P: AsRef<Path>>(root: P, glacier_id: &str) -> Self {
        Self::new(root.as_ref().join(glacier_id).join(LOCAL_MUSTAR_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CalibrationStore for CsvCalibrationStore {
    fn calibration(&self) -> MBResult<Calibration> {
        log::debug!("Reading calibration from {}", self.path.display());
        let file = std::fs::File::open(&self.path)?;
        Calibration::from_csv_reader(file)
    }
}
