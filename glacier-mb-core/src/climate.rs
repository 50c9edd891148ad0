//! Monthly climate records
//!
//! A [`ClimateRecord`] holds monthly air temperature, precipitation and
//! temperature gradient over a contiguous run of full (hydrological) years,
//! together with the elevation at which temperature and precipitation are valid.
//!
//! Records are read from a TOML file with one entry per month:
//!
//! ```toml
//! ref_hgt = 2500.0
//! time = [2001.75, 2001.833, ...]   # decimal years
//! temp = [...]                      # degC
//! prcp = [...]                      # kg m-2 month-1
//! grad = [...]                      # K m-1
//! ```
//!
//! The calendar year of each 12-month block is derived from the last time
//! stamp, so a hydrological year is named after the year it ends in.

use crate::errors::{MBResult, MassBalanceError};
use crate::kernel::{temperature_on_heights, MeltThresholds};
use crate::FloatValue;
use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Number of months in a year.
pub const MONTHS_PER_YEAR: usize = 12;

/// On-disk layout of a monthly climate file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawClimateRecord {
    ref_hgt: FloatValue,
    time: Vec<FloatValue>,
    temp: Vec<FloatValue>,
    prcp: Vec<FloatValue>,
    grad: Vec<FloatValue>,
}

/// Validated monthly climate series over full years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredClimateRecord")]
pub struct ClimateRecord {
    temp: Array1<FloatValue>,
    prcp: Array1<FloatValue>,
    grad: Array1<FloatValue>,
    /// Calendar year of each 12-month block
    years: Vec<i32>,
    ref_hgt: FloatValue,
}

/// A record as written by a serialised model, checked on the way back in.
#[derive(Deserialize)]
struct StoredClimateRecord {
    temp: Array1<FloatValue>,
    prcp: Array1<FloatValue>,
    grad: Array1<FloatValue>,
    years: Vec<i32>,
    ref_hgt: FloatValue,
}

impl TryFrom<StoredClimateRecord> for ClimateRecord {
    type Error = MassBalanceError;

    fn try_from(stored: StoredClimateRecord) -> MBResult<Self> {
        let last_year = stored
            .years
            .last()
            .copied()
            .ok_or(MassBalanceError::EmptyRecord)?;
        let record = Self::new(
            stored.temp,
            stored.prcp,
            stored.grad,
            stored.ref_hgt,
            last_year,
        )?;
        if record.years != stored.years {
            return Err(MassBalanceError::Error(format!(
                "Block years {:?} do not match {} months of climate",
                stored.years,
                record.n_months()
            )));
        }
        Ok(record)
    }
}

impl ClimateRecord {
    /// Create a record whose last 12-month block belongs to `last_year`.
    ///
    /// Fails if the series differ in length, are empty, or do not cover an
    /// exact number of years.
    pub fn new(
        temp: Array1<FloatValue>,
        prcp: Array1<FloatValue>,
        grad: Array1<FloatValue>,
        ref_hgt: FloatValue,
        last_year: i32,
    ) -> MBResult<Self> {
        let n_months = temp.len();
        if n_months == 0 {
            return Err(MassBalanceError::EmptyRecord);
        }
        check_length("prcp", n_months, prcp.len())?;
        check_length("grad", n_months, grad.len())?;

        let (n_years, remainder) = (n_months / MONTHS_PER_YEAR, n_months % MONTHS_PER_YEAR);
        if remainder != 0 {
            return Err(MassBalanceError::IncompleteYears { months: n_months });
        }
        let first_year = last_year - n_years as i32 + 1;
        let years = (first_year..=last_year).collect();

        Ok(Self {
            temp,
            prcp,
            grad,
            years,
            ref_hgt,
        })
    }

    /// Parse a record from a TOML document.
    pub fn from_toml_str(content: &str) -> MBResult<Self> {
        let raw: RawClimateRecord = toml::from_str(content)?;
        check_length("time", raw.temp.len(), raw.time.len())?;
        let last_time = raw.time.last().copied().ok_or(MassBalanceError::EmptyRecord)?;

        Self::new(
            Array1::from(raw.temp),
            Array1::from(raw.prcp),
            Array1::from(raw.grad),
            raw.ref_hgt,
            last_time.floor() as i32,
        )
    }

    /// Read a record from a TOML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> MBResult<Self> {
        let path = path.as_ref();
        log::debug!("Reading monthly climate from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn temp(&self) -> ArrayView1<'_, FloatValue> {
        self.temp.view()
    }

    pub fn prcp(&self) -> ArrayView1<'_, FloatValue> {
        self.prcp.view()
    }

    pub fn grad(&self) -> ArrayView1<'_, FloatValue> {
        self.grad.view()
    }

    /// Elevation at which `temp` and `prcp` are valid (m).
    pub fn ref_hgt(&self) -> FloatValue {
        self.ref_hgt
    }

    /// Calendar year of each 12-month block.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn n_years(&self) -> usize {
        self.years.len()
    }

    pub fn n_months(&self) -> usize {
        self.temp.len()
    }

    pub fn first_year(&self) -> i32 {
        self.years[0]
    }

    pub fn last_year(&self) -> i32 {
        self.years[self.years.len() - 1]
    }

    /// Index of the 12-month block belonging to `year`.
    pub fn block_index(&self, year: i32) -> MBResult<usize> {
        self.years
            .iter()
            .position(|&y| y == year)
            .ok_or_else(|| MassBalanceError::YearOutOfRange {
                year,
                first: self.first_year(),
                last: self.last_year(),
            })
    }

    /// Sub-record covering the years `first..=last`.
    pub fn window(&self, first: i32, last: i32) -> MBResult<Self> {
        let p0 = self.block_index(first)?;
        let p1 = self.block_index(last)?;
        if p1 < p0 {
            return Err(MassBalanceError::Error(format!(
                "Invalid year range [{}, {}]",
                first, last
            )));
        }
        let months = p0 * MONTHS_PER_YEAR..(p1 + 1) * MONTHS_PER_YEAR;
        log::debug!("Selected climate window [{}, {}]", first, last);

        Ok(Self {
            temp: self.temp.slice(s![months.clone()]).to_owned(),
            prcp: self.prcp.slice(s![months.clone()]).to_owned(),
            grad: self.grad.slice(s![months]).to_owned(),
            years: self.years[p0..=p1].to_vec(),
            ref_hgt: self.ref_hgt,
        })
    }

    /// Sub-record for a single year.
    pub fn year(&self, year: i32) -> MBResult<Self> {
        self.window(year, year)
    }

    /// Monthly temperature extrapolated to `heights`, shaped `[n_heights, n_months]`.
    pub fn temperature_on_heights(
        &self,
        heights: ArrayView1<'_, FloatValue>,
    ) -> MBResult<Array2<FloatValue>> {
        temperature_on_heights(self.temp.view(), self.grad.view(), self.ref_hgt, heights)
    }

    /// Annual melt forcing and solid precipitation at each elevation, for
    /// every year of the record.
    pub fn annual_climate_on_heights(
        &self,
        heights: ArrayView1<'_, FloatValue>,
        thresholds: &MeltThresholds,
    ) -> MBResult<YearlyClimate> {
        let temp2d = self.temperature_on_heights(heights)?;
        let shape = (heights.len(), self.n_years());

        let melt = temp2d.mapv(|t| thresholds.melt_term(t));
        let mut solid = temp2d.mapv(|t| thresholds.solid_fraction(t));
        solid *= &self.prcp;

        let annual_sum = |monthly: &Array2<FloatValue>| {
            Array2::from_shape_fn(shape, |(h, y)| {
                monthly
                    .slice(s![h, y * MONTHS_PER_YEAR..(y + 1) * MONTHS_PER_YEAR])
                    .sum()
            })
        };

        Ok(YearlyClimate {
            years: self.years.clone(),
            temp: annual_sum(&melt),
            prcp: annual_sum(&solid),
        })
    }
}

fn check_length(name: &str, expected: usize, found: usize) -> MBResult<()> {
    if expected != found {
        return Err(MassBalanceError::MismatchedSeries {
            name: name.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

/// Annual climate on a set of elevations.
///
/// Arrays are shaped `[n_heights, n_years]`.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyClimate {
    pub years: Vec<i32>,
    /// Annual sum of temperature above the melt threshold
    pub temp: Array2<FloatValue>,
    /// Annual sum of solid precipitation
    pub prcp: Array2<FloatValue>,
}

impl YearlyClimate {
    /// Per-elevation means over all years, as `(temp, prcp)`.
    pub fn mean_over_years(&self) -> MBResult<(Array1<FloatValue>, Array1<FloatValue>)> {
        let temp = self.temp.mean_axis(Axis(1));
        let prcp = self.prcp.mean_axis(Axis(1));
        temp.zip(prcp).ok_or(MassBalanceError::EmptyRecord)
    }
}

/// Source of monthly climate data.
pub trait ClimateProvider {
    /// The full monthly record.
    fn monthly_record(&self) -> MBResult<ClimateRecord>;

    /// Annual melt forcing and solid precipitation on `heights` for the
    /// inclusive `year_range`.
    fn yearly_climate_on_heights(
        &self,
        heights: ArrayView1<'_, FloatValue>,
        year_range: (i32, i32),
        thresholds: &MeltThresholds,
    ) -> MBResult<YearlyClimate> {
        self.monthly_record()?
            .window(year_range.0, year_range.1)?
            .annual_climate_on_heights(heights, thresholds)
    }
}

impl ClimateProvider for ClimateRecord {
    fn monthly_record(&self) -> MBResult<ClimateRecord> {
        Ok(self.clone())
    }

    fn yearly_climate_on_heights(
        &self,
        heights: ArrayView1<'_, FloatValue>,
        year_range: (i32, i32),
        thresholds: &MeltThresholds,
    ) -> MBResult<YearlyClimate> {
        self.window(year_range.0, year_range.1)?
            .annual_climate_on_heights(heights, thresholds)
    }
}

/// A monthly climate file, read on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClimateFile {
    path: PathBuf,
}

impl ClimateFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ClimateProvider for ClimateFile {
    fn monthly_record(&self) -> MBResult<ClimateRecord> {
        ClimateRecord::from_path(&self.path)
    }
}
