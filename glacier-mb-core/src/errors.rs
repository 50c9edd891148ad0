use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum MassBalanceError {
    #[error("{0}")]
    Error(String),
    #[error("Climate data should be N full years exclusively, got {months} months")]
    IncompleteYears { months: usize },
    #[error("Climate series `{name}` has {found} values, expected {expected}")]
    MismatchedSeries {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Climate record contains no data")]
    EmptyRecord,
    #[error("Year {year} is out of range. Available years: [{first}, {last}]")]
    YearOutOfRange { year: i32, first: i32, last: i32 },
    #[error("This mass-balance model varies in time and requires a year")]
    YearRequired,
    #[error("Invalid calibration record: {0}")]
    InvalidCalibration(String),
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("Invalid elevation domain: {0}")]
    InvalidDomain(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Convenience type for `Result<T, MassBalanceError>`.
pub type MBResult<T> = Result<T, MassBalanceError>;
