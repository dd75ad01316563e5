use std::{fmt, io};

use machine_learning::MlErr;

/// The application's result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// All errors that can occur while running the housing pipeline.
#[derive(Debug)]
pub enum AppError {
    /// Invalid configuration, caught before any data is read.
    InvalidConfig(String),
    /// The CSV header has no column with this name.
    MissingColumn(String),
    /// A cell could not be read as a finite number.
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
    /// Training, evaluation or dataset construction failed.
    Ml(MlErr),
    Csv(csv::Error),
    Json(serde_json::Error),
    Io(io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::MissingColumn(name) => write!(f, "missing column {name:?}"),
            Self::InvalidValue { row, column, value } => {
                write!(f, "row {row}: column {column:?} has invalid value {value:?}")
            }
            Self::Ml(e) => write!(f, "{e}"),
            Self::Csv(e) => write!(f, "csv error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Ml(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MlErr> for AppError {
    fn from(e: MlErr) -> Self {
        Self::Ml(e)
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<io::Error> for AppError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
