use thiserror::Error;

/// Broad category of a [`SoilwatError`].
///
/// Drivers running many independent columns use this to decide whether a
/// failure aborts one column or the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid setup values; detected before the first simulated day.
    Configuration,
    /// Weather or other daily input outside the accepted range, or missing.
    InputQuality,
    /// Soil state that a retention curve cannot convert.
    InvalidState,
    /// Numerical failure that could not be degraded to a per-day flag.
    Numerical,
}

/// Error type for invalid operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SoilwatError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid soil state in layer {layer}: {message}")]
    InvalidSoilState { layer: usize, message: String },
    #[error("Input quality error: {0}")]
    InputQuality(String),
    #[error("Missing weather on year {year}, day {doy}, and no weather generator is available")]
    MissingWeather { year: i32, doy: usize },
    #[error("{0} used before it was initialized")]
    NotInitialized(String),
    #[error("Numerical error: {0}")]
    Numerical(String),
}

impl SoilwatError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SoilwatError::Configuration(_) | SoilwatError::NotInitialized(_) => {
                ErrorKind::Configuration
            }
            SoilwatError::InputQuality(_) | SoilwatError::MissingWeather { .. } => {
                ErrorKind::InputQuality
            }
            SoilwatError::InvalidSoilState { .. } => ErrorKind::InvalidState,
            SoilwatError::Numerical(_) => ErrorKind::Numerical,
        }
    }

    pub(crate) fn invalid_state(layer: usize, message: impl Into<String>) -> Self {
        SoilwatError::InvalidSoilState {
            layer,
            message: message.into(),
        }
    }
}

/// Convenience type for `Result<T, SoilwatError>`.
pub type SoilwatResult<T> = Result<T, SoilwatError>;
