use std::fmt;

use logger::LoggerError;

/// Represents errors that can occur in the flight simulator.
#[derive(Debug)]
pub enum SimError {
    InvalidInput,
    InvalidAcceleration(f64), // Non-positive or non-finite acceleration factor
    InvalidConfig(String),    // Bad key or value in the configuration file
    Dataset(String),          // Dataset could not be loaded
    EmptyDataset,             // The dataset has no flights
    Csv(csv::Error),
    Io(std::io::Error),
    Logger(LoggerError),
    FlightNotFound(usize),
    AirportNotFound(usize),
    EngineLockError(String),      // The shared engine mutex was poisoned
    FrameTimerStartError(String), // The frame thread could not be spawned
    Other(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidInput => {
                write!(f, "Invalid input. Please check your input and try again.")
            }
            SimError::InvalidAcceleration(factor) => write!(
                f,
                "Invalid acceleration: {} (must be a finite value greater than zero)",
                factor
            ),
            SimError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            SimError::Dataset(msg) => write!(f, "Dataset error: {}", msg),
            SimError::EmptyDataset => write!(f, "The dataset contains no flights"),
            SimError::Csv(e) => write!(f, "CSV error: {}", e),
            SimError::Io(e) => write!(f, "I/O error: {}", e),
            SimError::Logger(e) => write!(f, "Logger error: {}", e),
            SimError::FlightNotFound(id) => write!(f, "Flight not found: #{}", id),
            SimError::AirportNotFound(id) => write!(f, "Airport not found: #{}", id),
            SimError::EngineLockError(msg) => write!(f, "Engine lock error: {}", msg),
            SimError::FrameTimerStartError(msg) => write!(f, "Frame timer start error: {}", msg),
            SimError::Other(message) => write!(f, "Error: {}", message),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Csv(e) => Some(e),
            SimError::Io(e) => Some(e),
            SimError::Logger(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for SimError {
    fn from(err: csv::Error) -> Self {
        SimError::Csv(err)
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::Io(err)
    }
}

impl From<LoggerError> for SimError {
    fn from(err: LoggerError) -> Self {
        SimError::Logger(err)
    }
}
