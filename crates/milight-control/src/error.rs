//! Error types for the control system
use thiserror::Error;

/// Control system errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Group argument outside 0..=4
    #[error("Invalid group: {0} (must be between 0 and 4)")]
    InvalidGroup(i64),

    /// Socket creation or transmission failure
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Receiver address could not be parsed or resolved
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Color text could not be parsed
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
