//! Error types for ambient lighting

use milight_control::ControlError;
use thiserror::Error;

/// Errors from sampling the screen or driving the lights
#[derive(Error, Debug)]
pub enum AmbientError {
    #[error("Screen capture failed: {0}")]
    Capture(String),

    #[error("Light control failed: {0}")]
    Control(#[from] ControlError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("No monitor found: {0}")]
    NoMonitor(String),

    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),

    #[error("Ambient worker failed: {0}")]
    Worker(String),
}

/// Result type for ambient operations
pub type Result<T> = std::result::Result<T, AmbientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_error_converts() {
        let err: AmbientError = ControlError::InvalidGroup(7).into();
        assert!(matches!(err, AmbientError::Control(ControlError::InvalidGroup(7))));
        assert_eq!(err.to_string(), format!("Light control failed: {}", ControlError::InvalidGroup(7)));
    }

    #[test]
    fn test_messages() {
        let err = AmbientError::FeatureNotEnabled("screen-capture".to_string());
        assert_eq!(err.to_string(), "Feature not enabled: screen-capture");
    }
}
