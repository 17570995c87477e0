//! Error types for the tween core

use serde::{Deserialize, Serialize};

/// Errors surfaced synchronously by constructors and listener registration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TweenError {
    /// Delay is negative or not a finite number of seconds
    #[error("The animation's delay must be a number greater than or equal to zero, got {value}")]
    InvalidDelay { value: f64 },

    /// Duration is negative or not a finite number of seconds
    #[error(
        "The animation's duration must be a number greater than or equal to zero, got {value}"
    )]
    InvalidDuration { value: f64 },

    /// Framerate is not a positive, finite number of frames per second
    #[error("The animation's framerate must be a number greater than zero, got {value}")]
    InvalidFramerate { value: f64 },

    /// Scheduler wake rate is below one millisecond
    #[error("The scheduler's rate must be a number of milliseconds greater than 0, got {value}")]
    InvalidRate { value: f64 },

    /// Listener registered for a name outside the event taxonomy
    #[error("The animation callback event \"{name}\" is not supported")]
    UnknownEvent { name: String },

    /// Settings could not be decoded
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl TweenError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidDelay { .. }
            | Self::InvalidDuration { .. }
            | Self::InvalidFramerate { .. }
            | Self::InvalidRate { .. } => "configuration",
            Self::UnknownEvent { .. } => "event",
            Self::SerializationError { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for TweenError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}

/// Accept a fixed, non-negative, finite number of seconds.
pub(crate) fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let config_error = TweenError::InvalidFramerate { value: 0.0 };
        assert_eq!(config_error.category(), "configuration");

        let event_error = TweenError::UnknownEvent {
            name: "finished".to_string(),
        };
        assert_eq!(event_error.category(), "event");
    }

    #[test]
    fn test_unknown_event_names_offender() {
        let error = TweenError::UnknownEvent {
            name: "finished".to_string(),
        };
        assert!(error.to_string().contains("\"finished\""));
    }

    #[test]
    fn test_serialization() {
        let error = TweenError::InvalidDelay { value: -1.0 };
        let serialized = serde_json::to_string(&error).unwrap();
        let deserialized: TweenError = serde_json::from_str(&serialized).unwrap();
        assert_eq!(error, deserialized);
    }

    #[test]
    fn test_non_negative() {
        assert!(non_negative(0.0));
        assert!(non_negative(2.5));
        assert!(!non_negative(-0.1));
        assert!(!non_negative(f64::NAN));
        assert!(!non_negative(f64::INFINITY));
    }
}
