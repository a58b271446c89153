//! Error handling for SlideKit
//!
//! The interactive measurement operations never fail loudly: policy
//! rejections and invalid interactions are reported as `false` plus a log
//! line. The types here cover the outer surfaces instead:
//! - Measurement errors (finalizing an active measurement into a record)
//! - Calibration errors (adapting tile-server metadata)
//! - Serialization and I/O (export/import)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Measurement error type
///
/// Raised when an active measurement cannot be turned into a persisted
/// record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    /// No slide is loaded in the session
    #[error("No slide loaded")]
    NoSlideLoaded,

    /// Measuring is blocked by the calibration policy
    #[error("Measurement blocked: {reason}")]
    Blocked {
        /// The human-readable block reason.
        reason: String,
    },

    /// There is no in-progress measurement
    #[error("No active measurement")]
    NoActiveMeasurement,

    /// The active measurement has not been completed yet
    #[error("{kind} measurement is not complete")]
    Incomplete {
        /// The measurement type name.
        kind: String,
    },

    /// Not enough points to form the requested shape
    #[error("{kind} measurement needs at least {required} points, got {actual}")]
    InsufficientPoints {
        /// The measurement type name.
        kind: String,
        /// Minimum number of points for this shape.
        required: usize,
        /// Number of points actually collected.
        actual: usize,
    },

    /// Unrecognised measurement type name
    #[error("Unknown measurement type: {0}")]
    UnknownType(String),

    /// Unrecognised measurement unit name
    #[error("Unknown measurement unit: {0}")]
    UnknownUnit(String),

    /// Geometry could not be interpreted
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry {
        /// The reason the geometry is invalid.
        reason: String,
    },
}

/// Calibration error type
///
/// Represents metadata that cannot be turned into a usable scale.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Pixel size is zero, negative or not a number
    #[error("Invalid pixel size on {axis} axis: {value}")]
    InvalidPixelSize {
        /// The axis ("x" or "y").
        axis: String,
        /// The rejected value in millimetres per pixel.
        value: f64,
    },

    /// Objective magnification is zero, negative or not a number
    #[error("Invalid magnification: {value}")]
    InvalidMagnification {
        /// The rejected magnification.
        value: f64,
    },

    /// Unrecognised calibration state string
    #[error("Unknown calibration state: {0}")]
    UnknownState(String),
}

/// Main error type for SlideKit
#[derive(Error, Debug)]
pub enum Error {
    /// Measurement error
    #[error(transparent)]
    Measurement(#[from] MeasurementError),

    /// Calibration error
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error comes from the calibration blocking policy
    pub fn is_blocked(&self) -> bool {
        matches!(self, Error::Measurement(MeasurementError::Blocked { .. }))
    }

    /// Check if this is a measurement error
    pub fn is_measurement_error(&self) -> bool {
        matches!(self, Error::Measurement(_))
    }

    /// Check if this is a calibration error
    pub fn is_calibration_error(&self) -> bool {
        matches!(self, Error::Calibration(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_error_display() {
        let err = MeasurementError::InsufficientPoints {
            kind: "polygon".to_string(),
            required: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "polygon measurement needs at least 3 points, got 2"
        );

        let err = MeasurementError::Blocked {
            reason: "scale unknown".to_string(),
        };
        assert_eq!(err.to_string(), "Measurement blocked: scale unknown");

        let err = MeasurementError::UnknownUnit("inch".to_string());
        assert_eq!(err.to_string(), "Unknown measurement unit: inch");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = MeasurementError::Blocked {
            reason: "x".to_string(),
        }
        .into();
        assert!(err.is_blocked());
        assert!(err.is_measurement_error());

        let err: Error = CalibrationError::InvalidMagnification { value: 0.0 }.into();
        assert!(err.is_calibration_error());
        assert!(!err.is_blocked());

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
