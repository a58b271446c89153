//! # SlideKit Core
//!
//! Core types shared by the SlideKit measurement crates:
//! calibration state and the diagnostic-mode blocking policy,
//! unit conversion and display formatting, and the error types
//! used by the fallible outer surfaces.

pub mod calibration;
pub mod error;
pub mod units;

pub use calibration::{
    block_reason, can_measure, is_measurement_blocked, is_reliable, CalibrationState,
    MeasurementGate, SlideMetadata, TileMetadata,
};

pub use error::{CalibrationError, Error, MeasurementError, Result};

pub use units::{convert_to_calibrated, format_measurement_value, CalibratedValue, MeasurementUnit};
