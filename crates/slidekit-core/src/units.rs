//! Unit conversion utilities
//!
//! Converts raw pixel-space lengths and areas into microns or millimetres
//! using a slide's microns-per-pixel scale, and formats values for display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calibration::{is_reliable, CalibrationState};
use crate::error::MeasurementError;

/// Warning attached when no usable scale exists
pub const NO_CALIBRATION_WARNING: &str = "No calibration data available";

/// Warning attached when the scale is not independently validated
pub const UNVALIDATED_WARNING: &str = "Calibration not validated";

/// Display unit for measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementUnit {
    /// Raw image pixels
    Px,
    /// Microns
    #[default]
    Um,
    /// Millimetres
    Mm,
}

impl MeasurementUnit {
    /// Unit label, with a squared suffix for areas
    pub fn label(&self, is_area: bool) -> &'static str {
        match (self, is_area) {
            (Self::Px, false) => "px",
            (Self::Px, true) => "px²",
            (Self::Um, false) => "μm",
            (Self::Um, true) => "μm²",
            (Self::Mm, false) => "mm",
            (Self::Mm, true) => "mm²",
        }
    }
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label(false))
    }
}

impl FromStr for MeasurementUnit {
    type Err = MeasurementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "px" | "pixel" | "pixels" => Ok(Self::Px),
            "um" | "μm" | "µm" | "micron" | "microns" => Ok(Self::Um),
            "mm" => Ok(Self::Mm),
            _ => Err(MeasurementError::UnknownUnit(s.to_string())),
        }
    }
}

/// A raw pixel value converted for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibratedValue {
    /// The input, in px or px²
    pub pixel_value: f64,
    /// The value in `unit` (or `unit`²)
    pub calibrated_value: f64,
    /// Unit of `calibrated_value`
    pub unit: MeasurementUnit,
    /// Whether `calibrated_value` is an area
    pub is_area: bool,
    /// Whether the scale behind the value is validated
    pub is_reliable: bool,
    /// Advisory text for the UI
    pub warning: Option<String>,
}

impl CalibratedValue {
    /// Display string for the calibrated value
    pub fn label(&self) -> String {
        format_measurement_value(self.calibrated_value, self.unit, self.is_area)
    }
}

/// Convert a raw pixel value into `unit` using `mpp` microns per pixel.
///
/// Without a usable scale (or when `px` is requested) the pixel value is
/// passed through, flagged unreliable, with [`NO_CALIBRATION_WARNING`].
/// This is a normal result, not an error.
///
/// * `pixel_value` - length in px or area in px²
/// * `mpp` - microns per pixel of the slide
/// * `unit` - requested display unit
/// * `is_area` - whether `pixel_value` is an area
/// * `state` - provenance of `mpp`
pub fn convert_to_calibrated(
    pixel_value: f64,
    mpp: Option<f64>,
    unit: MeasurementUnit,
    is_area: bool,
    state: CalibrationState,
) -> CalibratedValue {
    let mpp = match mpp {
        Some(mpp) if mpp.is_finite() && mpp > 0.0 && unit != MeasurementUnit::Px => mpp,
        _ => {
            return CalibratedValue {
                pixel_value,
                calibrated_value: pixel_value,
                unit: MeasurementUnit::Px,
                is_area,
                is_reliable: false,
                warning: Some(NO_CALIBRATION_WARNING.to_string()),
            }
        }
    };

    let microns = if is_area {
        pixel_value * mpp * mpp
    } else {
        pixel_value * mpp
    };

    let calibrated_value = match (unit, is_area) {
        (MeasurementUnit::Mm, false) => microns / 1_000.0,
        (MeasurementUnit::Mm, true) => microns / 1_000_000.0,
        _ => microns,
    };

    let reliable = is_reliable(state);

    CalibratedValue {
        pixel_value,
        calibrated_value,
        unit,
        is_area,
        is_reliable: reliable,
        warning: (!reliable).then(|| UNVALIDATED_WARNING.to_string()),
    }
}

/// Format a measurement value for display
///
/// Micron values cascade into millimetres once they reach 1 mm (or 1 mm²);
/// each branch keeps its own precision.
pub fn format_measurement_value(value: f64, unit: MeasurementUnit, is_area: bool) -> String {
    match (unit, is_area) {
        (MeasurementUnit::Px, _) => format!("{:.0} {}", value, unit.label(is_area)),
        (MeasurementUnit::Um, false) if value >= 1_000.0 => {
            format!("{:.2} mm", value / 1_000.0)
        }
        (MeasurementUnit::Um, false) => format!("{:.0} μm", value),
        (MeasurementUnit::Um, true) if value >= 1_000_000.0 => {
            format!("{:.2} mm²", value / 1_000_000.0)
        }
        (MeasurementUnit::Um, true) => format!("{:.0} μm²", value),
        (MeasurementUnit::Mm, false) => format!("{:.2} mm", value),
        (MeasurementUnit::Mm, true) => format!("{:.4} mm²", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_conversion_to_microns() {
        let v = convert_to_calibrated(
            100.0,
            Some(0.25),
            MeasurementUnit::Um,
            false,
            CalibrationState::Factory,
        );
        assert_eq!(v.calibrated_value, 25.0);
        assert_eq!(v.unit, MeasurementUnit::Um);
        assert!(v.is_reliable);
        assert_eq!(v.warning, None);
    }

    #[test]
    fn test_area_conversion_squares_scale() {
        let v = convert_to_calibrated(
            200.0,
            Some(0.5),
            MeasurementUnit::Um,
            true,
            CalibrationState::SiteCalibrated,
        );
        assert_eq!(v.calibrated_value, 50.0);
        assert_eq!(v.label(), "50 μm²");
    }

    #[test]
    fn test_millimetre_conversion() {
        let v = convert_to_calibrated(
            4000.0,
            Some(0.5),
            MeasurementUnit::Mm,
            false,
            CalibrationState::Factory,
        );
        assert!((v.calibrated_value - 2.0).abs() < 1e-12);

        let v = convert_to_calibrated(
            4_000_000.0,
            Some(0.5),
            MeasurementUnit::Mm,
            true,
            CalibrationState::Factory,
        );
        assert!((v.calibrated_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_mpp_falls_back_to_pixels() {
        let v = convert_to_calibrated(
            123.0,
            None,
            MeasurementUnit::Mm,
            false,
            CalibrationState::SiteCalibrated,
        );
        assert_eq!(v.calibrated_value, 123.0);
        assert_eq!(v.unit, MeasurementUnit::Px);
        assert!(!v.is_reliable);
        assert_eq!(v.warning.as_deref(), Some(NO_CALIBRATION_WARNING));
    }

    #[test]
    fn test_pixel_unit_requested() {
        let v = convert_to_calibrated(
            42.0,
            Some(0.25),
            MeasurementUnit::Px,
            true,
            CalibrationState::Factory,
        );
        assert_eq!(v.calibrated_value, 42.0);
        assert_eq!(v.unit, MeasurementUnit::Px);
        assert!(!v.is_reliable);
    }

    #[test]
    fn test_degenerate_mpp_treated_as_missing() {
        let v = convert_to_calibrated(
            10.0,
            Some(0.0),
            MeasurementUnit::Um,
            false,
            CalibrationState::Factory,
        );
        assert_eq!(v.unit, MeasurementUnit::Px);
        assert!(!v.is_reliable);
    }

    #[test]
    fn test_unvalidated_scale_warns() {
        let v = convert_to_calibrated(
            10.0,
            Some(0.25),
            MeasurementUnit::Um,
            false,
            CalibrationState::Estimated,
        );
        assert_eq!(v.calibrated_value, 2.5);
        assert!(!v.is_reliable);
        assert_eq!(v.warning.as_deref(), Some(UNVALIDATED_WARNING));
    }

    #[test]
    fn test_format_micron_cascade() {
        assert_eq!(format_measurement_value(1500.0, MeasurementUnit::Um, false), "1.50 mm");
        assert_eq!(format_measurement_value(500.0, MeasurementUnit::Um, false), "500 μm");
        assert_eq!(format_measurement_value(1000.0, MeasurementUnit::Um, false), "1.00 mm");
        assert_eq!(
            format_measurement_value(2_500_000.0, MeasurementUnit::Um, true),
            "2.50 mm²"
        );
        assert_eq!(format_measurement_value(999_999.0, MeasurementUnit::Um, true), "999999 μm²");
    }

    #[test]
    fn test_format_pixels_and_millimetres() {
        assert_eq!(format_measurement_value(200.0, MeasurementUnit::Px, true), "200 px²");
        assert_eq!(format_measurement_value(37.0, MeasurementUnit::Px, false), "37 px");
        assert_eq!(format_measurement_value(1.5, MeasurementUnit::Mm, false), "1.50 mm");
        assert_eq!(format_measurement_value(0.125, MeasurementUnit::Mm, true), "0.1250 mm²");
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("um".parse::<MeasurementUnit>().unwrap(), MeasurementUnit::Um);
        assert_eq!("μm".parse::<MeasurementUnit>().unwrap(), MeasurementUnit::Um);
        assert_eq!(" PX ".parse::<MeasurementUnit>().unwrap(), MeasurementUnit::Px);
        assert_eq!("mm".parse::<MeasurementUnit>().unwrap(), MeasurementUnit::Mm);
        assert_eq!(
            "inch".parse::<MeasurementUnit>(),
            Err(MeasurementError::UnknownUnit("inch".to_string()))
        );
    }
}
