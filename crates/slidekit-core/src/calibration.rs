//! Calibration state and the measurement blocking policy
//!
//! Slide calibration is owned by the metadata provider; this module only
//! reads it. Everything derived from it (`is_measurement_blocked`,
//! `can_measure`, `block_reason`) is a plain function over a
//! [`MeasurementGate`] snapshot, recomputed whenever the caller asks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalibrationError;

/// Relative difference between x and y pixel sizes above which a scan is
/// treated as anisotropic.
pub const ANISOTROPY_TOLERANCE: f64 = 0.01;

/// Microns per pixel of a 1x objective; an N-x scan is estimated at
/// `MAGNIFICATION_MPP_FACTOR / N`.
pub const MAGNIFICATION_MPP_FACTOR: f64 = 10.0;

/// Provenance of a slide's microns-per-pixel value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationState {
    /// No scale information at all
    #[default]
    Unknown,
    /// Scale guessed from indirect data (e.g. objective magnification)
    Estimated,
    /// Scale reported but inconsistent or not checked
    Unvalidated,
    /// Scanner factory calibration
    Factory,
    /// Calibrated on site against a reference slide
    SiteCalibrated,
}

impl CalibrationState {
    /// All states, least trusted first
    pub const ALL: [CalibrationState; 5] = [
        Self::Unknown,
        Self::Estimated,
        Self::Unvalidated,
        Self::Factory,
        Self::SiteCalibrated,
    ];

    /// Wire name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Estimated => "estimated",
            Self::Unvalidated => "unvalidated",
            Self::Factory => "factory",
            Self::SiteCalibrated => "site_calibrated",
        }
    }

    /// Whether values measured under this state are independently validated
    pub fn is_reliable(&self) -> bool {
        is_reliable(*self)
    }
}

impl fmt::Display for CalibrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CalibrationState {
    type Err = CalibrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unknown" => Ok(Self::Unknown),
            "estimated" => Ok(Self::Estimated),
            "unvalidated" => Ok(Self::Unvalidated),
            "factory" => Ok(Self::Factory),
            "site_calibrated" | "site-calibrated" => Ok(Self::SiteCalibrated),
            other => Err(CalibrationError::UnknownState(other.to_string())),
        }
    }
}

/// `true` only for factory and site calibration.
pub fn is_reliable(state: CalibrationState) -> bool {
    matches!(
        state,
        CalibrationState::SiteCalibrated | CalibrationState::Factory
    )
}

/// Scale information for the current slide, as supplied by the viewer session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideMetadata {
    /// Microns per pixel at full resolution, if known
    pub mpp: Option<f64>,
    /// Where `mpp` came from ("scanner", "magnification", "site", ...)
    pub mpp_source: String,
    /// Trust level of `mpp`
    pub calibration_state: CalibrationState,
}

impl SlideMetadata {
    /// Create slide metadata
    pub fn new(
        mpp: Option<f64>,
        mpp_source: impl Into<String>,
        calibration_state: CalibrationState,
    ) -> Self {
        Self {
            mpp,
            mpp_source: mpp_source.into(),
            calibration_state,
        }
    }

    /// Metadata for a slide without any scale information
    pub fn uncalibrated() -> Self {
        Self::new(None, "none", CalibrationState::Unknown)
    }

    /// Derive slide metadata from tile-server metadata.
    ///
    /// Pixel size (`mm_x`/`mm_y`, millimetres per pixel) wins over
    /// magnification. A scan whose axes disagree by more than
    /// [`ANISOTROPY_TOLERANCE`] keeps the x scale but is downgraded to
    /// [`CalibrationState::Unvalidated`].
    pub fn from_tile_metadata(meta: &TileMetadata) -> Result<Self, CalibrationError> {
        let mm_x = checked_pixel_size(meta.mm_x, "x")?;
        let mm_y = checked_pixel_size(meta.mm_y, "y")?;

        match (mm_x, mm_y) {
            (Some(x), Some(y)) => {
                let state = if (x - y).abs() / x.max(y) > ANISOTROPY_TOLERANCE {
                    tracing::warn!(
                        "Anisotropic pixels ({} x {} mm), scale marked unvalidated",
                        x,
                        y
                    );
                    CalibrationState::Unvalidated
                } else {
                    CalibrationState::Factory
                };
                Ok(Self::new(Some(x * 1000.0), "scanner", state))
            }
            (Some(size), None) | (None, Some(size)) => Ok(Self::new(
                Some(size * 1000.0),
                "scanner",
                CalibrationState::Factory,
            )),
            (None, None) => match meta.magnification {
                Some(mag) if mag.is_finite() && mag > 0.0 => {
                    tracing::debug!("No pixel size reported, estimating scale from {}x", mag);
                    Ok(Self::new(
                        Some(MAGNIFICATION_MPP_FACTOR / mag),
                        "magnification",
                        CalibrationState::Estimated,
                    ))
                }
                Some(mag) => Err(CalibrationError::InvalidMagnification { value: mag }),
                None => Ok(Self::uncalibrated()),
            },
        }
    }
}

impl Default for SlideMetadata {
    fn default() -> Self {
        Self::uncalibrated()
    }
}

fn checked_pixel_size(value: Option<f64>, axis: &str) -> Result<Option<f64>, CalibrationError> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(CalibrationError::InvalidPixelSize {
            axis: axis.to_string(),
            value: v,
        }),
        other => Ok(other),
    }
}

/// Subset of the tile server's `/metadata` response that carries scale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileMetadata {
    /// Image width in pixels
    #[serde(rename = "sizeX")]
    pub size_x: u64,
    /// Image height in pixels
    #[serde(rename = "sizeY")]
    pub size_y: u64,
    /// Reported objective magnification
    #[serde(default)]
    pub magnification: Option<f64>,
    /// Pixel width in millimetres
    #[serde(default)]
    pub mm_x: Option<f64>,
    /// Pixel height in millimetres
    #[serde(default)]
    pub mm_y: Option<f64>,
}

/// Inputs to the blocking policy at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeasurementGate {
    /// Whether a slide is loaded in the viewer
    pub slide_loaded: bool,
    /// Calibration state of the loaded slide (`Unknown` when none)
    pub calibration_state: CalibrationState,
    /// Session-wide diagnostic (sign-out) flag
    pub diagnostic_mode: bool,
}

impl MeasurementGate {
    /// Build a gate from the current slide (if any) and the diagnostic flag
    pub fn new(slide: Option<&SlideMetadata>, diagnostic_mode: bool) -> Self {
        Self {
            slide_loaded: slide.is_some(),
            calibration_state: slide
                .map(|s| s.calibration_state)
                .unwrap_or(CalibrationState::Unknown),
            diagnostic_mode,
        }
    }
}

/// Diagnostic mode forbids measuring on a slide with unknown scale.
pub fn is_measurement_blocked(gate: &MeasurementGate) -> bool {
    gate.diagnostic_mode && gate.calibration_state == CalibrationState::Unknown
}

/// A slide is loaded and the policy does not block.
pub fn can_measure(gate: &MeasurementGate) -> bool {
    gate.slide_loaded && !is_measurement_blocked(gate)
}

/// Explanation for the UI, populated only while blocked
pub fn block_reason(gate: &MeasurementGate) -> Option<String> {
    is_measurement_blocked(gate).then(|| {
        "Measurements are disabled: diagnostic mode requires a known slide scale, \
         but this slide's calibration is unknown"
            .to_string()
    })
}
