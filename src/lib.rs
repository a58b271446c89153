//! # SlideKit
//!
//! Calibrated measurements for whole-slide image viewers:
//! - Line, rectangle, ellipse and polygon measurements in image pixel space
//! - Conversion to microns or millimetres from the slide's microns-per-pixel
//! - Diagnostic-mode gating that refuses to measure slides of unknown scale
//! - Per-record calibration snapshots and GeoJSON export
//!
//! ## Architecture
//!
//! SlideKit is organized as a workspace with multiple crates:
//!
//! 1. **slidekit-core** - Calibration policy, unit conversion, error types
//! 2. **slidekit-measure** - Geometry, drawing state machine, store, export
//! 3. **slidekit-settings** - Measurement and logging configuration
//! 4. **slidekit** - Re-exports, logging setup and the summary binary

pub use slidekit_measure::export;

pub use slidekit_core::{
    block_reason, can_measure, convert_to_calibrated, format_measurement_value,
    is_measurement_blocked, is_reliable, CalibratedValue, CalibrationError, CalibrationState,
    Error, MeasurementError, MeasurementGate, MeasurementUnit, Result, SlideMetadata,
    TileMetadata,
};

pub use slidekit_measure::{
    calculate_ellipse_area, calculate_line_distance, calculate_polygon_area,
    calculate_rectangle_area, calculate_value, ActiveMeasurement, InteractionState, Measurement,
    MeasurementGeometry, MeasurementId, MeasurementSession, MeasurementStore, MeasurementType,
    Point, SlideContext,
};

pub use slidekit_settings::{Config, LoggingSettings, MeasurementSettings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
/// - INFO as the default level
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with(&LoggingSettings::default())
}

/// Initialize logging from the `[logging]` config section.
///
/// `settings.filter` is the default directive; `RUST_LOG` takes precedence
/// when set. `settings.json` switches to one JSON object per event.
pub fn init_logging_with(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&settings.filter))?;

    if settings.json {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true)
            .pretty();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

/// One display line per measurement, in the order given.
///
/// Unreliable values carry their calibration warning.
pub fn summarize(measurements: &[Measurement]) -> Vec<String> {
    measurements
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let value = m.calibrated();
            let mut line = format!(
                "{:>3}. {:<9} {:>14}  [{}]",
                i + 1,
                m.kind(),
                value.label(),
                m.calibration_state()
            );
            if let Some(warning) = value.warning {
                line.push_str(&format!(" ({})", warning));
            }
            line
        })
        .collect()
}
