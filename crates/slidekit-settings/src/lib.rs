//! SlideKit Settings Crate
//!
//! Handles measurement configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{Config, LoggingSettings, MeasurementSettings};
pub use error::{SettingsError, SettingsResult};
