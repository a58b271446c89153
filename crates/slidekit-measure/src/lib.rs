//! # SlideKit Measure
//!
//! Calibrated measurements on whole-slide images.
//!
//! - [`geometry`]: pure length/area calculations in image pixel space
//! - [`active`]: the in-progress shape and its completion rules
//! - [`store`]: persisted records with their calibration snapshot
//! - [`session`]: the per-viewer state machine gated by calibration policy
//! - [`export`]: GeoJSON `FeatureCollection` export and import

pub mod active;
pub mod export;
pub mod geometry;
pub mod model;
pub mod session;
pub mod store;

pub use active::{ActiveMeasurement, InteractionState};
pub use geometry::{
    calculate_ellipse_area, calculate_line_distance, calculate_polygon_area,
    calculate_rectangle_area, calculate_value,
};
pub use model::{MeasurementGeometry, MeasurementId, MeasurementType, Point};
pub use session::{MeasurementSession, SlideContext};
pub use store::{Measurement, MeasurementStore};
