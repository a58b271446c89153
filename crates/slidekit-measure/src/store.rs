//! Persisted measurements and the per-slide store that holds them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use slidekit_core::{
    convert_to_calibrated, CalibratedValue, CalibrationState, MeasurementError, MeasurementUnit,
    SlideMetadata,
};

use crate::geometry::calculate_value;
use crate::model::{MeasurementGeometry, MeasurementId, MeasurementType, Point};

/// A finalized measurement.
///
/// `mpp`, `mpp_source` and `calibration_state` are a snapshot of the slide
/// calibration at save time and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub(crate) id: MeasurementId,
    pub(crate) slide_id: String,
    pub(crate) scan_id: String,
    #[serde(rename = "type")]
    pub(crate) kind: MeasurementType,
    pub(crate) geometry: MeasurementGeometry,
    pub(crate) value: f64,
    pub(crate) unit: MeasurementUnit,
    pub(crate) mpp: Option<f64>,
    pub(crate) mpp_source: String,
    pub(crate) calibration_state: CalibrationState,
    pub(crate) created_at: DateTime<Utc>,
}

impl Measurement {
    /// Builds a record from the defining points of a shape.
    ///
    /// The raw value is computed from `points`, the geometry is derived
    /// from them, and `calibration` is copied into the record.
    pub fn new(
        slide_id: impl Into<String>,
        scan_id: impl Into<String>,
        kind: MeasurementType,
        points: &[Point],
        unit: MeasurementUnit,
        calibration: &SlideMetadata,
    ) -> Result<Self, MeasurementError> {
        let geometry = MeasurementGeometry::from_points(kind, points)?;

        Ok(Self {
            id: MeasurementId::new_v4(),
            slide_id: slide_id.into(),
            scan_id: scan_id.into(),
            kind,
            geometry,
            value: calculate_value(kind, points),
            unit,
            mpp: calibration.mpp,
            mpp_source: calibration.mpp_source.clone(),
            calibration_state: calibration.calibration_state,
            created_at: Utc::now(),
        })
    }

    /// Replaces the generated id.
    pub fn with_id(mut self, id: MeasurementId) -> Self {
        self.id = id;
        self
    }

    /// Replaces the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> MeasurementId {
        self.id
    }

    pub fn slide_id(&self) -> &str {
        &self.slide_id
    }

    pub fn scan_id(&self) -> &str {
        &self.scan_id
    }

    pub fn kind(&self) -> MeasurementType {
        self.kind
    }

    pub fn geometry(&self) -> &MeasurementGeometry {
        &self.geometry
    }

    /// Raw value in px (lines) or px² (areas)
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Preferred display unit
    pub fn unit(&self) -> MeasurementUnit {
        self.unit
    }

    pub fn mpp(&self) -> Option<f64> {
        self.mpp
    }

    pub fn mpp_source(&self) -> &str {
        &self.mpp_source
    }

    pub fn calibration_state(&self) -> CalibrationState {
        self.calibration_state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_area(&self) -> bool {
        self.kind.is_area()
    }

    /// Value converted with the record's own calibration snapshot
    pub fn calibrated(&self) -> CalibratedValue {
        convert_to_calibrated(
            self.value,
            self.mpp,
            self.unit,
            self.is_area(),
            self.calibration_state,
        )
    }

    /// Display label, e.g. `"50 μm²"`
    pub fn label(&self) -> String {
        self.calibrated().label()
    }
}

/// Insertion-ordered measurements of the current slide
#[derive(Debug, Clone, Default)]
pub struct MeasurementStore {
    measurements: Vec<Measurement>,
}

impl MeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record. A record whose id is already stored is refused.
    pub fn save(&mut self, measurement: Measurement) -> bool {
        if self.contains(measurement.id()) {
            tracing::warn!("Measurement {} already saved, ignoring", measurement.id());
            return false;
        }

        tracing::info!(
            "Saved {} measurement {} ({})",
            measurement.kind(),
            measurement.id(),
            measurement.label()
        );
        self.measurements.push(measurement);
        true
    }

    /// Removes a record by id. Unknown ids are ignored.
    pub fn delete(&mut self, id: MeasurementId) -> bool {
        let before = self.measurements.len();
        self.measurements.retain(|m| m.id() != id);
        let removed = self.measurements.len() != before;
        if removed {
            tracing::info!("Deleted measurement {}", id);
        } else {
            tracing::debug!("Delete of unknown measurement {} ignored", id);
        }
        removed
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        if !self.measurements.is_empty() {
            tracing::info!("Cleared {} measurements", self.measurements.len());
        }
        self.measurements.clear();
    }

    pub fn get(&self, id: MeasurementId) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.id() == id)
    }

    pub fn contains(&self, id: MeasurementId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.measurements.iter()
    }

    pub fn as_slice(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

impl<'a> IntoIterator for &'a MeasurementStore {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.measurements.iter()
    }
}
