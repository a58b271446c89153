//! Measurement session for one viewer.
//!
//! Owns the loaded slide, the diagnostic-mode flag, the tool selection, the
//! single in-progress measurement and the store of saved measurements.
//! Interactive operations never return errors: a rejected request returns
//! `false` (or does nothing) and logs why.

use slidekit_core::{
    block_reason, can_measure, convert_to_calibrated, is_measurement_blocked, CalibratedValue,
    MeasurementError, MeasurementGate, MeasurementUnit, Result, SlideMetadata,
};
use slidekit_settings::MeasurementSettings;

use crate::active::{ActiveMeasurement, InteractionState};
use crate::model::{MeasurementId, MeasurementType, Point};
use crate::store::{Measurement, MeasurementStore};

/// The slide currently open in the viewer
#[derive(Debug, Clone, PartialEq)]
pub struct SlideContext {
    pub slide_id: String,
    pub scan_id: String,
    pub metadata: SlideMetadata,
}

impl SlideContext {
    pub fn new(
        slide_id: impl Into<String>,
        scan_id: impl Into<String>,
        metadata: SlideMetadata,
    ) -> Self {
        Self {
            slide_id: slide_id.into(),
            scan_id: scan_id.into(),
            metadata,
        }
    }
}

/// Session-scoped measurement state
#[derive(Debug, Clone)]
pub struct MeasurementSession {
    slide: Option<SlideContext>,
    diagnostic_mode: bool,
    settings: MeasurementSettings,
    active_tool: Option<MeasurementType>,
    active: Option<ActiveMeasurement>,
    store: MeasurementStore,
}

impl MeasurementSession {
    /// Creates a session with default settings (diagnostic mode on).
    pub fn new() -> Self {
        Self::with_settings(&MeasurementSettings::default())
    }

    pub fn with_settings(settings: &MeasurementSettings) -> Self {
        Self {
            slide: None,
            diagnostic_mode: settings.diagnostic_mode,
            settings: settings.clone(),
            active_tool: None,
            active: None,
            store: MeasurementStore::new(),
        }
    }

    // --- slide lifecycle -------------------------------------------------

    /// Opens a slide. Any previous measurements and drawing are dropped.
    pub fn load_slide(&mut self, slide: SlideContext) {
        self.reset();
        tracing::info!(
            "Loaded slide {} (scan {}), calibration {}",
            slide.slide_id,
            slide.scan_id,
            slide.metadata.calibration_state
        );
        self.slide = Some(slide);
    }

    /// Closes the current slide.
    pub fn unload_slide(&mut self) {
        self.reset();
        self.slide = None;
    }

    /// Drops the drawing, the tool selection and every saved measurement.
    pub fn reset(&mut self) {
        self.active = None;
        self.active_tool = None;
        self.store.clear();
    }

    /// Replaces the live calibration of the loaded slide.
    ///
    /// Saved records keep the calibration they were saved with.
    pub fn update_slide_metadata(&mut self, metadata: SlideMetadata) {
        match self.slide.as_mut() {
            Some(slide) => {
                tracing::info!(
                    "Calibration of slide {} changed: {} -> {}",
                    slide.slide_id,
                    slide.metadata.calibration_state,
                    metadata.calibration_state
                );
                slide.metadata = metadata;
            }
            None => tracing::warn!("Calibration update ignored, no slide loaded"),
        }
    }

    pub fn slide(&self) -> Option<&SlideContext> {
        self.slide.as_ref()
    }

    // --- policy ----------------------------------------------------------

    pub fn diagnostic_mode(&self) -> bool {
        self.diagnostic_mode
    }

    pub fn set_diagnostic_mode(&mut self, enabled: bool) {
        if self.diagnostic_mode != enabled {
            tracing::info!("Diagnostic mode {}", if enabled { "on" } else { "off" });
        }
        self.diagnostic_mode = enabled;
    }

    pub fn settings(&self) -> &MeasurementSettings {
        &self.settings
    }

    /// Snapshot of the blocking-policy inputs
    pub fn gate(&self) -> MeasurementGate {
        MeasurementGate::new(self.slide.as_ref().map(|s| &s.metadata), self.diagnostic_mode)
    }

    pub fn can_measure(&self) -> bool {
        can_measure(&self.gate())
    }

    pub fn is_measurement_blocked(&self) -> bool {
        is_measurement_blocked(&self.gate())
    }

    pub fn block_reason(&self) -> Option<String> {
        block_reason(&self.gate())
    }

    // --- drawing state machine -------------------------------------------

    pub fn active_tool(&self) -> Option<MeasurementType> {
        self.active_tool
    }

    pub fn active_measurement(&self) -> Option<&ActiveMeasurement> {
        self.active.as_ref()
    }

    pub fn state(&self) -> InteractionState {
        self.active
            .as_ref()
            .map(ActiveMeasurement::state)
            .unwrap_or(InteractionState::Idle)
    }

    /// Selects a tool and begins a new measurement.
    ///
    /// Returns `false` without touching the current state when no slide is
    /// loaded or the calibration policy blocks measuring. Any unfinished
    /// measurement is discarded.
    pub fn start_measurement(&mut self, kind: MeasurementType) -> bool {
        let Some(slide) = self.slide.as_ref() else {
            tracing::warn!("Cannot start {} measurement: no slide loaded", kind);
            return false;
        };

        if let Some(reason) = self.block_reason() {
            tracing::warn!("Cannot start {} measurement: {}", kind, reason);
            return false;
        }

        if let Some(previous) = self.active.as_ref() {
            tracing::debug!(
                "Discarding unfinished {} measurement {}",
                previous.kind(),
                previous.id()
            );
        }

        let active = ActiveMeasurement::new(kind, slide.metadata.clone());
        tracing::debug!("Started {} measurement {}", kind, active.id());
        self.active = Some(active);
        self.active_tool = Some(kind);
        true
    }

    /// Adds a point to the active measurement.
    ///
    /// Ignored when nothing is being drawn, the shape is already complete or
    /// a coordinate is not finite.
    pub fn add_measurement_point(&mut self, x: f64, y: f64) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        if !(x.is_finite() && y.is_finite()) {
            tracing::warn!("Point ({}, {}) ignored, coordinates must be finite", x, y);
            return false;
        }

        if !active.add_point(Point::new(x, y)) {
            tracing::debug!("Point ignored, {} measurement already complete", active.kind());
            return false;
        }

        if active.is_complete() {
            tracing::debug!("{} measurement {} complete", active.kind(), active.id());
        }
        true
    }

    /// Finishes the active measurement whatever its point count.
    pub fn complete_measurement(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        if !active.has_required_points(self.settings.min_polygon_vertices) {
            tracing::warn!(
                "{} measurement completed with only {} points; it cannot be saved",
                active.kind(),
                active.points().len()
            );
        }
        active.complete();
    }

    /// Discards the active measurement and deselects the tool.
    pub fn cancel_measurement(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!("Cancelled {} measurement {}", active.kind(), active.id());
        }
        self.active_tool = None;
    }

    /// Raw value of the shape being drawn with `cursor` as the next point.
    pub fn preview_value(&self, cursor: Point) -> Option<f64> {
        self.active.as_ref().map(|a| a.preview_value(cursor))
    }

    /// Converts a raw value with the loaded slide's current calibration.
    pub fn display_value(&self, pixel_value: f64, is_area: bool) -> CalibratedValue {
        let metadata = self
            .slide
            .as_ref()
            .map(|s| s.metadata.clone())
            .unwrap_or_default();
        convert_to_calibrated(
            pixel_value,
            metadata.mpp,
            self.settings.display_unit,
            is_area,
            metadata.calibration_state,
        )
    }

    // --- persistence -----------------------------------------------------

    /// Builds a record from the completed active measurement.
    ///
    /// The record captures the slide's calibration at this moment. The
    /// session is left unchanged; pass the record to
    /// [`save_measurement`](Self::save_measurement) to persist it.
    pub fn finalize_active(&self, unit: MeasurementUnit) -> Result<Measurement> {
        let slide = self.slide.as_ref().ok_or(MeasurementError::NoSlideLoaded)?;
        let active = self
            .active
            .as_ref()
            .ok_or(MeasurementError::NoActiveMeasurement)?;

        if !active.is_complete() {
            return Err(MeasurementError::Incomplete {
                kind: active.kind().to_string(),
            }
            .into());
        }

        let required = active.required_points(self.settings.min_polygon_vertices);
        if active.points().len() < required {
            return Err(MeasurementError::InsufficientPoints {
                kind: active.kind().to_string(),
                required,
                actual: active.points().len(),
            }
            .into());
        }

        if let Some(reason) = self.block_reason() {
            return Err(MeasurementError::Blocked { reason }.into());
        }

        if active.calibration_at_start() != &slide.metadata {
            tracing::warn!(
                "Calibration of slide {} changed while measuring ({} -> {}); saving with current calibration",
                slide.slide_id,
                active.calibration_at_start().calibration_state,
                slide.metadata.calibration_state
            );
        }

        let record = Measurement::new(
            slide.slide_id.clone(),
            slide.scan_id.clone(),
            active.kind(),
            active.points(),
            unit,
            &slide.metadata,
        )?
        .with_id(active.id());

        if self.settings.warn_on_unreliable && !record.calibration_state().is_reliable() {
            tracing::warn!(
                "Measurement {} uses {} calibration; value is not validated",
                record.id(),
                record.calibration_state()
            );
        }

        Ok(record)
    }

    /// Appends a record to the store and returns to idle.
    ///
    /// Refused when no slide is loaded or the record belongs to another
    /// slide.
    pub fn save_measurement(&mut self, record: Measurement) -> bool {
        let Some(slide) = self.slide.as_ref() else {
            tracing::warn!("Cannot save measurement {}: no slide loaded", record.id());
            return false;
        };

        if record.slide_id() != slide.slide_id {
            tracing::warn!(
                "Cannot save measurement {}: it belongs to slide {}, not {}",
                record.id(),
                record.slide_id(),
                slide.slide_id
            );
            return false;
        }

        if !self.store.save(record) {
            return false;
        }
        self.active = None;
        self.active_tool = None;
        true
    }

    /// Finalizes the active measurement and saves it.
    pub fn commit_active(&mut self, unit: MeasurementUnit) -> Result<MeasurementId> {
        let record = self.finalize_active(unit)?;
        let id = record.id();
        if self.save_measurement(record) {
            Ok(id)
        } else {
            Err(slidekit_core::Error::other(format!(
                "measurement {} could not be saved",
                id
            )))
        }
    }

    pub fn delete_measurement(&mut self, id: MeasurementId) -> bool {
        self.store.delete(id)
    }

    pub fn clear_measurements(&mut self) {
        self.store.clear();
    }

    pub fn measurements(&self) -> &MeasurementStore {
        &self.store
    }
}

impl Default for MeasurementSession {
    fn default() -> Self {
        Self::new()
    }
}
