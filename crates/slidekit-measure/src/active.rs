//! The in-progress measurement being drawn.
//!
//! Points are only ever appended; the sequence is discarded wholesale on
//! cancel or promotion to a persisted record.

use slidekit_core::SlideMetadata;

use crate::geometry::calculate_value;
use crate::model::{MeasurementId, MeasurementType, Point};

/// Where the drawing interaction currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    /// No tool selected
    Idle,
    /// Collecting points for a shape
    Drawing {
        kind: MeasurementType,
        point_count: usize,
    },
    /// Shape finished, waiting to be saved or cancelled
    Complete { kind: MeasurementType },
}

/// Shape currently being drawn
#[derive(Debug, Clone)]
pub struct ActiveMeasurement {
    id: MeasurementId,
    kind: MeasurementType,
    points: Vec<Point>,
    is_complete: bool,
    calibration_at_start: SlideMetadata,
}

impl ActiveMeasurement {
    /// Creates an empty measurement of `kind` with a fresh id.
    pub fn new(kind: MeasurementType, calibration_at_start: SlideMetadata) -> Self {
        Self {
            id: MeasurementId::new_v4(),
            kind,
            points: Vec::new(),
            is_complete: false,
            calibration_at_start,
        }
    }

    pub fn id(&self) -> MeasurementId {
        self.id
    }

    pub fn kind(&self) -> MeasurementType {
        self.kind
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// Slide calibration in effect when the tool was selected
    pub fn calibration_at_start(&self) -> &SlideMetadata {
        &self.calibration_at_start
    }

    /// Whether enough points exist to build the shape.
    pub fn has_required_points(&self, min_polygon_vertices: usize) -> bool {
        self.points.len() >= self.required_points(min_polygon_vertices)
    }

    pub(crate) fn required_points(&self, min_polygon_vertices: usize) -> usize {
        match self.kind {
            MeasurementType::Polygon => self.kind.min_points().max(min_polygon_vertices),
            kind => kind.min_points(),
        }
    }

    /// Appends a point and applies the auto-completion rule.
    ///
    /// Returns `false` (and changes nothing) once the shape is complete or
    /// when `point` is not finite.
    pub fn add_point(&mut self, point: Point) -> bool {
        if self.is_complete || !point.is_finite() {
            return false;
        }

        self.points.push(point);
        if self.kind.completes_at(self.points.len()) {
            self.is_complete = true;
        }
        true
    }

    /// Marks the shape complete regardless of its point count.
    pub fn complete(&mut self) {
        self.is_complete = true;
    }

    /// Raw value of the shape as drawn so far.
    pub fn value(&self) -> f64 {
        calculate_value(self.kind, &self.points)
    }

    /// Raw value with `cursor` as a provisional next point.
    pub fn preview_value(&self, cursor: Point) -> f64 {
        if self.is_complete {
            return self.value();
        }
        let mut points = self.points.clone();
        points.push(cursor);
        calculate_value(self.kind, &points)
    }

    pub fn state(&self) -> InteractionState {
        if self.is_complete {
            InteractionState::Complete { kind: self.kind }
        } else {
            InteractionState::Drawing {
                kind: self.kind,
                point_count: self.points.len(),
            }
        }
    }
}
