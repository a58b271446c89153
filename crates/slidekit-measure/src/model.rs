//! Measurement data model: image-space points, shape kinds and the
//! GeoJSON-style geometry handed to renderers and exporters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use slidekit_core::MeasurementError;

/// Identifier of an active or persisted measurement
pub type MeasurementId = uuid::Uuid;

/// A point in full-resolution image pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn to_pair(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

/// Measurement tool / shape kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementType {
    Line,
    Rectangle,
    Ellipse,
    Polygon,
}

impl MeasurementType {
    pub const ALL: [MeasurementType; 4] = [
        Self::Line,
        Self::Rectangle,
        Self::Ellipse,
        Self::Polygon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Polygon => "polygon",
        }
    }

    /// Lines measure length; every other kind measures area.
    pub fn is_area(&self) -> bool {
        !matches!(self, Self::Line)
    }

    /// Fewest points that describe this shape.
    pub fn min_points(&self) -> usize {
        match self {
            Self::Line | Self::Rectangle | Self::Ellipse => 2,
            Self::Polygon => 3,
        }
    }

    /// Whether `point_count` points finish the shape without an explicit
    /// completion. Polygons never auto-complete.
    pub fn completes_at(&self, point_count: usize) -> bool {
        match self {
            Self::Line | Self::Rectangle | Self::Ellipse => point_count >= 2,
            Self::Polygon => false,
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MeasurementType {
    type Err = MeasurementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(Self::Line),
            "rectangle" | "rect" => Ok(Self::Rectangle),
            "ellipse" => Ok(Self::Ellipse),
            "polygon" => Ok(Self::Polygon),
            _ => Err(MeasurementError::UnknownType(s.to_string())),
        }
    }
}

/// GeoJSON-like geometry of a persisted measurement
///
/// Lines are `LineString`s of their two endpoints. Rectangles and ellipses
/// are stored as the closed ring of their bounding box, polygons as the
/// closed ring of their vertices; the first point is repeated as the last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MeasurementGeometry {
    LineString { coordinates: Vec<[f64; 2]> },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

impl MeasurementGeometry {
    /// Build the interchange geometry for a finished shape.
    pub fn from_points(
        kind: MeasurementType,
        points: &[Point],
    ) -> Result<Self, MeasurementError> {
        if points.len() < kind.min_points() {
            return Err(MeasurementError::InsufficientPoints {
                kind: kind.to_string(),
                required: kind.min_points(),
                actual: points.len(),
            });
        }

        if let Some(p) = points.iter().find(|p| !p.is_finite()) {
            return Err(MeasurementError::InvalidGeometry {
                reason: format!("non-finite point ({}, {})", p.x, p.y),
            });
        }

        let geometry = match kind {
            MeasurementType::Line => MeasurementGeometry::LineString {
                coordinates: vec![points[0].to_pair(), points[1].to_pair()],
            },
            MeasurementType::Rectangle | MeasurementType::Ellipse => {
                let (a, b) = (points[0], points[1]);
                MeasurementGeometry::Polygon {
                    coordinates: vec![vec![
                        [a.x, a.y],
                        [b.x, a.y],
                        [b.x, b.y],
                        [a.x, b.y],
                        [a.x, a.y],
                    ]],
                }
            }
            MeasurementType::Polygon => {
                let mut ring: Vec<[f64; 2]> = points.iter().map(|p| p.to_pair()).collect();
                ring.push(points[0].to_pair());
                MeasurementGeometry::Polygon {
                    coordinates: vec![ring],
                }
            }
        };

        Ok(geometry)
    }

    /// Recover the defining points of a shape from its geometry: the two
    /// endpoints of a line, the two opposite corners of a bounding box, or
    /// the polygon vertices without the closing repeat.
    pub fn defining_points(&self, kind: MeasurementType) -> Result<Vec<Point>, MeasurementError> {
        match (kind, self) {
            (MeasurementType::Line, MeasurementGeometry::LineString { coordinates })
                if coordinates.len() == 2 =>
            {
                Ok(coordinates.iter().copied().map(Point::from).collect())
            }
            (
                MeasurementType::Rectangle | MeasurementType::Ellipse,
                MeasurementGeometry::Polygon { coordinates },
            ) => {
                let ring = outer_ring(coordinates)?;
                if ring.len() != 5 {
                    return Err(MeasurementError::InvalidGeometry {
                        reason: format!("{} ring must have 5 positions, got {}", kind, ring.len()),
                    });
                }
                Ok(vec![Point::from(ring[0]), Point::from(ring[2])])
            }
            (MeasurementType::Polygon, MeasurementGeometry::Polygon { coordinates }) => {
                let ring = outer_ring(coordinates)?;
                Ok(ring[..ring.len() - 1]
                    .iter()
                    .copied()
                    .map(Point::from)
                    .collect())
            }
            (kind, geometry) => Err(MeasurementError::InvalidGeometry {
                reason: format!("{} cannot be stored as {}", kind, geometry.type_name()),
            }),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            MeasurementGeometry::LineString { .. } => "LineString",
            MeasurementGeometry::Polygon { .. } => "Polygon",
        }
    }
}

fn outer_ring(coordinates: &[Vec<[f64; 2]>]) -> Result<&[[f64; 2]], MeasurementError> {
    let ring = coordinates
        .first()
        .ok_or_else(|| MeasurementError::InvalidGeometry {
            reason: "polygon has no rings".to_string(),
        })?;
    if ring.len() < 2 || ring.first() != ring.last() {
        return Err(MeasurementError::InvalidGeometry {
            reason: "polygon ring is not closed".to_string(),
        });
    }
    Ok(ring.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rules() {
        assert!(!MeasurementType::Line.completes_at(1));
        assert!(MeasurementType::Line.completes_at(2));
        assert!(MeasurementType::Rectangle.completes_at(2));
        assert!(MeasurementType::Ellipse.completes_at(2));
        assert!(!MeasurementType::Polygon.completes_at(2));
        assert!(!MeasurementType::Polygon.completes_at(100));
    }

    #[test]
    fn test_line_geometry() {
        let g = MeasurementGeometry::from_points(
            MeasurementType::Line,
            &[Point::new(1.0, 2.0), Point::new(3.0, 4.0)],
        )
        .unwrap();
        assert_eq!(
            g,
            MeasurementGeometry::LineString {
                coordinates: vec![[1.0, 2.0], [3.0, 4.0]]
            }
        );
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["type"], "LineString");
    }

    #[test]
    fn test_rectangle_ring_is_closed_bounding_box() {
        let g = MeasurementGeometry::from_points(
            MeasurementType::Rectangle,
            &[Point::new(0.0, 0.0), Point::new(20.0, 10.0)],
        )
        .unwrap();
        let MeasurementGeometry::Polygon { coordinates } = &g else {
            panic!("expected polygon");
        };
        assert_eq!(
            coordinates[0],
            vec![[0.0, 0.0], [20.0, 0.0], [20.0, 10.0], [0.0, 10.0], [0.0, 0.0]]
        );
        assert_eq!(
            g.defining_points(MeasurementType::Rectangle).unwrap(),
            vec![Point::new(0.0, 0.0), Point::new(20.0, 10.0)]
        );
    }

    #[test]
    fn test_polygon_ring_repeats_first_vertex() {
        let pts = [Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(0.0, 3.0)];
        let g = MeasurementGeometry::from_points(MeasurementType::Polygon, &pts).unwrap();
        let MeasurementGeometry::Polygon { coordinates } = &g else {
            panic!("expected polygon");
        };
        assert_eq!(coordinates[0].len(), 4);
        assert_eq!(coordinates[0].first(), coordinates[0].last());
        assert_eq!(g.defining_points(MeasurementType::Polygon).unwrap(), pts.to_vec());
    }

    #[test]
    fn test_insufficient_points_rejected() {
        let err = MeasurementGeometry::from_points(
            MeasurementType::Polygon,
            &[Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            MeasurementError::InsufficientPoints {
                kind: "polygon".to_string(),
                required: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_mismatched_geometry_rejected() {
        let g = MeasurementGeometry::LineString {
            coordinates: vec![[0.0, 0.0], [1.0, 1.0]],
        };
        assert!(g.defining_points(MeasurementType::Polygon).is_err());
    }

    #[test]
    fn test_type_parsing() {
        assert_eq!("Rect".parse::<MeasurementType>().unwrap(), MeasurementType::Rectangle);
        assert_eq!(
            "circle".parse::<MeasurementType>(),
            Err(MeasurementError::UnknownType("circle".to_string()))
        );
    }

    #[test]
    fn test_non_finite_points_rejected() {
        let err = MeasurementGeometry::from_points(
            MeasurementType::Line,
            &[Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0)],
        )
        .unwrap_err();
        assert!(matches!(err, MeasurementError::InvalidGeometry { .. }));
    }
}
