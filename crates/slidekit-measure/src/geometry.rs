//! Raw pixel-space geometry for measurement shapes.
//!
//! Every function here is pure and unit-less: lengths come back in px,
//! areas in px². Calibration is applied later by
//! [`slidekit_core::convert_to_calibrated`].

use std::f64::consts::PI;

use crate::model::{MeasurementType, Point};

/// Euclidean distance between two points.
pub fn calculate_line_distance(p1: Point, p2: Point) -> f64 {
    p1.distance_to(&p2)
}

/// Area of the axis-aligned box spanned by two opposite corners.
pub fn calculate_rectangle_area(p1: Point, p2: Point) -> f64 {
    (p2.x - p1.x).abs() * (p2.y - p1.y).abs()
}

/// Area of the ellipse inscribed in the box spanned by two opposite corners.
pub fn calculate_ellipse_area(p1: Point, p2: Point) -> f64 {
    let a = (p2.x - p1.x).abs() / 2.0;
    let b = (p2.y - p1.y).abs() / 2.0;
    PI * a * b
}

/// Shoelace area of the closed ring through `points`.
///
/// Returns 0 for fewer than 3 points. Winding order does not matter.
pub fn calculate_polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum.abs() / 2.0
}

/// Raw value of a shape of kind `kind` defined by `points`.
///
/// Lines, rectangles and ellipses use their first two points; polygons use
/// all of them. Too few points yields 0.
pub fn calculate_value(kind: MeasurementType, points: &[Point]) -> f64 {
    match (kind, points) {
        (MeasurementType::Line, [p1, p2, ..]) => calculate_line_distance(*p1, *p2),
        (MeasurementType::Rectangle, [p1, p2, ..]) => calculate_rectangle_area(*p1, *p2),
        (MeasurementType::Ellipse, [p1, p2, ..]) => calculate_ellipse_area(*p1, *p2),
        (MeasurementType::Polygon, points) => calculate_polygon_area(points),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_line_distance() {
        assert_eq!(calculate_line_distance(p(0.0, 0.0), p(3.0, 4.0)), 5.0);
        assert_eq!(calculate_line_distance(p(2.0, 2.0), p(2.0, 2.0)), 0.0);
    }

    #[test]
    fn test_rectangle_area() {
        assert_eq!(calculate_rectangle_area(p(0.0, 0.0), p(20.0, 10.0)), 200.0);
        assert_eq!(calculate_rectangle_area(p(20.0, 10.0), p(0.0, 0.0)), 200.0);
        assert_eq!(calculate_rectangle_area(p(5.0, 0.0), p(5.0, 10.0)), 0.0);
    }

    #[test]
    fn test_ellipse_area() {
        let area = calculate_ellipse_area(p(0.0, 0.0), p(20.0, 10.0));
        assert!((area - PI * 10.0 * 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_square_polygon_area() {
        let square = [p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)];
        assert_eq!(calculate_polygon_area(&square), 100.0);
    }

    #[test]
    fn test_concave_polygon_area() {
        // L-shape: 10x10 square minus a 5x5 corner
        let l = [
            p(0.0, 0.0),
            p(10.0, 0.0),
            p(10.0, 5.0),
            p(5.0, 5.0),
            p(5.0, 10.0),
            p(0.0, 10.0),
        ];
        assert_eq!(calculate_polygon_area(&l), 75.0);
    }

    #[test]
    fn test_degenerate_polygons() {
        assert_eq!(calculate_polygon_area(&[]), 0.0);
        assert_eq!(calculate_polygon_area(&[p(1.0, 1.0), p(5.0, 5.0)]), 0.0);
        assert_eq!(
            calculate_polygon_area(&[p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0)]),
            0.0
        );
    }

    #[test]
    fn test_calculate_value_dispatch() {
        let pts = [p(0.0, 0.0), p(20.0, 10.0)];
        assert!((calculate_value(MeasurementType::Line, &pts) - 500f64.sqrt()).abs() < 1e-9);
        assert_eq!(calculate_value(MeasurementType::Rectangle, &pts), 200.0);
        assert_eq!(calculate_value(MeasurementType::Polygon, &pts), 0.0);
        assert_eq!(calculate_value(MeasurementType::Line, &pts[..1]), 0.0);
    }
}
