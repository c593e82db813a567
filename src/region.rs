//! Regions of interest and position filters.
//!
//! A [`Roi`] is a 2-D shape in scan coordinates. Regions serve two purposes:
//! during iteration they gate positions (only points inside every attached
//! region are emitted), and during construction their bounds seed the
//! bounding box of box-bounded models.
//!
//! # Coordinate convention
//!
//! When an ROI filters a generator's positions, its x-coordinate is read from
//! the *second* declared axis and its y-coordinate from the *first*. Models
//! declare their slow axis first, so for a grid over `(y, x)` the ROI x maps
//! to the stage x as expected. The convention is load-bearing for existing
//! scan definitions and is preserved here; [`RoiContainer`] implements it.

use serde::{Deserialize, Serialize};

use crate::models::bounds::BoundingBox;
use crate::position::Position;

// Tolerance for deciding that a point sits on a linear region.
const LINEAR_EPSILON: f64 = 1e-8;

/// A region of interest in the (x, y) scan plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Roi {
    /// Axis-aligned rectangle.
    #[serde(rename_all = "camelCase")]
    Rectangular {
        /// Lower x corner.
        x_start: f64,
        /// Lower y corner.
        y_start: f64,
        /// Extent along x.
        width: f64,
        /// Extent along y.
        height: f64,
    },
    /// Axis-aligned ellipse.
    #[serde(rename_all = "camelCase")]
    Elliptical {
        /// Centre x.
        x_centre: f64,
        /// Centre y.
        y_centre: f64,
        /// Semi-axis along x.
        x_radius: f64,
        /// Semi-axis along y.
        y_radius: f64,
    },
    /// Line segment, used mainly to bound the 1-D line models.
    #[serde(rename_all = "camelCase")]
    Linear {
        /// Segment origin x.
        x_start: f64,
        /// Segment origin y.
        y_start: f64,
        /// Segment length.
        length: f64,
        /// Direction, radians anticlockwise from the x axis.
        angle: f64,
    },
    /// Simple polygon given by its vertices in order.
    #[serde(rename_all = "camelCase")]
    Polygonal {
        /// The vertices as `[x, y]` pairs; the edge from the last vertex back
        /// to the first closes the polygon.
        points: Vec<[f64; 2]>,
    },
}

impl Roi {
    /// Axis-aligned rectangle from its lower corner and extents.
    pub fn rectangular(x_start: f64, y_start: f64, width: f64, height: f64) -> Roi {
        Roi::Rectangular {
            x_start,
            y_start,
            width,
            height,
        }
    }

    /// Axis-aligned ellipse from its centre and semi-axes.
    pub fn elliptical(x_centre: f64, y_centre: f64, x_radius: f64, y_radius: f64) -> Roi {
        Roi::Elliptical {
            x_centre,
            y_centre,
            x_radius,
            y_radius,
        }
    }

    /// Line segment from its origin, length and direction.
    pub fn linear(x_start: f64, y_start: f64, length: f64, angle: f64) -> Roi {
        Roi::Linear {
            x_start,
            y_start,
            length,
            angle,
        }
    }

    /// Simple polygon from its vertices.
    pub fn polygonal(points: Vec<[f64; 2]>) -> Roi {
        Roi::Polygonal { points }
    }

    /// Whether the point `(x, y)` lies inside (or on the edge of) the region.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        match self {
            Roi::Rectangular {
                x_start,
                y_start,
                width,
                height,
            } => {
                let (x0, x1) = ordered_span(*x_start, *width);
                let (y0, y1) = ordered_span(*y_start, *height);
                x >= x0 && x <= x1 && y >= y0 && y <= y1
            }
            Roi::Elliptical {
                x_centre,
                y_centre,
                x_radius,
                y_radius,
            } => {
                if *x_radius == 0.0 || *y_radius == 0.0 {
                    return false;
                }
                let dx = (x - x_centre) / x_radius;
                let dy = (y - y_centre) / y_radius;
                dx * dx + dy * dy <= 1.0
            }
            Roi::Linear {
                x_start,
                y_start,
                length,
                angle,
            } => {
                // Project onto the segment and require the point to sit on it.
                let (dx, dy) = (angle.cos(), angle.sin());
                let (px, py) = (x - x_start, y - y_start);
                let along = px * dx + py * dy;
                if along < -LINEAR_EPSILON || along > length + LINEAR_EPSILON {
                    return false;
                }
                let across = px * -dy + py * dx;
                across.abs() <= LINEAR_EPSILON * length.abs().max(1.0)
            }
            Roi::Polygonal { points } => polygon_contains(points, x, y),
        }
    }

    /// The axis-aligned box enclosing the region. ROI x spans the fast axis
    /// of the box, ROI y the slow axis.
    pub fn bounds(&self) -> BoundingBox {
        match self {
            Roi::Rectangular {
                x_start,
                y_start,
                width,
                height,
            } => {
                let (x0, x1) = ordered_span(*x_start, *width);
                let (y0, y1) = ordered_span(*y_start, *height);
                BoundingBox::new(x0, y0, x1 - x0, y1 - y0)
            }
            Roi::Elliptical {
                x_centre,
                y_centre,
                x_radius,
                y_radius,
            } => BoundingBox::new(
                x_centre - x_radius.abs(),
                y_centre - y_radius.abs(),
                2.0 * x_radius.abs(),
                2.0 * y_radius.abs(),
            ),
            Roi::Linear {
                x_start,
                y_start,
                length,
                angle,
            } => {
                let x_end = x_start + length * angle.cos();
                let y_end = y_start + length * angle.sin();
                let x0 = x_start.min(x_end);
                let y0 = y_start.min(y_end);
                BoundingBox::new(x0, y0, (x_end - x_start).abs(), (y_end - y_start).abs())
            }
            Roi::Polygonal { points } => {
                if points.is_empty() {
                    return BoundingBox::new(0.0, 0.0, 0.0, 0.0);
                }
                let mut xs = (f64::INFINITY, f64::NEG_INFINITY);
                let mut ys = (f64::INFINITY, f64::NEG_INFINITY);
                for [x, y] in points {
                    xs = (xs.0.min(*x), xs.1.max(*x));
                    ys = (ys.0.min(*y), ys.1.max(*y));
                }
                BoundingBox::new(xs.0, ys.0, xs.1 - xs.0, ys.1 - ys.0)
            }
        }
    }
}

fn ordered_span(start: f64, extent: f64) -> (f64, f64) {
    if extent < 0.0 {
        (start + extent, start)
    } else {
        (start, start + extent)
    }
}

// Even-odd ray casting; points on an edge count as inside closely enough for
// gating purposes.
fn polygon_contains(points: &[[f64; 2]], x: f64, y: f64) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let [xi, yi] = points[i];
        let [xj, yj] = points[j];
        if (yi > y) != (yj > y) {
            let x_cross = xi + (y - yi) / (yj - yi) * (xj - xi);
            if x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// A set of regions bound to the scannable axes they constrain.
///
/// `scannables` may name plain axes or full data paths of the form
/// `/entry/<group>/<axis>_value_set`; an empty list constrains every model in
/// a compound scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRegion {
    /// The regions of interest.
    pub rois: Vec<Roi>,
    /// The axis names (or data paths) the regions apply to.
    #[serde(default)]
    pub scannables: Vec<String>,
}

impl ScanRegion {
    /// Binds `rois` to the given scannable names.
    pub fn new(rois: Vec<Roi>, scannables: Vec<String>) -> Self {
        Self { rois, scannables }
    }

    /// Binds `rois` to every model of a compound scan.
    pub fn unbounded(rois: Vec<Roi>) -> Self {
        Self {
            rois,
            scannables: Vec::new(),
        }
    }
}

/// A predicate over emitted positions.
///
/// Generators AND all attached containers together; a position is emitted
/// only when every container accepts it.
pub trait PointContainer: Send + Sync {
    /// Whether the position should be emitted.
    fn contains_position(&self, position: &Position) -> bool;
}

impl<F> PointContainer for F
where
    F: Fn(&Position) -> bool + Send + Sync,
{
    fn contains_position(&self, position: &Position) -> bool {
        self(position)
    }
}

/// Adapts an [`Roi`] to the [`PointContainer`] protocol using the documented
/// coordinate convention: ROI x is read from the second declared axis, ROI y
/// from the first.
///
/// Positions that do not carry both axes pass the filter untouched.
#[derive(Debug, Clone)]
pub struct RoiContainer {
    roi: Roi,
    axes: Option<(String, String)>,
}

impl RoiContainer {
    /// Wraps `roi` over the given axis declaration order.
    ///
    /// With fewer than two declared axes there is nothing to read the ROI
    /// coordinates from and the container accepts everything.
    pub fn new(roi: Roi, axis_names: &[String]) -> Self {
        let axes = match axis_names {
            [first, second, ..] => Some((second.clone(), first.clone())),
            _ => None,
        };
        Self { roi, axes }
    }

    /// The wrapped region.
    pub fn roi(&self) -> &Roi {
        &self.roi
    }
}

impl PointContainer for RoiContainer {
    fn contains_position(&self, position: &Position) -> bool {
        let Some((x_axis, y_axis)) = &self.axes else {
            return true;
        };
        match (position.value(x_axis), position.value(y_axis)) {
            (Some(x), Some(y)) => self.roi.contains_point(x, y),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn position(names: &[&str], values: &[f64]) -> Position {
        let names: Arc<[String]> = names.iter().map(|s| s.to_string()).collect();
        Position::new(
            names,
            values.to_vec(),
            vec![crate::position::UNINDEXED; values.len()],
            0,
            0.0,
        )
    }

    #[test]
    fn test_rectangle_contains_edges() {
        let roi = Roi::rectangular(0.0, 0.0, 2.0, 1.0);
        assert!(roi.contains_point(0.0, 0.0));
        assert!(roi.contains_point(2.0, 1.0));
        assert!(roi.contains_point(1.0, 0.5));
        assert!(!roi.contains_point(2.1, 0.5));
    }

    #[test]
    fn test_negative_extents_normalise() {
        let roi = Roi::rectangular(2.0, 1.0, -2.0, -1.0);
        assert!(roi.contains_point(1.0, 0.5));
        assert_eq!(roi.bounds(), BoundingBox::new(0.0, 0.0, 2.0, 1.0));
    }

    #[test]
    fn test_ellipse_contains_centre_not_corner() {
        let roi = Roi::elliptical(0.0, 0.0, 2.0, 1.0);
        assert!(roi.contains_point(0.0, 0.0));
        assert!(roi.contains_point(2.0, 0.0));
        assert!(!roi.contains_point(2.0, 1.0));
    }

    #[test]
    fn test_linear_contains_points_on_segment_only() {
        let roi = Roi::linear(0.0, 0.0, 10.0, 0.0);
        assert!(roi.contains_point(5.0, 0.0));
        assert!(!roi.contains_point(5.0, 0.5));
        assert!(!roi.contains_point(11.0, 0.0));
    }

    #[test]
    fn test_polygon_triangle() {
        let roi = Roi::polygonal(vec![[0.0, 0.0], [4.0, 0.0], [0.0, 4.0]]);
        assert!(roi.contains_point(1.0, 1.0));
        assert!(!roi.contains_point(3.0, 3.0));
        assert_eq!(roi.bounds(), BoundingBox::new(0.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn test_degenerate_polygon_contains_nothing() {
        let roi = Roi::polygonal(vec![[0.0, 0.0], [1.0, 1.0]]);
        assert!(!roi.contains_point(0.5, 0.5));
    }

    #[test]
    fn test_roi_container_swaps_coordinates() {
        // Axes declared (y, x): ROI x reads the second axis, ROI y the first.
        let names = vec!["y".to_string(), "x".to_string()];
        let container = RoiContainer::new(Roi::rectangular(0.0, 0.0, 10.0, 1.0), &names);

        // x = 5 (second axis), y = 0.5 (first axis) is inside the wide box.
        assert!(container.contains_position(&position(&["y", "x"], &[0.5, 5.0])));
        // Swapped the other way it would be outside.
        assert!(!container.contains_position(&position(&["y", "x"], &[5.0, 0.5])));
    }

    #[test]
    fn test_single_axis_positions_pass() {
        let names = vec!["x".to_string()];
        let container = RoiContainer::new(Roi::rectangular(0.0, 0.0, 1.0, 1.0), &names);
        assert!(container.contains_position(&position(&["x"], &[99.0])));
    }

    #[test]
    fn test_closure_containers_compose() {
        let container: Box<dyn PointContainer> =
            Box::new(|pos: &Position| pos.value("x").is_some_and(|x| x > 0.0));
        assert!(container.contains_position(&position(&["x"], &[1.0])));
        assert!(!container.contains_position(&position(&["x"], &[-1.0])));
    }

    #[test]
    fn test_roi_wire_shape() {
        let json = serde_json::to_value(Roi::rectangular(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(json["type"], "rectangular");
        assert_eq!(json["xStart"], 1.0);
        assert_eq!(json["height"], 4.0);
    }
}
