//! Minimal canvas geometry.
//!
//! Shapes are tagged variants holding their control parameters; shared
//! helpers operate on that data. Actual drawing is out of scope -- these
//! exist so canvas content can be positioned and hit-tested through the
//! viewport transform, and so shared content can broadcast changes to
//! every observing viewer.

use crate::callback::{CallbackList, CanvasChanged};

use super::transform::{Point, Viewport};

/// Geometry of a canvas object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CanvasShape {
    /// A single anchor point (marker, label).
    OnePoint { pt: Point },
    /// Two end/corner points (line, box, ruler).
    TwoPoint { p1: Point, p2: Point },
    /// Center plus two radii and an orientation (ellipse, annulus).
    PointRadii {
        center: Point,
        r1: f64,
        r2: f64,
        rot_deg: f64,
    },
}

impl CanvasShape {
    /// Reference (anchor) point of the shape.
    pub fn reference_point(&self) -> Point {
        match *self {
            Self::OnePoint { pt } => pt,
            Self::TwoPoint { p1, .. } => p1,
            Self::PointRadii { center, .. } => center,
        }
    }

    /// Control points in data space.
    pub fn control_points(&self) -> Vec<Point> {
        match *self {
            Self::OnePoint { pt } => vec![pt],
            Self::TwoPoint { p1, p2 } => vec![p1, p2],
            Self::PointRadii {
                center, r1, r2, ..
            } => vec![
                center,
                Point::new(center.x + r1, center.y),
                Point::new(center.x, center.y + r2),
            ],
        }
    }

    /// The shape translated so its reference point lands on `pt`.
    pub fn move_to(&self, pt: Point) -> Self {
        let anchor = self.reference_point();
        let dx = pt.x - anchor.x;
        let dy = pt.y - anchor.y;
        match *self {
            Self::OnePoint { .. } => Self::OnePoint { pt },
            Self::TwoPoint { p1, p2 } => Self::TwoPoint {
                p1: Point::new(p1.x + dx, p1.y + dy),
                p2: Point::new(p2.x + dx, p2.y + dy),
            },
            Self::PointRadii {
                center,
                r1,
                r2,
                rot_deg,
            } => Self::PointRadii {
                center: Point::new(center.x + dx, center.y + dy),
                r1,
                r2,
                rot_deg,
            },
        }
    }

    /// Axis-aligned bounding box of the control points in data space.
    pub fn bounds(&self) -> (Point, Point) {
        let pts = self.control_points();
        let mut min = pts[0];
        let mut max = pts[0];
        for p in &pts[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    /// Control points mapped through the viewport into window space.
    pub fn window_points(&self, viewport: &Viewport) -> Vec<Point> {
        self.control_points()
            .into_iter()
            .map(|p| viewport.data_to_window(p))
            .collect()
    }

    /// True when `win_pt` lies within `radius` window pixels of any
    /// control point.
    pub fn hit_test(&self, viewport: &Viewport, win_pt: Point, radius: f64) -> bool {
        self.window_points(viewport).iter().any(|p| {
            let dx = p.x - win_pt.x;
            let dy = p.y - win_pt.y;
            dx * dx + dy * dy <= radius * radius
        })
    }
}

/// Drawing content shared between viewers.
///
/// Mutation notifies every observer so each viewer recomputes its own
/// transform-dependent view of the shared shapes.
#[derive(Debug, Default)]
pub struct SharedCanvas {
    shapes: Vec<CanvasShape>,
    pub on_changed: CallbackList<CanvasChanged>,
}

impl SharedCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shape(&mut self, shape: CanvasShape) {
        self.shapes.push(shape);
        self.on_changed.notify(&CanvasChanged {
            shape_count: self.shapes.len(),
        });
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.on_changed.notify(&CanvasChanged { shape_count: 0 });
    }

    pub fn shapes(&self) -> &[CanvasShape] {
        &self.shapes
    }
}
