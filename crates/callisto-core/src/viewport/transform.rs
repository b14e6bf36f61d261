//! Viewport state and the data<->window coordinate transform.
//!
//! The forward transform composes, in this fixed order: translate so the
//! pan point is the origin, flip per axis, swap axes, rotate, scale, then
//! translate so the origin lands at the window center. The inverse applies
//! the exact inverse operations in reverse order. This order is a
//! contract; reordering changes the visual meaning of rotate-vs-swap and
//! breaks the round-trip tests.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::callback::{
    CallbackList, PanChanged, RotationChanged, ScaleChanged, TransformChanged,
};
use crate::consts::{DEFAULT_SCALE_MAX, DEFAULT_SCALE_MIN};
use crate::error::{CallistoError, Result};

use super::zoom::ZoomAlgorithm;

/// A point in data or window coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box in data space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataBounds {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl DataBounds {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }
}

/// Coordinate space selector for pan operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordSpace {
    Data,
    Wcs,
}

/// Capability interface for world-coordinate backends.
///
/// Any plate solution or WCS library can back pan positions by
/// implementing the two conversions; the viewport depends only on this
/// trait, never on a concrete backend type.
pub trait WorldCoords: Send + Sync {
    /// Data pixel -> world coordinates (e.g. RA/Dec degrees).
    fn pix_to_world(&self, pt: Point) -> Result<Point>;
    /// World coordinates -> data pixel.
    fn world_to_pix(&self, pt: Point) -> Result<Point>;
}

/// Per-viewer viewport: scale, pan, flip/swap, rotation, zoom level.
pub struct Viewport {
    scale_x: f64,
    scale_y: f64,
    pan_x: f64,
    pan_y: f64,
    flip_x: bool,
    flip_y: bool,
    swap_xy: bool,
    rot_deg: f64,
    win_width: f64,
    win_height: f64,
    scale_min: f64,
    scale_max: f64,
    limits: Option<DataBounds>,
    zoom_alg: ZoomAlgorithm,
    zoom_level: i32,
    wcs: Option<Arc<dyn WorldCoords>>,
    pub on_pan_changed: CallbackList<PanChanged>,
    pub on_scale_changed: CallbackList<ScaleChanged>,
    pub on_transform_changed: CallbackList<TransformChanged>,
    pub on_rotation_changed: CallbackList<RotationChanged>,
}

impl Viewport {
    pub fn new(win_width: u32, win_height: u32) -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            flip_x: false,
            flip_y: false,
            swap_xy: false,
            rot_deg: 0.0,
            win_width: win_width as f64,
            win_height: win_height as f64,
            scale_min: DEFAULT_SCALE_MIN,
            scale_max: DEFAULT_SCALE_MAX,
            limits: None,
            zoom_alg: ZoomAlgorithm::default(),
            zoom_level: 0,
            wcs: None,
            on_pan_changed: CallbackList::new(),
            on_scale_changed: CallbackList::new(),
            on_transform_changed: CallbackList::new(),
            on_rotation_changed: CallbackList::new(),
        }
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.win_width = width as f64;
        self.win_height = height as f64;
    }

    pub fn window_size(&self) -> (f64, f64) {
        (self.win_width, self.win_height)
    }

    // -- scale ------------------------------------------------------------

    /// Set per-axis scale, silently clamped to the configured limits.
    pub fn set_scale(&mut self, sx: f64, sy: f64) {
        let cx = sx.clamp(self.scale_min, self.scale_max);
        let cy = sy.clamp(self.scale_min, self.scale_max);
        if cx != sx || cy != sy {
            debug!(sx, sy, min = self.scale_min, max = self.scale_max, "scale clamped");
        }
        self.scale_x = cx;
        self.scale_y = cy;
        self.zoom_level = self.zoom_alg.level_of(self.scale_max_axis());
        self.on_scale_changed
            .notify(&ScaleChanged { sx: cx, sy: cy });
    }

    pub fn scale_xy(&self) -> (f64, f64) {
        (self.scale_x, self.scale_y)
    }

    /// Larger of the two axis scales.
    pub fn scale_max_axis(&self) -> f64 {
        self.scale_x.max(self.scale_y)
    }

    pub fn set_scale_limits(&mut self, min: f64, max: f64) -> Result<()> {
        if !(min > 0.0) || !(min < max) {
            return Err(CallistoError::InvalidScaleLimits { min, max });
        }
        self.scale_min = min;
        self.scale_max = max;
        // Re-clamp the current scale against the new limits.
        self.set_scale(self.scale_x, self.scale_y);
        Ok(())
    }

    pub fn scale_limits(&self) -> (f64, f64) {
        (self.scale_min, self.scale_max)
    }

    // -- zoom -------------------------------------------------------------

    pub fn set_zoom_algorithm(&mut self, alg: ZoomAlgorithm) {
        self.zoom_alg = alg;
        self.zoom_level = alg.level_of(self.scale_max_axis());
    }

    pub fn zoom_algorithm(&self) -> ZoomAlgorithm {
        self.zoom_alg
    }

    /// Jump to an integer zoom level. If the resulting scale is clamped,
    /// the reported level reflects the actual scale.
    pub fn zoom_to(&mut self, level: i32) {
        let s = self.zoom_alg.scale_of(level);
        self.set_scale(s, s);
    }

    pub fn zoom_in(&mut self, steps: i32) {
        self.zoom_to(self.zoom_level + steps);
    }

    pub fn zoom_out(&mut self, steps: i32) {
        self.zoom_to(self.zoom_level - steps);
    }

    /// Nearest zoom level for the current scale.
    pub fn zoom_level(&self) -> i32 {
        self.zoom_level
    }

    /// Scale so the data limits fit inside the window, both axes equal.
    /// No-op without limits or with a degenerate box.
    pub fn zoom_fit(&mut self) {
        let Some(bounds) = self.limits else {
            debug!("zoom_fit skipped: no data limits");
            return;
        };
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return;
        }
        let s = (self.win_width / bounds.width()).min(self.win_height / bounds.height());
        self.set_scale(s, s);
    }

    // -- pan --------------------------------------------------------------

    /// Set the data point held at the window center.
    pub fn set_pan(&mut self, pt: Point, space: CoordSpace) -> Result<()> {
        let p = match space {
            CoordSpace::Data => pt,
            CoordSpace::Wcs => self
                .wcs
                .as_ref()
                .ok_or(CallistoError::NoWorldCoords)?
                .world_to_pix(pt)?,
        };
        self.pan_x = p.x;
        self.pan_y = p.y;
        self.on_pan_changed.notify(&PanChanged { x: p.x, y: p.y });
        Ok(())
    }

    pub fn pan(&self, space: CoordSpace) -> Result<Point> {
        let p = Point::new(self.pan_x, self.pan_y);
        match space {
            CoordSpace::Data => Ok(p),
            CoordSpace::Wcs => self
                .wcs
                .as_ref()
                .ok_or(CallistoError::NoWorldCoords)?
                .pix_to_world(p),
        }
    }

    pub fn set_wcs(&mut self, wcs: Arc<dyn WorldCoords>) {
        self.wcs = Some(wcs);
    }

    pub fn clear_wcs(&mut self) {
        self.wcs = None;
    }

    // -- flip / swap / rotate ---------------------------------------------

    /// Apply a flip/swap action: each `true` toggles that axis. Applying
    /// the same action twice restores the prior state.
    pub fn transform(&mut self, flip_x: bool, flip_y: bool, swap_xy: bool) {
        self.flip_x ^= flip_x;
        self.flip_y ^= flip_y;
        self.swap_xy ^= swap_xy;
        self.on_transform_changed.notify(&TransformChanged {
            flip_x: self.flip_x,
            flip_y: self.flip_y,
            swap_xy: self.swap_xy,
        });
    }

    pub fn transforms(&self) -> (bool, bool, bool) {
        (self.flip_x, self.flip_y, self.swap_xy)
    }

    /// Rotate by `deg` relative to the current rotation.
    pub fn rotate(&mut self, deg: f64) {
        self.set_rotation(self.rot_deg + deg);
    }

    /// Set the absolute rotation, normalized to [0, 360).
    pub fn set_rotation(&mut self, deg: f64) {
        self.rot_deg = deg.rem_euclid(360.0);
        self.on_rotation_changed
            .notify(&RotationChanged { deg: self.rot_deg });
    }

    /// Current rotation in [0, 360) degrees.
    pub fn rotation(&self) -> f64 {
        self.rot_deg
    }

    // -- limits -----------------------------------------------------------

    pub fn set_limits(&mut self, bounds: DataBounds) {
        self.limits = Some(bounds);
    }

    pub fn limits(&self) -> Option<DataBounds> {
        self.limits
    }

    // -- coordinate conversion --------------------------------------------

    /// Map a data-space point to window space.
    pub fn data_to_window(&self, pt: Point) -> Point {
        let mut x = pt.x - self.pan_x;
        let mut y = pt.y - self.pan_y;
        if self.flip_x {
            x = -x;
        }
        if self.flip_y {
            y = -y;
        }
        if self.swap_xy {
            std::mem::swap(&mut x, &mut y);
        }
        let (sin, cos) = self.rot_deg.to_radians().sin_cos();
        let (rx, ry) = (x * cos - y * sin, x * sin + y * cos);
        Point::new(
            rx * self.scale_x + self.win_width / 2.0,
            ry * self.scale_y + self.win_height / 2.0,
        )
    }

    /// Map a window-space point back to data space. Exact inverse of
    /// [`Viewport::data_to_window`] up to floating-point tolerance.
    pub fn window_to_data(&self, pt: Point) -> Point {
        let x = (pt.x - self.win_width / 2.0) / self.scale_x;
        let y = (pt.y - self.win_height / 2.0) / self.scale_y;
        let (sin, cos) = (-self.rot_deg.to_radians()).sin_cos();
        let (mut x, mut y) = (x * cos - y * sin, x * sin + y * cos);
        if self.swap_xy {
            std::mem::swap(&mut x, &mut y);
        }
        if self.flip_y {
            y = -y;
        }
        if self.flip_x {
            x = -x;
        }
        Point::new(x + self.pan_x, y + self.pan_y)
    }
}

impl fmt::Debug for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewport")
            .field("scale_x", &self.scale_x)
            .field("scale_y", &self.scale_y)
            .field("pan_x", &self.pan_x)
            .field("pan_y", &self.pan_y)
            .field("flip_x", &self.flip_x)
            .field("flip_y", &self.flip_y)
            .field("swap_xy", &self.swap_xy)
            .field("rot_deg", &self.rot_deg)
            .field("zoom_level", &self.zoom_level)
            .field("has_wcs", &self.wcs.is_some())
            .finish()
    }
}
