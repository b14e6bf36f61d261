//! Typed observer lists.
//!
//! Each observable event category has its own payload type and its own
//! list; there is no string-keyed callback registry.

use std::fmt;

/// Subscribers for one event category, invoked with a typed payload.
pub struct CallbackList<T> {
    subscribers: Vec<Box<dyn Fn(&T) + Send + Sync>>,
}

impl<T> CallbackList<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    pub fn add(&mut self, f: impl Fn(&T) + Send + Sync + 'static) {
        self.subscribers.push(Box::new(f));
    }

    pub fn notify(&self, payload: &T) {
        for f in &self.subscribers {
            f(payload);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<T> Default for CallbackList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CallbackList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackList")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Payload for cut-level changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CutLevelsChanged {
    pub lo: f32,
    pub hi: f32,
}

/// Payload for pan-position changes (data coordinates).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanChanged {
    pub x: f64,
    pub y: f64,
}

/// Payload for scale changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleChanged {
    pub sx: f64,
    pub sy: f64,
}

/// Payload for flip/swap changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransformChanged {
    pub flip_x: bool,
    pub flip_y: bool,
    pub swap_xy: bool,
}

/// Payload for rotation changes (normalized degrees).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationChanged {
    pub deg: f64,
}

/// Payload for shared-canvas content changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasChanged {
    pub shape_count: usize,
}
