//! Input modes and the event-dispatch state machine.
//!
//! A mode is a temporary rebinding of input events to viewer operations
//! with defined activation, exit, and lock semantics. Event resolution is
//! three-tiered: the active mode's table, then the focused canvas table,
//! then the modeless defaults; the first match wins.

pub mod bindings;
mod dispatcher;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use bindings::{
    parse_trigger, BindingMap, BindingTable, Button, EventKind, InputEvent, ModMatch, Modifiers,
    Trigger,
};
pub use dispatcher::{DispatchOutcome, ModeDispatcher};

/// Exit/persistence semantics of an input mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeKind {
    /// Active only while the activation key is held down.
    Held,
    /// Exits once a complete cursor drag finishes.
    Oneshot,
    /// Persists until its own activation key is pressed again or Esc.
    Locked,
    /// Persists until a different mode's activation key or Esc.
    Softlock,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Held => "held",
            Self::Oneshot => "oneshot",
            Self::Locked => "locked",
            Self::Softlock => "softlock",
        };
        write!(f, "{s}")
    }
}

/// A named rebinding of input events to viewer operations.
#[derive(Clone, Debug)]
pub struct Mode {
    pub name: String,
    pub kind: ModeKind,
    pub activation_key: String,
    pub bindings: BindingTable,
}

impl Mode {
    pub fn new(
        name: impl Into<String>,
        kind: ModeKind,
        activation_key: impl Into<String>,
        bindings: BindingTable,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            activation_key: activation_key.into(),
            bindings,
        }
    }
}

/// Operations a binding can invoke on the viewer.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewerAction {
    ZoomIn,
    ZoomOut,
    /// Scroll-driven zoom; direction comes from the event's scroll amount.
    ZoomScroll,
    ZoomFit,
    ZoomTo(i32),
    /// Center the view on the event's window position.
    PanTo,
    /// Pan by a fixed window-pixel step.
    PanStep { dx: f64, dy: f64 },
    RotateBy(f64),
    RotateReset,
    FlipX,
    FlipY,
    SwapXy,
    TransformReset,
    /// Re-estimate cut levels with the configured method.
    AutoCuts,
    /// Interactive cut-level adjustment from the cursor position.
    CutsDrag,
    /// Interactive contrast/brightness adjustment from the cursor position.
    ContrastDrag,
    NextDistribution,
    NextColorMap,
}
