//! Input events, binding trigger grammar, and binding tables.
//!
//! Trigger grammar: `[<mode>+][<modifier>+]<event>`, where the mode and
//! modifier parts are optional and `*` matches any modifier combination.
//! Examples: `scroll`, `ctrl+left`, `*+scroll`, `pan+shift+drag-left`,
//! `contrast+right`, `t`.

use std::collections::HashMap;

use tracing::warn;

use crate::consts::PAN_STEP_PIXELS;
use crate::error::{CallistoError, Result};
use crate::viewport::Point;

use super::ViewerAction;

/// Keyboard modifier state attached to input events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub fn ctrl() -> Self {
        Modifiers {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn shift() -> Self {
        Modifiers {
            shift: true,
            ..Self::NONE
        }
    }
}

/// Mouse button identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Middle,
    Right,
}

/// The event class half of a trigger.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyPress(String),
    KeyRelease(String),
    ButtonDown(Button),
    ButtonDrag(Button),
    ButtonUp(Button),
    Scroll,
}

/// A concrete input event delivered to the dispatcher.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    KeyDown {
        key: String,
        mods: Modifiers,
    },
    KeyUp {
        key: String,
        mods: Modifiers,
    },
    ButtonDown {
        button: Button,
        mods: Modifiers,
        pos: Point,
    },
    ButtonDrag {
        button: Button,
        mods: Modifiers,
        pos: Point,
    },
    ButtonUp {
        button: Button,
        mods: Modifiers,
        pos: Point,
    },
    Scroll {
        mods: Modifiers,
        amount: f64,
        pos: Point,
    },
}

impl InputEvent {
    pub(crate) fn kind(&self) -> EventKind {
        match self {
            Self::KeyDown { key, .. } => EventKind::KeyPress(key.clone()),
            Self::KeyUp { key, .. } => EventKind::KeyRelease(key.clone()),
            Self::ButtonDown { button, .. } => EventKind::ButtonDown(*button),
            Self::ButtonDrag { button, .. } => EventKind::ButtonDrag(*button),
            Self::ButtonUp { button, .. } => EventKind::ButtonUp(*button),
            Self::Scroll { .. } => EventKind::Scroll,
        }
    }

    pub(crate) fn mods(&self) -> Modifiers {
        match self {
            Self::KeyDown { mods, .. }
            | Self::KeyUp { mods, .. }
            | Self::ButtonDown { mods, .. }
            | Self::ButtonDrag { mods, .. }
            | Self::ButtonUp { mods, .. }
            | Self::Scroll { mods, .. } => *mods,
        }
    }

    /// Cursor position, when the event carries one.
    pub fn pos(&self) -> Option<Point> {
        match self {
            Self::ButtonDown { pos, .. }
            | Self::ButtonDrag { pos, .. }
            | Self::ButtonUp { pos, .. }
            | Self::Scroll { pos, .. } => Some(*pos),
            _ => None,
        }
    }
}

/// Modifier pattern for a binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModMatch {
    /// `*`: any modifier combination.
    Any,
    /// Exactly this modifier set (no modifiers unless listed).
    Exact(Modifiers),
}

/// A parsed binding trigger.
#[derive(Clone, Debug, PartialEq)]
pub struct Trigger {
    /// Mode the binding is scoped to; `None` targets the modeless table.
    pub mode: Option<String>,
    pub mods: ModMatch,
    pub event: EventKind,
}

/// Parse the trigger grammar.
pub fn parse_trigger(s: &str) -> Result<Trigger> {
    let err = |reason: &str| CallistoError::InvalidTrigger {
        trigger: s.to_string(),
        reason: reason.to_string(),
    };

    let tokens: Vec<&str> = s.split('+').collect();
    if tokens.iter().any(|t| t.is_empty()) {
        return Err(err("empty token"));
    }
    let (&event_token, rest) = tokens.split_last().ok_or_else(|| err("empty trigger"))?;
    let event = parse_event_token(event_token).ok_or_else(|| err("unrecognized event token"))?;

    let mut mode = None;
    let mut mod_tokens = rest;
    if let Some((&first, tail)) = rest.split_first() {
        if !is_modifier_token(first) {
            mode = Some(first.to_string());
            mod_tokens = tail;
        }
    }

    let mods = if mod_tokens == ["*"] {
        ModMatch::Any
    } else {
        let mut m = Modifiers::NONE;
        for &tok in mod_tokens {
            match tok {
                "shift" => m.shift = true,
                "ctrl" => m.ctrl = true,
                "alt" => m.alt = true,
                "*" => return Err(err("wildcard cannot be combined with other modifiers")),
                _ => return Err(err("unrecognized modifier token")),
            }
        }
        ModMatch::Exact(m)
    };

    Ok(Trigger { mode, mods, event })
}

fn is_modifier_token(tok: &str) -> bool {
    matches!(tok, "shift" | "ctrl" | "alt" | "*")
}

fn parse_event_token(tok: &str) -> Option<EventKind> {
    if let Some(btn) = parse_button(tok) {
        return Some(EventKind::ButtonDown(btn));
    }
    if let Some(rest) = tok.strip_prefix("drag-") {
        return parse_button(rest).map(EventKind::ButtonDrag);
    }
    if let Some(rest) = tok.strip_prefix("release-") {
        return parse_button(rest).map(EventKind::ButtonUp);
    }
    if tok == "scroll" {
        return Some(EventKind::Scroll);
    }
    // Anything else is a key name: a single printable word with no
    // whitespace.
    if !tok.is_empty() && !tok.contains(char::is_whitespace) {
        return Some(EventKind::KeyPress(tok.to_string()));
    }
    None
}

fn parse_button(tok: &str) -> Option<Button> {
    match tok {
        "left" => Some(Button::Left),
        "middle" => Some(Button::Middle),
        "right" => Some(Button::Right),
        _ => None,
    }
}

/// Maps (event kind, modifiers) to viewer actions.
///
/// Exact-modifier bindings take precedence over wildcard bindings for the
/// same event kind.
#[derive(Clone, Debug, Default)]
pub struct BindingTable {
    exact: HashMap<(EventKind, Modifiers), ViewerAction>,
    wildcard: HashMap<EventKind, ViewerAction>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, mods: ModMatch, event: EventKind, action: ViewerAction) {
        match mods {
            ModMatch::Any => {
                self.wildcard.insert(event, action);
            }
            ModMatch::Exact(m) => {
                self.exact.insert((event, m), action);
            }
        }
    }

    pub fn lookup(&self, event: &EventKind, mods: Modifiers) -> Option<&ViewerAction> {
        self.exact
            .get(&(event.clone(), mods))
            .or_else(|| self.wildcard.get(event))
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.wildcard.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.wildcard.len()
    }
}

/// Modeless default bindings plus named per-mode tables.
#[derive(Clone, Debug, Default)]
pub struct BindingMap {
    pub defaults: BindingTable,
    pub per_mode: HashMap<String, BindingTable>,
}

impl BindingMap {
    /// Built-in defaults: scroll zooms, arrows pan, `=`/`-` zoom in/out,
    /// `0` fits.
    pub fn builtin() -> Self {
        let mut defaults = BindingTable::new();
        defaults.bind(ModMatch::Any, EventKind::Scroll, ViewerAction::ZoomScroll);
        defaults.bind(
            ModMatch::Exact(Modifiers::NONE),
            EventKind::KeyPress("=".into()),
            ViewerAction::ZoomIn,
        );
        defaults.bind(
            ModMatch::Exact(Modifiers::NONE),
            EventKind::KeyPress("-".into()),
            ViewerAction::ZoomOut,
        );
        defaults.bind(
            ModMatch::Exact(Modifiers::NONE),
            EventKind::KeyPress("0".into()),
            ViewerAction::ZoomFit,
        );
        defaults.bind(
            ModMatch::Exact(Modifiers::NONE),
            EventKind::KeyPress("up".into()),
            ViewerAction::PanStep {
                dx: 0.0,
                dy: PAN_STEP_PIXELS,
            },
        );
        defaults.bind(
            ModMatch::Exact(Modifiers::NONE),
            EventKind::KeyPress("down".into()),
            ViewerAction::PanStep {
                dx: 0.0,
                dy: -PAN_STEP_PIXELS,
            },
        );
        defaults.bind(
            ModMatch::Exact(Modifiers::NONE),
            EventKind::KeyPress("left".into()),
            ViewerAction::PanStep {
                dx: -PAN_STEP_PIXELS,
                dy: 0.0,
            },
        );
        defaults.bind(
            ModMatch::Exact(Modifiers::NONE),
            EventKind::KeyPress("right".into()),
            ViewerAction::PanStep {
                dx: PAN_STEP_PIXELS,
                dy: 0.0,
            },
        );
        Self {
            defaults,
            per_mode: HashMap::new(),
        }
    }

    /// Load from trigger/action pairs. The first malformed trigger aborts
    /// the load with its parse error.
    pub fn load(pairs: &[(&str, ViewerAction)]) -> Result<Self> {
        let mut map = Self::default();
        for (trigger, action) in pairs {
            let t = parse_trigger(trigger)?;
            let table = match t.mode {
                Some(name) => map.per_mode.entry(name).or_default(),
                None => &mut map.defaults,
            };
            table.bind(t.mods, t.event, action.clone());
        }
        Ok(map)
    }

    /// Load, falling back to the built-in defaults on a parse error.
    pub fn load_or_builtin(pairs: &[(&str, ViewerAction)]) -> Self {
        match Self::load(pairs) {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "binding load failed; using built-in defaults");
                Self::builtin()
            }
        }
    }
}
