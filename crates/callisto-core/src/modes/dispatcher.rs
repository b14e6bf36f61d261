//! The mode-dispatch state machine.
//!
//! States: no active mode, or exactly one active mode. Esc always returns
//! to the idle state -- a lock is a persistence preference, not an
//! override of explicit exit.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{CallistoError, Result};

use super::bindings::{BindingTable, InputEvent};
use super::{Mode, ModeKind, ViewerAction};

/// Key that unconditionally exits the active mode.
pub(crate) const EXIT_KEY: &str = "escape";

/// Result of feeding one event through the dispatcher.
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
    /// A binding matched; the viewer should apply this action.
    Action(ViewerAction),
    /// A mode was entered.
    ModeEntered(String),
    /// The active mode exited.
    ModeExited(String),
    /// Nothing claimed the event.
    Unhandled,
}

#[derive(Debug)]
pub struct ModeDispatcher {
    modes: HashMap<String, Mode>,
    /// Activation key -> mode name.
    by_key: HashMap<String, String>,
    active: Option<String>,
    /// Bindings of the currently focused interactive canvas, if any.
    canvas: Option<BindingTable>,
    defaults: BindingTable,
    dragging: bool,
}

impl ModeDispatcher {
    /// Dispatcher with the given modeless default table.
    pub fn new(defaults: BindingTable) -> Self {
        Self {
            modes: HashMap::new(),
            by_key: HashMap::new(),
            active: None,
            canvas: None,
            defaults,
            dragging: false,
        }
    }

    /// Register a mode. Duplicate names or activation keys are
    /// configuration errors.
    pub fn register_mode(&mut self, mode: Mode) -> Result<()> {
        if self.modes.contains_key(&mode.name) {
            return Err(CallistoError::DuplicateMode(mode.name));
        }
        if let Some(owner) = self.by_key.get(&mode.activation_key) {
            return Err(CallistoError::DuplicateActivationKey {
                key: mode.activation_key,
                mode: owner.clone(),
            });
        }
        self.by_key
            .insert(mode.activation_key.clone(), mode.name.clone());
        self.modes.insert(mode.name.clone(), mode);
        Ok(())
    }

    /// Name of the active mode, if any.
    pub fn active_mode(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Enter a registered mode directly.
    pub fn activate(&mut self, name: &str) -> Result<()> {
        if !self.modes.contains_key(name) {
            return Err(CallistoError::UnknownMode(name.to_string()));
        }
        debug!(mode = name, "mode activated");
        self.active = Some(name.to_string());
        Ok(())
    }

    /// Give the focused canvas a binding table (tier 2 of resolution).
    pub fn set_focused_canvas(&mut self, bindings: Option<BindingTable>) {
        self.canvas = bindings;
    }

    pub fn set_default_bindings(&mut self, defaults: BindingTable) {
        self.defaults = defaults;
    }

    /// Resolve one input event.
    pub fn dispatch(&mut self, event: &InputEvent) -> DispatchOutcome {
        match event {
            InputEvent::KeyDown { key, .. } => self.dispatch_key_down(key, event),
            InputEvent::KeyUp { key, .. } => {
                // A held mode releases with its activation key.
                if let Some(name) = &self.active {
                    let mode = &self.modes[name];
                    if mode.kind == ModeKind::Held && *key == mode.activation_key {
                        return self.exit_active();
                    }
                }
                self.resolve(event)
            }
            InputEvent::ButtonDown { .. } => {
                self.dragging = true;
                self.resolve(event)
            }
            InputEvent::ButtonUp { .. } => {
                let out = self.resolve(event);
                if self.dragging {
                    self.dragging = false;
                    // A oneshot mode is spent once the drag completes.
                    let oneshot = self
                        .active
                        .as_ref()
                        .is_some_and(|name| self.modes[name].kind == ModeKind::Oneshot);
                    if oneshot {
                        let exited = self.exit_active();
                        if out == DispatchOutcome::Unhandled {
                            return exited;
                        }
                    }
                }
                out
            }
            _ => self.resolve(event),
        }
    }

    fn dispatch_key_down(&mut self, key: &str, event: &InputEvent) -> DispatchOutcome {
        if key == EXIT_KEY {
            if self.active.is_some() {
                return self.exit_active();
            }
            return self.resolve(event);
        }

        if let Some(name) = self.active.clone() {
            let kind = self.modes[&name].kind;
            if *key == self.modes[&name].activation_key {
                // The active mode's own key toggles it off.
                return self.exit_active();
            }
            // A locked mode persists across unrelated key presses,
            // including other modes' activation keys.
            if kind != ModeKind::Locked {
                if let Some(next) = self.by_key.get(key).cloned() {
                    debug!(from = %name, to = %next, "mode switched");
                    self.active = Some(next.clone());
                    return DispatchOutcome::ModeEntered(next);
                }
            }
        } else if let Some(next) = self.by_key.get(key).cloned() {
            debug!(mode = %next, "mode entered");
            self.active = Some(next.clone());
            return DispatchOutcome::ModeEntered(next);
        }

        self.resolve(event)
    }

    fn exit_active(&mut self) -> DispatchOutcome {
        match self.active.take() {
            Some(name) => {
                debug!(mode = %name, "mode exited");
                DispatchOutcome::ModeExited(name)
            }
            None => DispatchOutcome::Unhandled,
        }
    }

    /// Three-tier binding resolution: active mode, focused canvas,
    /// modeless defaults.
    fn resolve(&self, event: &InputEvent) -> DispatchOutcome {
        let kind = event.kind();
        let mods = event.mods();

        if let Some(name) = &self.active {
            if let Some(action) = self.modes[name].bindings.lookup(&kind, mods) {
                return DispatchOutcome::Action(action.clone());
            }
        }
        if let Some(canvas) = &self.canvas {
            if let Some(action) = canvas.lookup(&kind, mods) {
                return DispatchOutcome::Action(action.clone());
            }
        }
        if let Some(action) = self.defaults.lookup(&kind, mods) {
            return DispatchOutcome::Action(action.clone());
        }
        DispatchOutcome::Unhandled
    }
}
