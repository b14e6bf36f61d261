use callisto_core::error::CallistoError;
use callisto_core::modes::{
    parse_trigger, BindingMap, BindingTable, Button, DispatchOutcome, EventKind, InputEvent,
    ModMatch, Mode, ModeDispatcher, ModeKind, Modifiers, ViewerAction,
};
use callisto_core::viewport::Point;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn key_down(key: &str) -> InputEvent {
    InputEvent::KeyDown {
        key: key.to_string(),
        mods: Modifiers::NONE,
    }
}

fn key_up(key: &str) -> InputEvent {
    InputEvent::KeyUp {
        key: key.to_string(),
        mods: Modifiers::NONE,
    }
}

fn button_down() -> InputEvent {
    InputEvent::ButtonDown {
        button: Button::Left,
        mods: Modifiers::NONE,
        pos: Point::new(100.0, 100.0),
    }
}

fn button_up() -> InputEvent {
    InputEvent::ButtonUp {
        button: Button::Left,
        mods: Modifiers::NONE,
        pos: Point::new(120.0, 110.0),
    }
}

fn scroll(amount: f64) -> InputEvent {
    InputEvent::Scroll {
        mods: Modifiers::NONE,
        amount,
        pos: Point::new(400.0, 300.0),
    }
}

fn mode(name: &str, kind: ModeKind, key: &str) -> Mode {
    Mode::new(name, kind, key, BindingTable::new())
}

/// Dispatcher with one mode of each kind and the built-in defaults.
fn dispatcher() -> ModeDispatcher {
    let mut d = ModeDispatcher::new(BindingMap::builtin().defaults);
    d.register_mode(mode("pan", ModeKind::Held, "q")).unwrap();
    d.register_mode(mode("contrast", ModeKind::Oneshot, "t"))
        .unwrap();
    d.register_mode(mode("rotate", ModeKind::Locked, "r"))
        .unwrap();
    d.register_mode(mode("cuts", ModeKind::Softlock, "s"))
        .unwrap();
    d
}

// ---------------------------------------------------------------------------
// Activation and registration
// ---------------------------------------------------------------------------

#[test]
fn test_activation_key_enters_mode() {
    let mut d = dispatcher();
    assert_eq!(d.active_mode(), None);
    assert_eq!(
        d.dispatch(&key_down("q")),
        DispatchOutcome::ModeEntered("pan".into())
    );
    assert_eq!(d.active_mode(), Some("pan"));
}

#[test]
fn test_own_activation_key_toggles_off() {
    let mut d = dispatcher();
    d.dispatch(&key_down("r"));
    assert_eq!(d.active_mode(), Some("rotate"));
    assert_eq!(
        d.dispatch(&key_down("r")),
        DispatchOutcome::ModeExited("rotate".into())
    );
    assert_eq!(d.active_mode(), None);
}

#[test]
fn test_duplicate_mode_rejected() {
    let mut d = dispatcher();
    let err = d
        .register_mode(mode("pan", ModeKind::Held, "z"))
        .unwrap_err();
    assert!(matches!(err, CallistoError::DuplicateMode(_)));
}

#[test]
fn test_duplicate_activation_key_rejected() {
    let mut d = dispatcher();
    let err = d
        .register_mode(mode("other", ModeKind::Held, "q"))
        .unwrap_err();
    assert!(matches!(err, CallistoError::DuplicateActivationKey { .. }));
}

#[test]
fn test_activate_unknown_mode_is_error() {
    let mut d = dispatcher();
    assert!(matches!(
        d.activate("nonexistent"),
        Err(CallistoError::UnknownMode(_))
    ));
}

// ---------------------------------------------------------------------------
// Esc exit guarantee -- every mode kind
// ---------------------------------------------------------------------------

#[test]
fn test_escape_exits_every_mode_kind() {
    for key in ["q", "t", "r", "s"] {
        let mut d = dispatcher();
        d.dispatch(&key_down(key));
        assert!(d.active_mode().is_some(), "mode under {key} should enter");
        let out = d.dispatch(&key_down("escape"));
        assert!(
            matches!(out, DispatchOutcome::ModeExited(_)),
            "escape must exit the mode entered by {key}"
        );
        assert_eq!(d.active_mode(), None);
    }
}

#[test]
fn test_escape_with_no_mode_is_unhandled() {
    let mut d = dispatcher();
    assert_eq!(d.dispatch(&key_down("escape")), DispatchOutcome::Unhandled);
}

// ---------------------------------------------------------------------------
// Lock semantics
// ---------------------------------------------------------------------------

#[test]
fn test_held_mode_exits_on_key_release() {
    let mut d = dispatcher();
    d.dispatch(&key_down("q"));
    assert_eq!(d.active_mode(), Some("pan"));
    assert_eq!(
        d.dispatch(&key_up("q")),
        DispatchOutcome::ModeExited("pan".into())
    );
    assert_eq!(d.active_mode(), None);
}

#[test]
fn test_oneshot_exits_after_complete_drag() {
    let mut d = dispatcher();
    d.dispatch(&key_down("t"));
    assert_eq!(d.active_mode(), Some("contrast"));
    d.dispatch(&button_down());
    assert_eq!(d.active_mode(), Some("contrast"));
    d.dispatch(&button_up());
    assert_eq!(d.active_mode(), None);
}

#[test]
fn test_locked_mode_survives_other_activation_keys() {
    let mut d = dispatcher();
    d.dispatch(&key_down("r"));
    assert_eq!(d.active_mode(), Some("rotate"));
    // Another mode's activation key is an unrelated key press.
    d.dispatch(&key_down("s"));
    assert_eq!(d.active_mode(), Some("rotate"));
    d.dispatch(&key_down("q"));
    assert_eq!(d.active_mode(), Some("rotate"));
}

#[test]
fn test_locked_mode_survives_drags() {
    let mut d = dispatcher();
    d.dispatch(&key_down("r"));
    d.dispatch(&button_down());
    d.dispatch(&button_up());
    assert_eq!(d.active_mode(), Some("rotate"));
}

#[test]
fn test_softlock_yields_to_other_mode() {
    let mut d = dispatcher();
    d.dispatch(&key_down("s"));
    assert_eq!(d.active_mode(), Some("cuts"));
    assert_eq!(
        d.dispatch(&key_down("r")),
        DispatchOutcome::ModeEntered("rotate".into())
    );
    assert_eq!(d.active_mode(), Some("rotate"));
}

#[test]
fn test_held_yields_to_other_mode() {
    let mut d = dispatcher();
    d.dispatch(&key_down("q"));
    assert_eq!(
        d.dispatch(&key_down("t")),
        DispatchOutcome::ModeEntered("contrast".into())
    );
}

// ---------------------------------------------------------------------------
// Three-tier resolution order
// ---------------------------------------------------------------------------

#[test]
fn test_resolution_order_mode_canvas_defaults() {
    let mut mode_table = BindingTable::new();
    mode_table.bind(ModMatch::Any, EventKind::Scroll, ViewerAction::ZoomFit);
    let mut canvas_table = BindingTable::new();
    canvas_table.bind(ModMatch::Any, EventKind::Scroll, ViewerAction::ZoomIn);
    let mut defaults = BindingTable::new();
    defaults.bind(ModMatch::Any, EventKind::Scroll, ViewerAction::ZoomOut);

    let mut d = ModeDispatcher::new(defaults);
    d.register_mode(Mode::new("m", ModeKind::Locked, "m", mode_table))
        .unwrap();

    // Tier 3: nothing claims the event but the defaults.
    assert_eq!(
        d.dispatch(&scroll(1.0)),
        DispatchOutcome::Action(ViewerAction::ZoomOut)
    );

    // Tier 2: the focused canvas masks the defaults.
    d.set_focused_canvas(Some(canvas_table));
    assert_eq!(
        d.dispatch(&scroll(1.0)),
        DispatchOutcome::Action(ViewerAction::ZoomIn)
    );

    // Tier 1: the active mode masks everything.
    d.dispatch(&key_down("m"));
    assert_eq!(
        d.dispatch(&scroll(1.0)),
        DispatchOutcome::Action(ViewerAction::ZoomFit)
    );

    // Dropping focus and mode restores the default binding.
    d.dispatch(&key_down("escape"));
    d.set_focused_canvas(None);
    assert_eq!(
        d.dispatch(&scroll(1.0)),
        DispatchOutcome::Action(ViewerAction::ZoomOut)
    );
}

#[test]
fn test_exact_modifier_binding_beats_wildcard() {
    let mut defaults = BindingTable::new();
    defaults.bind(ModMatch::Any, EventKind::Scroll, ViewerAction::ZoomIn);
    defaults.bind(
        ModMatch::Exact(Modifiers::ctrl()),
        EventKind::Scroll,
        ViewerAction::ZoomOut,
    );
    let mut d = ModeDispatcher::new(defaults);
    let ev = InputEvent::Scroll {
        mods: Modifiers::ctrl(),
        amount: 1.0,
        pos: Point::new(0.0, 0.0),
    };
    assert_eq!(
        d.dispatch(&ev),
        DispatchOutcome::Action(ViewerAction::ZoomOut)
    );
    assert_eq!(
        d.dispatch(&scroll(1.0)),
        DispatchOutcome::Action(ViewerAction::ZoomIn)
    );
}

// ---------------------------------------------------------------------------
// Trigger grammar
// ---------------------------------------------------------------------------

#[test]
fn test_parse_plain_event() {
    let t = parse_trigger("scroll").unwrap();
    assert_eq!(t.mode, None);
    assert_eq!(t.mods, ModMatch::Exact(Modifiers::NONE));
    assert_eq!(t.event, EventKind::Scroll);
}

#[test]
fn test_parse_modifier_and_button() {
    let t = parse_trigger("ctrl+left").unwrap();
    assert_eq!(t.mode, None);
    assert_eq!(t.mods, ModMatch::Exact(Modifiers::ctrl()));
    assert_eq!(t.event, EventKind::ButtonDown(Button::Left));
}

#[test]
fn test_parse_wildcard_modifier() {
    let t = parse_trigger("*+scroll").unwrap();
    assert_eq!(t.mods, ModMatch::Any);
}

#[test]
fn test_parse_mode_scoped_drag() {
    let t = parse_trigger("pan+shift+drag-left").unwrap();
    assert_eq!(t.mode.as_deref(), Some("pan"));
    assert_eq!(t.mods, ModMatch::Exact(Modifiers::shift()));
    assert_eq!(t.event, EventKind::ButtonDrag(Button::Left));
}

#[test]
fn test_parse_bare_key() {
    let t = parse_trigger("t").unwrap();
    assert_eq!(t.event, EventKind::KeyPress("t".into()));
}

#[test]
fn test_parse_release_button() {
    let t = parse_trigger("release-middle").unwrap();
    assert_eq!(t.event, EventKind::ButtonUp(Button::Middle));
}

#[test]
fn test_parse_errors() {
    for bad in ["", "ctrl++x", "shift+*+scroll", "drag-banana", "release-"] {
        let err = parse_trigger(bad);
        assert!(
            matches!(err, Err(CallistoError::InvalidTrigger { .. })),
            "trigger {bad:?} should fail to parse"
        );
    }
}

#[test]
fn test_binding_map_load_scopes_mode_triggers() {
    let map = BindingMap::load(&[
        ("scroll", ViewerAction::ZoomScroll),
        ("pan+left", ViewerAction::PanTo),
    ])
    .unwrap();
    assert!(map
        .defaults
        .lookup(&EventKind::Scroll, Modifiers::NONE)
        .is_some());
    assert!(map.per_mode["pan"]
        .lookup(&EventKind::ButtonDown(Button::Left), Modifiers::NONE)
        .is_some());
}

#[test]
fn test_binding_map_falls_back_to_builtin_on_parse_error() {
    let map = BindingMap::load_or_builtin(&[("ctrl++scroll", ViewerAction::ZoomScroll)]);
    // The malformed set is discarded wholesale; the built-in defaults
    // still bind scroll.
    assert_eq!(
        map.defaults.lookup(&EventKind::Scroll, Modifiers::NONE),
        Some(&ViewerAction::ZoomScroll)
    );
    assert!(map.per_mode.is_empty());
}
