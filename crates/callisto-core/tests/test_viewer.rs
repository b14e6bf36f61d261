use std::sync::Arc;
use std::time::{Duration, Instant};

use ndarray::Array2;

use callisto_core::autocuts::AutoCutMethod;
use callisto_core::image::ImageData;
use callisto_core::modes::{
    BindingTable, Button, EventKind, InputEvent, ModMatch, Mode, ModeKind, Modifiers, ViewerAction,
};
use callisto_core::settings::{AutoBehavior, ViewerConfig};
use callisto_core::viewer::{ImageViewer, RedrawReason, RedrawScheduler};
use callisto_core::viewport::{CoordSpace, Point};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn image(h: usize, w: usize, lo: f32, hi: f32) -> Arc<ImageData> {
    let span = hi - lo;
    let data = Array2::from_shape_fn((h, w), |(row, col)| {
        lo + span * ((row * w + col) as f32) / ((h * w - 1) as f32)
    });
    Arc::new(ImageData::new(data))
}

fn viewer_with_autocuts(behavior: AutoBehavior) -> ImageViewer {
    let config = ViewerConfig {
        autocuts: behavior,
        autocut_method: AutoCutMethod::Minmax,
        ..ViewerConfig::default()
    };
    ImageViewer::with_config(800, 600, config)
}

/// Poll the background job until a result is consumed or the job is gone.
fn drain_background(viewer: &mut ImageViewer) -> Option<callisto_core::error::Result<()>> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(result) = viewer.poll_background() {
            return Some(result.map(|_| ()));
        }
        if !viewer.background_pending() {
            return None;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    panic!("background job did not settle in time");
}

// ---------------------------------------------------------------------------
// Redraw coalescing
// ---------------------------------------------------------------------------

#[test]
fn test_redraw_last_request_wins() {
    let mut sched = RedrawScheduler::default();
    let first = sched.request(RedrawReason::PipelineChanged);
    let second = sched.request(RedrawReason::TransformChanged);
    assert!(second > first);
    let (serial, reason) = sched.take().unwrap();
    assert_eq!(serial, second);
    assert_eq!(reason, RedrawReason::TransformChanged);
    assert!(sched.take().is_none());
}

#[test]
fn test_viewer_coalesces_rapid_changes() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::Off);
    viewer.set_image(image(16, 16, 0.0, 100.0));
    viewer.take_redraw();
    for _ in 0..10 {
        viewer.zoom_in(1);
    }
    // Ten zooms, one pending redraw.
    assert!(viewer.take_redraw().is_some());
    assert!(viewer.take_redraw().is_none());
}

// ---------------------------------------------------------------------------
// Auto behaviors on image swap
// ---------------------------------------------------------------------------

#[test]
fn test_autocuts_on_applies_data_range() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::On);
    viewer.set_image(image(32, 32, 10.0, 500.0));
    let cuts = viewer.cut_levels();
    assert_eq!(cuts.lo, 10.0);
    assert_eq!(cuts.hi, 500.0);
}

#[test]
fn test_autocuts_off_keeps_default_range() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::Off);
    viewer.set_image(image(32, 32, 10.0, 500.0));
    let cuts = viewer.cut_levels();
    assert_eq!((cuts.lo, cuts.hi), (0.0, 1.0));
}

#[test]
fn test_autocuts_once_applies_only_to_first_image() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::Once);
    viewer.set_image(image(32, 32, 10.0, 500.0));
    assert_eq!(viewer.cut_levels().hi, 500.0);
    viewer.set_image(image(32, 32, 0.0, 9000.0));
    // Second image does not re-trigger.
    assert_eq!(viewer.cut_levels().hi, 500.0);
}

#[test]
fn test_autocuts_on_respects_manual_adjustment() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::On);
    viewer.set_image(image(32, 32, 10.0, 500.0));
    viewer.set_cut_levels(50.0, 60.0).unwrap();
    viewer.set_image(image(32, 32, 0.0, 9000.0));
    // The manual choice survives the image swap.
    assert_eq!((viewer.cut_levels().lo, viewer.cut_levels().hi), (50.0, 60.0));
}

#[test]
fn test_autocuts_override_ignores_manual_adjustment() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::Override);
    viewer.set_image(image(32, 32, 10.0, 500.0));
    viewer.set_cut_levels(50.0, 60.0).unwrap();
    viewer.set_image(image(32, 32, 0.0, 9000.0));
    assert_eq!(viewer.cut_levels().hi, 9000.0);
}

#[test]
fn test_all_nan_image_falls_back_to_default_range() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::On);
    let data = Array2::<f32>::from_elem((16, 16), f32::NAN);
    viewer.set_image(Arc::new(ImageData::new(data)));
    let cuts = viewer.cut_levels();
    assert_eq!((cuts.lo, cuts.hi), (0.0, 1.0));
}

#[test]
fn test_autocenter_pans_to_image_center() {
    let config = ViewerConfig {
        autocuts: AutoBehavior::Off,
        autocenter: AutoBehavior::On,
        ..ViewerConfig::default()
    };
    let mut viewer = ImageViewer::with_config(800, 600, config);
    viewer.set_image(image(100, 200, 0.0, 1.0));
    let pan = viewer.pan(CoordSpace::Data).unwrap();
    assert_eq!(pan, Point::new(100.0, 50.0));
}

#[test]
fn test_autozoom_fits_image() {
    let config = ViewerConfig {
        autocuts: AutoBehavior::Off,
        autozoom: AutoBehavior::On,
        ..ViewerConfig::default()
    };
    let mut viewer = ImageViewer::with_config(800, 600, config);
    viewer.set_image(image(300, 400, 0.0, 1.0));
    assert_eq!(viewer.scale_xy(), (2.0, 2.0));
}

// ---------------------------------------------------------------------------
// Background estimation
// ---------------------------------------------------------------------------

#[test]
fn test_background_estimate_applies_on_poll() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::Off);
    viewer.set_image(image(64, 64, 5.0, 250.0));
    viewer
        .auto_levels_background(AutoCutMethod::Minmax)
        .unwrap();
    let result = drain_background(&mut viewer);
    assert!(matches!(result, Some(Ok(()))));
    let cuts = viewer.cut_levels();
    assert_eq!((cuts.lo, cuts.hi), (5.0, 250.0));
}

#[test]
fn test_cancelled_background_result_is_discarded() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::Off);
    viewer.set_image(image(64, 64, 5.0, 250.0));
    viewer
        .auto_levels_background(AutoCutMethod::Minmax)
        .unwrap();
    viewer.cancel_background();
    let result = drain_background(&mut viewer);
    assert!(result.is_none(), "cancelled result must be discarded");
    assert_eq!((viewer.cut_levels().lo, viewer.cut_levels().hi), (0.0, 1.0));
}

#[test]
fn test_image_swap_cancels_inflight_estimate() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::Off);
    viewer.set_image(image(64, 64, 5.0, 250.0));
    viewer
        .auto_levels_background(AutoCutMethod::Minmax)
        .unwrap();
    // Swapping the image supersedes the running estimate.
    viewer.set_image(image(64, 64, 0.0, 9000.0));
    let result = drain_background(&mut viewer);
    assert!(result.is_none());
    assert_eq!((viewer.cut_levels().lo, viewer.cut_levels().hi), (0.0, 1.0));
}

#[test]
fn test_render_proceeds_while_estimate_pending() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::Off);
    viewer.set_image(image(32, 32, 0.0, 100.0));
    viewer
        .auto_levels_background(AutoCutMethod::Minmax)
        .unwrap();
    // Render must not block on the worker; it uses the current cuts.
    let buffer = viewer.render().unwrap();
    assert_eq!(buffer.width, 32);
    assert_eq!(buffer.height, 32);
    drain_background(&mut viewer);
}

// ---------------------------------------------------------------------------
// Event handling through the dispatcher
// ---------------------------------------------------------------------------

#[test]
fn test_scroll_zooms_via_default_binding() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::Off);
    viewer.set_image(image(16, 16, 0.0, 1.0));
    let before = viewer.zoom_level();
    viewer.handle_event(&InputEvent::Scroll {
        mods: Modifiers::NONE,
        amount: 1.0,
        pos: Point::new(400.0, 300.0),
    });
    assert_eq!(viewer.zoom_level(), before + 1);
    viewer.handle_event(&InputEvent::Scroll {
        mods: Modifiers::NONE,
        amount: -1.0,
        pos: Point::new(400.0, 300.0),
    });
    assert_eq!(viewer.zoom_level(), before);
}

#[test]
fn test_zoom_keys_via_default_bindings() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::Off);
    viewer.handle_event(&InputEvent::KeyDown {
        key: "=".into(),
        mods: Modifiers::NONE,
    });
    assert_eq!(viewer.zoom_level(), 1);
    viewer.handle_event(&InputEvent::KeyDown {
        key: "-".into(),
        mods: Modifiers::NONE,
    });
    assert_eq!(viewer.zoom_level(), 0);
}

#[test]
fn test_contrast_mode_drag_adjusts_mapper() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::Off);
    viewer.set_image(image(16, 16, 0.0, 1.0));

    let mut bindings = BindingTable::new();
    bindings.bind(
        ModMatch::Any,
        EventKind::ButtonDrag(Button::Left),
        ViewerAction::ContrastDrag,
    );
    viewer
        .dispatcher_mut()
        .register_mode(Mode::new("contrast", ModeKind::Oneshot, "t", bindings))
        .unwrap();

    viewer.handle_event(&InputEvent::KeyDown {
        key: "t".into(),
        mods: Modifiers::NONE,
    });
    viewer.handle_event(&InputEvent::ButtonDrag {
        button: Button::Left,
        mods: Modifiers::NONE,
        pos: Point::new(600.0, 450.0),
    });
    // 600/800 -> brightness 0.5; 450/600 -> contrast 1.5.
    assert!((viewer.mapper().brightness() - 0.5).abs() < 1e-6);
    assert!((viewer.mapper().contrast() - 1.5).abs() < 1e-6);
}

#[test]
fn test_unbound_event_is_unhandled() {
    use callisto_core::modes::DispatchOutcome;
    let mut viewer = viewer_with_autocuts(AutoBehavior::Off);
    let out = viewer.handle_event(&InputEvent::KeyDown {
        key: "zzz".into(),
        mods: Modifiers::NONE,
    });
    assert_eq!(out, DispatchOutcome::Unhandled);
}

// ---------------------------------------------------------------------------
// Name-based configuration errors
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_names_are_errors() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::Off);
    assert!(viewer.set_color_map("nope").is_err());
    assert!(viewer.set_intensity_map("nope").is_err());
    assert!(viewer.set_color_algorithm("nope").is_err());
    assert!(viewer.set_color_map("heat").is_ok());
    assert!(viewer.set_intensity_map("neg").is_ok());
    assert!(viewer.set_color_algorithm("asinh").is_ok());
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[test]
fn test_render_gray_ramp_endpoints() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::On);
    viewer.set_image(image(8, 8, 0.0, 63.0));
    let buffer = viewer.render().unwrap();
    assert_eq!(&buffer.pixels[0..3], &[0, 0, 0]);
    assert_eq!(&buffer.pixels[buffer.pixels.len() - 3..], &[255, 255, 255]);
}

#[test]
fn test_render_without_image_is_none() {
    let mut viewer = viewer_with_autocuts(AutoBehavior::Off);
    assert!(viewer.render().is_none());
}
