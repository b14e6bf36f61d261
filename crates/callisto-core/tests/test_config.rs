use callisto_core::autocuts::{AutoCutMethod, HistogramParams, ZscaleParams};
use callisto_core::modes::ModeKind;
use callisto_core::rgbmap::Distribution;
use callisto_core::settings::{AutoBehavior, ViewerConfig};
use callisto_core::viewport::ZoomAlgorithm;

// ---------------------------------------------------------------------------
// AutoBehavior
// ---------------------------------------------------------------------------

#[test]
fn test_auto_behavior_display() {
    assert_eq!(format!("{}", AutoBehavior::On), "on");
    assert_eq!(format!("{}", AutoBehavior::Override), "override");
    assert_eq!(format!("{}", AutoBehavior::Once), "once");
    assert_eq!(format!("{}", AutoBehavior::Off), "off");
}

#[test]
fn test_auto_behavior_default_is_on() {
    assert_eq!(AutoBehavior::default(), AutoBehavior::On);
}

#[test]
fn test_auto_behavior_should_apply_table() {
    // (behavior, first_image, user_adjusted) -> expected
    let cases = [
        (AutoBehavior::On, true, false, true),
        (AutoBehavior::On, false, false, true),
        (AutoBehavior::On, false, true, false),
        (AutoBehavior::Override, false, true, true),
        (AutoBehavior::Once, true, false, true),
        (AutoBehavior::Once, false, false, false),
        (AutoBehavior::Off, true, false, false),
    ];
    for (behavior, first, adjusted, expected) in cases {
        assert_eq!(
            behavior.should_apply(first, adjusted),
            expected,
            "{behavior} first={first} adjusted={adjusted}"
        );
    }
}

// ---------------------------------------------------------------------------
// ModeKind / method / distribution display names
// ---------------------------------------------------------------------------

#[test]
fn test_mode_kind_display() {
    assert_eq!(format!("{}", ModeKind::Held), "held");
    assert_eq!(format!("{}", ModeKind::Oneshot), "oneshot");
    assert_eq!(format!("{}", ModeKind::Locked), "locked");
    assert_eq!(format!("{}", ModeKind::Softlock), "softlock");
}

#[test]
fn test_autocut_method_display() {
    assert_eq!(format!("{}", AutoCutMethod::Minmax), "minmax");
    assert_eq!(
        format!("{}", AutoCutMethod::Zscale(ZscaleParams::default())),
        "zscale"
    );
}

#[test]
fn test_distribution_display() {
    assert_eq!(format!("{}", Distribution::Linear), "linear");
    assert_eq!(format!("{}", Distribution::HistEq), "histeq");
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn test_viewer_config_defaults() {
    let config = ViewerConfig::default();
    assert_eq!(config.autocenter, AutoBehavior::On);
    assert_eq!(config.autocuts, AutoBehavior::On);
    assert_eq!(config.autozoom, AutoBehavior::On);
    assert_eq!(config.scale_min, 1e-5);
    assert_eq!(config.scale_max, 1e4);
    assert_eq!(config.autocut_method.name(), "zscale");
    assert_eq!(config.distribution, Distribution::Linear);
}

#[test]
fn test_histogram_params_defaults() {
    let params = HistogramParams::default();
    assert_eq!(params.bins, 2048);
    assert_eq!(params.pct, 0.999);
}

#[test]
fn test_zscale_params_defaults() {
    let params = ZscaleParams::default();
    assert_eq!(params.contrast, 0.25);
    assert_eq!(params.max_samples, 1000);
    assert_eq!(params.max_iterations, 5);
    assert_eq!(params.krej, 2.5);
}

// ---------------------------------------------------------------------------
// Serde round trips
// ---------------------------------------------------------------------------

#[test]
fn test_viewer_config_serde_round_trip() {
    let config = ViewerConfig {
        autocuts: AutoBehavior::Once,
        autocut_method: AutoCutMethod::Minmax,
        distribution: Distribution::Asinh,
        ..ViewerConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: ViewerConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.autocuts, AutoBehavior::Once);
    assert_eq!(back.autocut_method.name(), "minmax");
    assert_eq!(back.distribution, Distribution::Asinh);
}

#[test]
fn test_viewer_config_empty_json_uses_defaults() {
    let config: ViewerConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.autocuts, AutoBehavior::On);
    assert_eq!(config.scale_max, 1e4);
}

#[test]
fn test_zoom_algorithm_serde_round_trip() {
    for alg in [ZoomAlgorithm::Step, ZoomAlgorithm::rate(2.0).unwrap()] {
        let json = serde_json::to_string(&alg).unwrap();
        let back: ZoomAlgorithm = serde_json::from_str(&json).unwrap();
        assert_eq!(back, alg);
    }
}

#[test]
fn test_autocut_method_serde_round_trip() {
    let method = AutoCutMethod::Histogram(HistogramParams {
        bins: 512,
        pct: 0.95,
        max_samples: 0,
    });
    let json = serde_json::to_string(&method).unwrap();
    let back: AutoCutMethod = serde_json::from_str(&json).unwrap();
    assert_eq!(back.name(), "histogram");
    if let AutoCutMethod::Histogram(p) = back {
        assert_eq!(p.bins, 512);
        assert_eq!(p.pct, 0.95);
    } else {
        panic!("wrong variant after round trip");
    }
}
