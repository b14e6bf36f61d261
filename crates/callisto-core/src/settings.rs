//! Per-viewer configuration.
//!
//! An explicit struct enumerating the recognized options with typed
//! accessors; no string-keyed settings dictionary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::autocuts::AutoCutMethod;
use crate::consts::{DEFAULT_SCALE_MAX, DEFAULT_SCALE_MIN};
use crate::rgbmap::Distribution;

/// Policy for automatic behaviors applied when a new image arrives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoBehavior {
    /// Apply for every new image until the user adjusts manually.
    #[default]
    On,
    /// Apply for every new image, even over manual adjustments.
    Override,
    /// Apply for the first image only.
    Once,
    /// Never apply.
    Off,
}

impl AutoBehavior {
    /// Whether the behavior fires for this image.
    ///
    /// `first_image` is true for the first image a viewer receives;
    /// `user_adjusted` is true once the user changed the governed
    /// parameter manually.
    pub fn should_apply(&self, first_image: bool, user_adjusted: bool) -> bool {
        match self {
            Self::On => !user_adjusted,
            Self::Override => true,
            Self::Once => first_image,
            Self::Off => false,
        }
    }
}

impl fmt::Display for AutoBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::On => "on",
            Self::Override => "override",
            Self::Once => "once",
            Self::Off => "off",
        };
        write!(f, "{s}")
    }
}

/// Per-viewer configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Re-center the pan on new images.
    #[serde(default)]
    pub autocenter: AutoBehavior,
    /// Re-estimate cut levels on new images.
    #[serde(default)]
    pub autocuts: AutoBehavior,
    /// Re-fit the zoom on new images.
    #[serde(default)]
    pub autozoom: AutoBehavior,
    #[serde(default = "default_scale_min")]
    pub scale_min: f64,
    #[serde(default = "default_scale_max")]
    pub scale_max: f64,
    /// Estimator used by the autocuts behavior.
    #[serde(default)]
    pub autocut_method: AutoCutMethod,
    /// Initial color distribution.
    #[serde(default)]
    pub distribution: Distribution,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            autocenter: AutoBehavior::default(),
            autocuts: AutoBehavior::default(),
            autozoom: AutoBehavior::default(),
            scale_min: DEFAULT_SCALE_MIN,
            scale_max: DEFAULT_SCALE_MAX,
            autocut_method: AutoCutMethod::default(),
            distribution: Distribution::default(),
        }
    }
}

fn default_scale_min() -> f64 {
    DEFAULT_SCALE_MIN
}
fn default_scale_max() -> f64 {
    DEFAULT_SCALE_MAX
}
