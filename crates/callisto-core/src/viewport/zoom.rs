//! Discrete/continuous zoom duality.
//!
//! A zoom algorithm is a bidirectional mapping between an integer zoom
//! level and a continuous scale factor. Level 0 corresponds to 1:1 scale
//! exactly, for both algorithms.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_ZOOM_RATE;
use crate::error::{CallistoError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ZoomAlgorithm {
    /// Integer-multiple zoom: 1x, 2x, 3x ... above unity, 1/2x, 1/3x ...
    /// below.
    Step,
    /// Exponential zoom: scale = rate^level.
    Rate { rate: f64 },
}

impl Default for ZoomAlgorithm {
    fn default() -> Self {
        Self::Step
    }
}

impl ZoomAlgorithm {
    /// Rate-based algorithm; the rate must exceed 1.
    pub fn rate(rate: f64) -> Result<Self> {
        if !(rate > 1.0) {
            return Err(CallistoError::InvalidZoomRate(rate));
        }
        Ok(Self::Rate { rate })
    }

    /// Rate-based algorithm with the default rate (sqrt 2).
    pub fn default_rate() -> Self {
        Self::Rate {
            rate: DEFAULT_ZOOM_RATE,
        }
    }

    /// Continuous scale for an integer level.
    pub fn scale_of(&self, level: i32) -> f64 {
        match *self {
            Self::Step => {
                if level >= 0 {
                    (level + 1) as f64
                } else {
                    1.0 / (1 - level) as f64
                }
            }
            Self::Rate { rate } => rate.powi(level),
        }
    }

    /// Nearest integer level for a positive scale.
    pub fn level_of(&self, scale: f64) -> i32 {
        debug_assert!(scale > 0.0);
        match *self {
            Self::Step => {
                if scale >= 1.0 {
                    scale.round() as i32 - 1
                } else {
                    1 - (1.0 / scale).round() as i32
                }
            }
            Self::Rate { rate } => (scale.ln() / rate.ln()).round() as i32,
        }
    }
}
