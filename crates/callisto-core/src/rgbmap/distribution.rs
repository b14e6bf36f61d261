//! Color distribution algorithms.
//!
//! A distribution maps a normalized value in [0, 1] to a normalized color
//! index in [0, 1]. Every variant is monotonic non-decreasing with
//! `f(0) = 0` and `f(1) = 1`; inputs are clamped before evaluation so the
//! hyperbolic and logarithmic forms never see an out-of-domain value.

use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::autocuts::stats::sample_stride;
use crate::autocuts::CutLevels;
use crate::consts::{
    ASINH_SCALE, EPSILON, HISTEQ_BINS, HISTEQ_MAX_SAMPLES, LOG_SCALE, POWER_EXPONENT, SINH_SCALE,
};
use crate::error::{CallistoError, Result};

/// Color distribution algorithm.
///
/// `HistEq` is data-dependent; it is evaluated through a [`HistEqTable`]
/// cached by the mapper, and `apply` treats it as identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distribution {
    #[default]
    Linear,
    Log,
    Power,
    Sqrt,
    Squared,
    Asinh,
    Sinh,
    HistEq,
}

/// All distributions, in the cycling order used by the viewer.
pub const DISTRIBUTIONS: &[Distribution] = &[
    Distribution::Linear,
    Distribution::Log,
    Distribution::Power,
    Distribution::Sqrt,
    Distribution::Squared,
    Distribution::Asinh,
    Distribution::Sinh,
    Distribution::HistEq,
];

impl Distribution {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "linear" => Ok(Self::Linear),
            "log" => Ok(Self::Log),
            "power" => Ok(Self::Power),
            "sqrt" => Ok(Self::Sqrt),
            "squared" => Ok(Self::Squared),
            "asinh" => Ok(Self::Asinh),
            "sinh" => Ok(Self::Sinh),
            "histeq" => Ok(Self::HistEq),
            _ => Err(CallistoError::UnknownDistribution(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Log => "log",
            Self::Power => "power",
            Self::Sqrt => "sqrt",
            Self::Squared => "squared",
            Self::Asinh => "asinh",
            Self::Sinh => "sinh",
            Self::HistEq => "histeq",
        }
    }

    /// Apply the analytic transfer function to a normalized value.
    pub fn apply(self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        match self {
            Self::Linear | Self::HistEq => x,
            Self::Log => (LOG_SCALE * x).ln_1p() / LOG_SCALE.ln_1p(),
            Self::Power => x.powf(POWER_EXPONENT),
            Self::Sqrt => x.sqrt(),
            Self::Squared => x * x,
            Self::Asinh => (ASINH_SCALE * x).asinh() / ASINH_SCALE.asinh(),
            Self::Sinh => (SINH_SCALE * x).sinh() / SINH_SCALE.sinh(),
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Cumulative-histogram mapping for histogram equalization.
///
/// Built from the image pixels falling between the cut levels. Lookup is
/// monotonic with fixed endpoints: `f(0) = 0`, `f(1) = 1`. Rebuilt whenever
/// the backing data, the cut levels, or the distribution change; swapping
/// color maps or adjusting contrast does not require a rebuild.
#[derive(Clone, Debug)]
pub struct HistEqTable {
    cdf: Vec<f32>,
}

impl HistEqTable {
    /// Build the table from `data`, normalizing values with `cuts`.
    ///
    /// Large arrays are decimated by fixed stride (deterministic for a
    /// given shape). Degenerate input (no finite pixels between the cuts)
    /// yields an identity table.
    pub fn build(data: &Array2<f32>, cuts: CutLevels) -> Self {
        let span = cuts.span();
        let mut counts = vec![0u64; HISTEQ_BINS];
        if span > EPSILON {
            let stride = sample_stride(data.len(), HISTEQ_MAX_SAMPLES);
            for &v in data.iter().step_by(stride) {
                if !v.is_finite() {
                    continue;
                }
                let x = ((v - cuts.lo) / span).clamp(0.0, 1.0);
                let bin = ((x * (HISTEQ_BINS - 1) as f32).round() as usize).min(HISTEQ_BINS - 1);
                counts[bin] += 1;
            }
        }

        let mut cum = vec![0u64; HISTEQ_BINS];
        let mut running = 0u64;
        for (c, &count) in cum.iter_mut().zip(counts.iter()) {
            running += count;
            *c = running;
        }

        let base = cum[0];
        let range = cum[HISTEQ_BINS - 1].saturating_sub(base);
        let cdf = if range == 0 {
            // Identity ramp when the histogram is degenerate.
            (0..HISTEQ_BINS)
                .map(|i| i as f32 / (HISTEQ_BINS - 1) as f32)
                .collect()
        } else {
            cum.iter()
                .map(|&c| (c - base) as f32 / range as f32)
                .collect()
        };
        Self { cdf }
    }

    /// Cumulative fraction for a normalized value.
    pub fn lookup(&self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        let bin = ((x * (self.cdf.len() - 1) as f32).round() as usize).min(self.cdf.len() - 1);
        self.cdf[bin]
    }
}
