//! Automatic cut-level estimation.
//!
//! A cut pair `(lo, hi)` is the data-value range mapped onto the full
//! display intensity range. Every estimator excludes non-finite pixels
//! from its statistics and reports [`CallistoError::NoValidPixels`] for
//! empty or all-NaN input instead of producing NaN cuts.

pub mod config;
pub(crate) mod stats;
mod zscale;

use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::EPSILON;
use crate::error::{CallistoError, Result};

pub use config::{HistogramParams, MedianParams, StddevParams, ZscaleParams};

/// The `(lo, hi)` data-value range mapped onto the display range.
///
/// Invariant: `lo <= hi`. Constructed through [`CutLevels::new`] or an
/// estimator, both of which uphold it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CutLevels {
    pub lo: f32,
    pub hi: f32,
}

impl CutLevels {
    /// Build a cut pair, rejecting `lo > hi` or non-finite bounds.
    pub fn new(lo: f32, hi: f32) -> Result<Self> {
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(CallistoError::InvalidCutLevels { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    pub fn span(&self) -> f32 {
        self.hi - self.lo
    }
}

/// Auto cut-level estimation method with its parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum AutoCutMethod {
    /// Exact finite minimum / maximum.
    Minmax,
    /// Median +/- spread * MAD.
    Median(MedianParams),
    /// Mean +/- k * sigma.
    Stddev(StddevParams),
    /// Bin edges bounding the retained central histogram mass.
    Histogram(HistogramParams),
    /// IRAF ZSCALE sigma-clipped line fit.
    Zscale(ZscaleParams),
}

impl Default for AutoCutMethod {
    fn default() -> Self {
        Self::Zscale(ZscaleParams::default())
    }
}

impl AutoCutMethod {
    /// Build a method with default parameters from its configuration name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "minmax" => Ok(Self::Minmax),
            "median" => Ok(Self::Median(MedianParams::default())),
            "stddev" => Ok(Self::Stddev(StddevParams::default())),
            "histogram" => Ok(Self::Histogram(HistogramParams::default())),
            "zscale" => Ok(Self::Zscale(ZscaleParams::default())),
            _ => Err(CallistoError::UnknownAutoCutMethod(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Minmax => "minmax",
            Self::Median(_) => "median",
            Self::Stddev(_) => "stddev",
            Self::Histogram(_) => "histogram",
            Self::Zscale(_) => "zscale",
        }
    }
}

impl fmt::Display for AutoCutMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Estimate display cut levels for `data`.
pub fn estimate(data: &Array2<f32>, method: &AutoCutMethod) -> Result<CutLevels> {
    let cuts = match method {
        AutoCutMethod::Minmax => minmax_cuts(data)?,
        AutoCutMethod::Median(p) => median_cuts(data, p)?,
        AutoCutMethod::Stddev(p) => stddev_cuts(data, p)?,
        AutoCutMethod::Histogram(p) => histogram_cuts(data, p)?,
        AutoCutMethod::Zscale(p) => zscale::zscale(data, p)?,
    };
    debug!(
        method = method.name(),
        lo = cuts.lo,
        hi = cuts.hi,
        "estimated cut levels"
    );
    Ok(cuts)
}

fn minmax_cuts(data: &Array2<f32>) -> Result<CutLevels> {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    let mut seen = false;
    for &v in data.iter() {
        if v.is_finite() {
            lo = lo.min(v);
            hi = hi.max(v);
            seen = true;
        }
    }
    if !seen {
        return Err(CallistoError::NoValidPixels);
    }
    Ok(CutLevels { lo, hi })
}

fn median_cuts(data: &Array2<f32>, params: &MedianParams) -> Result<CutLevels> {
    let mut samples = stats::sample_finite(data, params.max_samples);
    if samples.is_empty() {
        return Err(CallistoError::NoValidPixels);
    }
    let med = stats::median(&mut samples);
    let mut deviations: Vec<f32> = samples.iter().map(|&v| (v - med).abs()).collect();
    let mad = stats::median(&mut deviations);
    if mad < EPSILON {
        // Degenerate spread; the sample extremes are the only usable range.
        return match stats::minmax(&samples) {
            Some((lo, hi)) => Ok(CutLevels { lo, hi }),
            None => Err(CallistoError::NoValidPixels),
        };
    }
    Ok(CutLevels {
        lo: med - params.spread * mad,
        hi: med + params.spread * mad,
    })
}

fn stddev_cuts(data: &Array2<f32>, params: &StddevParams) -> Result<CutLevels> {
    let samples = stats::sample_finite(data, params.max_samples);
    if samples.is_empty() {
        return Err(CallistoError::NoValidPixels);
    }
    let (mean, sigma) = stats::mean_stddev(&samples);
    Ok(CutLevels {
        lo: mean - params.sigma * sigma,
        hi: mean + params.sigma * sigma,
    })
}

fn histogram_cuts(data: &Array2<f32>, params: &HistogramParams) -> Result<CutLevels> {
    let samples = stats::sample_finite(data, params.max_samples);
    let Some((min, max)) = stats::minmax(&samples) else {
        return Err(CallistoError::NoValidPixels);
    };
    if (max - min).abs() < EPSILON {
        return Ok(CutLevels { lo: min, hi: max });
    }

    let bins = params.bins.max(2);
    let width = (max - min) / bins as f32;
    let mut histogram = vec![0u64; bins];
    for &v in &samples {
        let bin = (((v - min) / width) as usize).min(bins - 1);
        histogram[bin] += 1;
    }

    // Drop half the excluded mass from each tail; the surviving window's
    // bin edges are the cuts.
    let total = samples.len() as f64;
    let tail = ((1.0 - params.pct.clamp(0.0, 1.0) as f64) * 0.5 * total).floor() as u64;

    let mut lo_bin = 0usize;
    let mut cum = 0u64;
    for (i, &count) in histogram.iter().enumerate() {
        cum += count;
        if cum > tail {
            lo_bin = i;
            break;
        }
    }
    let mut hi_bin = bins - 1;
    cum = 0;
    for (i, &count) in histogram.iter().enumerate().rev() {
        cum += count;
        if cum > tail {
            hi_bin = i;
            break;
        }
    }
    if lo_bin > hi_bin {
        return Ok(CutLevels { lo: min, hi: max });
    }
    Ok(CutLevels {
        lo: min + lo_bin as f32 * width,
        hi: min + (hi_bin + 1) as f32 * width,
    })
}
