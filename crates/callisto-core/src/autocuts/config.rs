use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_AUTOCUT_SAMPLES, DEFAULT_HISTOGRAM_BINS, DEFAULT_HISTOGRAM_PCT, DEFAULT_MEDIAN_SPREAD,
    DEFAULT_STDDEV_SIGMA, DEFAULT_ZSCALE_CONTRAST, DEFAULT_ZSCALE_ITERATIONS, DEFAULT_ZSCALE_KREJ,
    DEFAULT_ZSCALE_MIN_FRACTION, DEFAULT_ZSCALE_SAMPLES,
};

/// Parameters for median/MAD-based cuts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MedianParams {
    /// Spread multiplier applied to the median absolute deviation.
    #[serde(default = "default_median_spread")]
    pub spread: f32,
    /// Maximum number of pixels sampled (0 = no cap).
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

impl Default for MedianParams {
    fn default() -> Self {
        Self {
            spread: DEFAULT_MEDIAN_SPREAD,
            max_samples: DEFAULT_AUTOCUT_SAMPLES,
        }
    }
}

/// Parameters for mean +/- k*sigma cuts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StddevParams {
    /// Sigma multiplier `k`.
    #[serde(default = "default_stddev_sigma")]
    pub sigma: f32,
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

impl Default for StddevParams {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_STDDEV_SIGMA,
            max_samples: DEFAULT_AUTOCUT_SAMPLES,
        }
    }
}

/// Parameters for central-mass histogram cuts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistogramParams {
    /// Number of histogram bins.
    #[serde(default = "default_histogram_bins")]
    pub bins: usize,
    /// Fraction of the central mass to retain (e.g. 0.999).
    #[serde(default = "default_histogram_pct")]
    pub pct: f32,
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

impl Default for HistogramParams {
    fn default() -> Self {
        Self {
            bins: DEFAULT_HISTOGRAM_BINS,
            pct: DEFAULT_HISTOGRAM_PCT,
            max_samples: DEFAULT_AUTOCUT_SAMPLES,
        }
    }
}

/// Parameters for the IRAF ZSCALE estimator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZscaleParams {
    /// Contrast parameter; the fitted slope is expanded by `1/contrast`.
    #[serde(default = "default_zscale_contrast")]
    pub contrast: f32,
    /// Number of pixels sampled by fixed stride.
    #[serde(default = "default_zscale_samples")]
    pub max_samples: usize,
    /// Maximum sigma-clipping iterations for the line fit.
    #[serde(default = "default_zscale_iterations")]
    pub max_iterations: usize,
    /// Rejection threshold in sigmas.
    #[serde(default = "default_zscale_krej")]
    pub krej: f32,
    /// Minimum surviving sample fraction; below it the fit is abandoned.
    #[serde(default = "default_zscale_min_fraction")]
    pub min_fraction: f32,
}

impl Default for ZscaleParams {
    fn default() -> Self {
        Self {
            contrast: DEFAULT_ZSCALE_CONTRAST,
            max_samples: DEFAULT_ZSCALE_SAMPLES,
            max_iterations: DEFAULT_ZSCALE_ITERATIONS,
            krej: DEFAULT_ZSCALE_KREJ,
            min_fraction: DEFAULT_ZSCALE_MIN_FRACTION,
        }
    }
}

fn default_median_spread() -> f32 {
    DEFAULT_MEDIAN_SPREAD
}
fn default_stddev_sigma() -> f32 {
    DEFAULT_STDDEV_SIGMA
}
fn default_histogram_bins() -> usize {
    DEFAULT_HISTOGRAM_BINS
}
fn default_histogram_pct() -> f32 {
    DEFAULT_HISTOGRAM_PCT
}
fn default_max_samples() -> usize {
    DEFAULT_AUTOCUT_SAMPLES
}
fn default_zscale_contrast() -> f32 {
    DEFAULT_ZSCALE_CONTRAST
}
fn default_zscale_samples() -> usize {
    DEFAULT_ZSCALE_SAMPLES
}
fn default_zscale_iterations() -> usize {
    DEFAULT_ZSCALE_ITERATIONS
}
fn default_zscale_krej() -> f32 {
    DEFAULT_ZSCALE_KREJ
}
fn default_zscale_min_fraction() -> f32 {
    DEFAULT_ZSCALE_MIN_FRACTION
}
