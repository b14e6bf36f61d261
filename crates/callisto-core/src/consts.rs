/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f32 = 1e-10;

/// Number of entries in color and intensity lookup tables.
pub const LUT_SIZE: usize = 256;

/// Constant `k` in the log distribution `log1p(k*x) / log1p(k)`.
/// Calibration-tunable against a reference renderer.
pub const LOG_SCALE: f32 = 1000.0;

/// Softening factor for the asinh distribution.
pub const ASINH_SCALE: f32 = 10.0;

/// Softening factor for the sinh distribution.
pub const SINH_SCALE: f32 = 3.0;

/// Exponent for the power distribution.
pub const POWER_EXPONENT: f32 = 2.2;

/// Number of bins in the histogram-equalization CDF table.
pub const HISTEQ_BINS: usize = 2048;

/// Maximum number of pixels sampled when building the histeq table.
pub const HISTEQ_MAX_SAMPLES: usize = 262_144;

/// Default number of bins for histogram auto-cuts.
pub const DEFAULT_HISTOGRAM_BINS: usize = 2048;

/// Default fraction of central histogram mass retained by histogram auto-cuts.
pub const DEFAULT_HISTOGRAM_PCT: f32 = 0.999;

/// Default maximum sample size for subsampled auto-cut statistics.
pub const DEFAULT_AUTOCUT_SAMPLES: usize = 250_000;

/// Default spread multiplier (applied to the MAD) for median auto-cuts.
pub const DEFAULT_MEDIAN_SPREAD: f32 = 3.0;

/// Default sigma multiplier for stddev auto-cuts.
pub const DEFAULT_STDDEV_SIGMA: f32 = 2.5;

/// Default number of samples for the ZSCALE estimator (IRAF default).
pub const DEFAULT_ZSCALE_SAMPLES: usize = 1000;

/// Default ZSCALE contrast parameter.
pub const DEFAULT_ZSCALE_CONTRAST: f32 = 0.25;

/// Maximum sigma-clipping iterations for the ZSCALE line fit.
pub const DEFAULT_ZSCALE_ITERATIONS: usize = 5;

/// Rejection threshold (in sigmas) for the ZSCALE line fit.
pub const DEFAULT_ZSCALE_KREJ: f32 = 2.5;

/// Minimum fraction of samples that must survive clipping for the ZSCALE
/// fit to be used; below this the estimator falls back to sample min/max.
pub const DEFAULT_ZSCALE_MIN_FRACTION: f32 = 0.5;

/// Default rate for the rate zoom algorithm.
pub const DEFAULT_ZOOM_RATE: f64 = std::f64::consts::SQRT_2;

/// Default lower scale limit (guard against aberrant viewing conditions).
pub const DEFAULT_SCALE_MIN: f64 = 1e-5;

/// Default upper scale limit.
pub const DEFAULT_SCALE_MAX: f64 = 1e4;

/// Fallback cut range when estimation reports no valid pixels.
pub const DEFAULT_CUT_RANGE: (f32, f32) = (0.0, 1.0);

/// Pan step (in data pixels, before scaling) for arrow-key panning.
pub const PAN_STEP_PIXELS: f64 = 16.0;
