//! IRAF ZSCALE cut-level estimation.
//!
//! Sorts a stride-decimated sample and fits a sigma-clipped line to the
//! sorted-value-vs-rank relation. The cut levels are the fitted line
//! expanded by `1/contrast` around the sample median, clipped to the
//! sample's actual extremes. Deterministic for a given input shape and
//! parameter set.

use ndarray::Array2;

use crate::consts::EPSILON;
use crate::error::{CallistoError, Result};

use super::config::ZscaleParams;
use super::stats::{mean_stddev, sample_finite};
use super::CutLevels;

pub(crate) fn zscale(data: &Array2<f32>, params: &ZscaleParams) -> Result<CutLevels> {
    let mut samples = sample_finite(data, params.max_samples);
    if samples.is_empty() {
        return Err(CallistoError::NoValidPixels);
    }
    samples.sort_unstable_by(|a, b| a.total_cmp(b));

    let n = samples.len();
    let zmin = samples[0];
    let zmax = samples[n - 1];
    let midpoint = (n - 1) / 2;
    let zmed = if n % 2 == 1 {
        samples[midpoint]
    } else {
        (samples[midpoint] + samples[midpoint + 1]) / 2.0
    };

    if n < 5 || (zmax - zmin).abs() < EPSILON {
        return Ok(CutLevels { lo: zmin, hi: zmax });
    }

    let (slope, ngood) = fit_clipped_line(&samples, params);
    let min_good = ((n as f32) * params.min_fraction).ceil() as usize;

    if ngood < min_good.max(5) {
        // Fit rejected too much of the sample; fall back to the extremes.
        return Ok(CutLevels { lo: zmin, hi: zmax });
    }

    let slope = if params.contrast > EPSILON {
        slope / params.contrast as f64
    } else {
        slope
    };

    let lo = (zmed as f64 - midpoint as f64 * slope).max(zmin as f64) as f32;
    let hi = (zmed as f64 + (n - 1 - midpoint) as f64 * slope).min(zmax as f64) as f32;
    Ok(CutLevels { lo, hi })
}

/// Least-squares slope of value vs. rank with iterative sigma rejection.
/// Returns the fitted slope and the number of surviving samples.
fn fit_clipped_line(samples: &[f32], params: &ZscaleParams) -> (f64, usize) {
    let n = samples.len();
    let mut mask = vec![true; n];
    let mut ngood = n;
    let mut slope = 0.0f64;

    for _ in 0..params.max_iterations {
        // Weighted sums over the surviving points; x is the sample rank.
        let mut sx = 0.0f64;
        let mut sy = 0.0f64;
        let mut sxx = 0.0f64;
        let mut sxy = 0.0f64;
        let mut count = 0.0f64;
        for (i, (&v, &keep)) in samples.iter().zip(mask.iter()).enumerate() {
            if keep {
                let x = i as f64;
                let y = v as f64;
                sx += x;
                sy += y;
                sxx += x * x;
                sxy += x * y;
                count += 1.0;
            }
        }
        let denom = count * sxx - sx * sx;
        if denom.abs() < EPSILON as f64 {
            break;
        }
        slope = (count * sxy - sx * sy) / denom;
        let intercept = (sy - slope * sx) / count;

        let mut residuals = Vec::with_capacity(ngood);
        for (i, (&v, &keep)) in samples.iter().zip(mask.iter()).enumerate() {
            if keep {
                residuals.push((v as f64 - (slope * i as f64 + intercept)) as f32);
            }
        }
        let (_, sigma) = mean_stddev(&residuals);
        if sigma < EPSILON {
            break;
        }

        let threshold = params.krej * sigma;
        let mut rejected = 0;
        for (i, (&v, keep)) in samples.iter().zip(mask.iter_mut()).enumerate() {
            if *keep {
                let r = (v as f64 - (slope * i as f64 + intercept)).abs() as f32;
                if r > threshold {
                    *keep = false;
                    rejected += 1;
                }
            }
        }
        if rejected == 0 {
            break;
        }
        ngood -= rejected;
        let min_good = ((n as f32) * params.min_fraction).ceil() as usize;
        if ngood < min_good {
            break;
        }
    }

    (slope, ngood)
}
