//! Shared statistics helpers for the auto-cut estimators.
//!
//! All helpers skip non-finite values. Sampling is by fixed row-major
//! stride, so a given input shape and sample cap always yield the same
//! sample.

use ndarray::Array2;

/// Stride that reduces `len` values to at most `max_samples`.
pub(crate) fn sample_stride(len: usize, max_samples: usize) -> usize {
    if max_samples == 0 || len <= max_samples {
        1
    } else {
        len.div_ceil(max_samples)
    }
}

/// Collect at most `max_samples` finite values by striding over the array
/// in row-major order. `max_samples == 0` means no cap.
pub(crate) fn sample_finite(data: &Array2<f32>, max_samples: usize) -> Vec<f32> {
    let stride = sample_stride(data.len(), max_samples);
    data.iter()
        .step_by(stride)
        .copied()
        .filter(|v| v.is_finite())
        .collect()
}

/// Mean and standard deviation of a slice.
pub(crate) fn mean_stddev(values: &[f32]) -> (f32, f32) {
    let n = values.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f32>() / n as f32;
    let var = values.iter().map(|&v| (v - mean) * (v - mean)).sum::<f32>() / n as f32;
    (mean, var.sqrt())
}

/// Median via `select_nth_unstable`; reorders the slice.
pub(crate) fn median(values: &mut [f32]) -> f32 {
    let n = values.len();
    if n == 1 {
        values[0]
    } else if n % 2 == 1 {
        let mid = n / 2;
        *values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b)).1
    } else {
        let mid = n / 2;
        values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        values[..mid].select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b));
        (values[mid - 1] + values[mid]) / 2.0
    }
}

/// Finite min/max of a slice, or `None` when empty.
pub(crate) fn minmax(values: &[f32]) -> Option<(f32, f32)> {
    let mut it = values.iter().copied();
    let first = it.next()?;
    let mut lo = first;
    let mut hi = first;
    for v in it {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    Some((lo, hi))
}
