use ndarray::Array2;
use std::collections::HashMap;

/// A single 2-D science image plane.
///
/// Pixel values are f32; NaN marks masked/invalid pixels. Owned by the
/// model layer and shared with viewers via `Arc` -- the pipeline never
/// copies the array.
#[derive(Clone, Debug)]
pub struct ImageData {
    /// Pixel data, row-major, shape = (height, width).
    pub data: Array2<f32>,
    /// Header keywords carried along with the plane.
    pub metadata: HashMap<String, String>,
}

impl ImageData {
    pub fn new(data: Array2<f32>) -> Self {
        Self {
            data,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(data: Array2<f32>, metadata: HashMap<String, String>) -> Self {
        Self { data, metadata }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Finite minimum and maximum, or `None` if no pixel is finite.
    pub fn finite_minmax(&self) -> Option<(f32, f32)> {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut seen = false;
        for &v in self.data.iter() {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
                seen = true;
            }
        }
        seen.then_some((min, max))
    }
}
