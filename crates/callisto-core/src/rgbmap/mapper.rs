//! The per-viewer color pipeline.
//!
//! Four stages per pixel value: normalize against the cut levels,
//! distribute, shift/contrast, then quantize through the intensity and
//! color maps. The histogram-equalization table is the one data-dependent
//! stage and is cached here; see the invalidation rules on
//! [`RgbMapper::set_cut_levels`] and [`RgbMapper::set_distribution`].

use std::sync::Arc;

use ndarray::Array2;
use rayon::prelude::*;

use crate::autocuts::{self, AutoCutMethod, CutLevels};
use crate::callback::{CallbackList, CutLevelsChanged};
use crate::consts::{EPSILON, LUT_SIZE, PARALLEL_PIXEL_THRESHOLD};
use crate::error::Result;

use super::cmap::ColorMap;
use super::distribution::{Distribution, HistEqTable};
use super::imap::IntensityMap;

/// Rendered RGB output, row-major, 3 bytes per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

#[derive(Debug)]
pub struct RgbMapper {
    cuts: CutLevels,
    distribution: Distribution,
    contrast: f32,
    brightness: f32,
    imap: Arc<IntensityMap>,
    cmap: Arc<ColorMap>,
    histeq: Option<HistEqTable>,
    /// Observers notified after every accepted cut-level change.
    pub on_cut_levels_changed: CallbackList<CutLevelsChanged>,
}

impl RgbMapper {
    pub fn new() -> Self {
        Self {
            cuts: CutLevels { lo: 0.0, hi: 1.0 },
            distribution: Distribution::Linear,
            contrast: 1.0,
            brightness: 0.0,
            imap: Arc::new(IntensityMap::ramp()),
            cmap: Arc::new(ColorMap::gray()),
            histeq: None,
            on_cut_levels_changed: CallbackList::new(),
        }
    }

    pub fn cut_levels(&self) -> CutLevels {
        self.cuts
    }

    /// Set the cut levels. `lo > hi` (or a non-finite bound) is rejected.
    /// Invalidates the histeq cache.
    pub fn set_cut_levels(&mut self, lo: f32, hi: f32) -> Result<()> {
        self.cuts = CutLevels::new(lo, hi)?;
        self.histeq = None;
        self.on_cut_levels_changed
            .notify(&CutLevelsChanged { lo, hi });
        Ok(())
    }

    /// Estimate cut levels from `data` and apply them.
    pub fn auto_levels(&mut self, data: &Array2<f32>, method: &AutoCutMethod) -> Result<CutLevels> {
        let cuts = autocuts::estimate(data, method)?;
        self.set_cut_levels(cuts.lo, cuts.hi)?;
        Ok(cuts)
    }

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    /// Switch the distribution algorithm. Invalidates the histeq cache.
    pub fn set_distribution(&mut self, distribution: Distribution) {
        if distribution != self.distribution {
            self.distribution = distribution;
            self.histeq = None;
        }
    }

    pub fn set_distribution_by_name(&mut self, name: &str) -> Result<()> {
        self.set_distribution(Distribution::from_name(name)?);
        Ok(())
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Contrast multiplier around the 0.5 midpoint; 1.0 is identity.
    /// Does not touch the histeq cache.
    pub fn set_contrast(&mut self, contrast: f32) {
        self.contrast = contrast.max(0.0);
    }

    /// Additive brightness shift; 0.0 is identity.
    pub fn set_brightness(&mut self, brightness: f32) {
        self.brightness = brightness;
    }

    pub fn color_map(&self) -> &Arc<ColorMap> {
        &self.cmap
    }

    /// Swap the color map; the previous map's `Arc` is dropped atomically.
    pub fn set_color_map(&mut self, cmap: Arc<ColorMap>) {
        self.cmap = cmap;
    }

    pub fn intensity_map(&self) -> &Arc<IntensityMap> {
        &self.imap
    }

    pub fn set_intensity_map(&mut self, imap: Arc<IntensityMap>) {
        self.imap = imap;
    }

    /// Drop the histeq cache. Call when the backing image changes.
    pub fn invalidate_histeq(&mut self) {
        self.histeq = None;
    }

    pub fn histeq_cache_ready(&self) -> bool {
        self.histeq.is_some()
    }

    /// Rebuild the histeq table from `data` if the active distribution
    /// needs one and none is cached.
    pub fn prepare_histeq(&mut self, data: &Array2<f32>) {
        if self.distribution == Distribution::HistEq && self.histeq.is_none() {
            self.histeq = Some(HistEqTable::build(data, self.cuts));
        }
    }

    /// Apply a prebuilt histeq table (e.g. computed on a worker thread).
    pub fn install_histeq(&mut self, table: HistEqTable) {
        self.histeq = Some(table);
    }

    fn normalize(&self, v: f32) -> f32 {
        if !v.is_finite() {
            return 0.0;
        }
        let span = self.cuts.span();
        if span < EPSILON {
            // Degenerate cuts: everything at or above lo is top of range.
            if v >= self.cuts.lo {
                1.0
            } else {
                0.0
            }
        } else {
            ((v - self.cuts.lo) / span).clamp(0.0, 1.0)
        }
    }

    /// Color index in [0, LUT_SIZE) for a raw value.
    pub fn index_of(&self, v: f32) -> usize {
        let x = self.normalize(v);
        let y = match self.distribution {
            Distribution::HistEq => match &self.histeq {
                Some(table) => table.lookup(x),
                None => x,
            },
            d => d.apply(x),
        };
        let z = ((y - 0.5) * self.contrast + 0.5 + self.brightness).clamp(0.0, 1.0);
        ((z * (LUT_SIZE - 1) as f32).round() as usize).min(LUT_SIZE - 1)
    }

    /// Final RGB triple for a raw value.
    pub fn map_value(&self, v: f32) -> [u8; 3] {
        self.cmap.get(self.imap.get(self.index_of(v)))
    }

    /// Render a whole array, row-parallel for large images.
    /// Builds the histeq table first if the distribution requires it.
    pub fn map_array(&mut self, data: &Array2<f32>) -> RgbBuffer {
        self.prepare_histeq(data);
        let (h, w) = data.dim();
        if h == 0 || w == 0 {
            return RgbBuffer {
                width: w,
                height: h,
                pixels: Vec::new(),
            };
        }
        let mut pixels = vec![0u8; h * w * 3];
        let this: &RgbMapper = self;
        if h * w >= PARALLEL_PIXEL_THRESHOLD {
            pixels
                .par_chunks_mut(w * 3)
                .enumerate()
                .for_each(|(row, out)| {
                    for col in 0..w {
                        let rgb = this.map_value(data[[row, col]]);
                        out[col * 3..col * 3 + 3].copy_from_slice(&rgb);
                    }
                });
        } else {
            for row in 0..h {
                let out = &mut pixels[row * w * 3..(row + 1) * w * 3];
                for col in 0..w {
                    let rgb = this.map_value(data[[row, col]]);
                    out[col * 3..col * 3 + 3].copy_from_slice(&rgb);
                }
            }
        }
        RgbBuffer {
            width: w,
            height: h,
            pixels,
        }
    }
}

impl Default for RgbMapper {
    fn default() -> Self {
        Self::new()
    }
}
