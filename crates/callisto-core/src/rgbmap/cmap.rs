//! Color maps: fixed-size RGB lookup tables.
//!
//! Maps are immutable once built; viewers swap them atomically by
//! replacing the `Arc`. The built-in maps are computed rather than stored
//! as data blobs.

use std::collections::HashMap;
use std::sync::Arc;

use crate::consts::LUT_SIZE;
use crate::error::{CallistoError, Result};

/// An immutable RGB lookup table with [`LUT_SIZE`] entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorMap {
    name: String,
    rgb: Vec<[u8; 3]>,
}

impl ColorMap {
    /// Build a map from an arbitrary-length table, resampled to
    /// [`LUT_SIZE`] entries by nearest neighbor.
    pub fn new(name: impl Into<String>, table: Vec<[u8; 3]>) -> Self {
        let rgb = if table.is_empty() {
            vec![[0, 0, 0]; LUT_SIZE]
        } else if table.len() == LUT_SIZE {
            table
        } else {
            (0..LUT_SIZE)
                .map(|i| {
                    let src = i * (table.len() - 1) / (LUT_SIZE - 1).max(1);
                    table[src.min(table.len() - 1)]
                })
                .collect()
        };
        Self {
            name: name.into(),
            rgb,
        }
    }

    /// Build a map by sampling `f` over [0, 1]; channel outputs are
    /// clamped to [0, 1] before quantization.
    fn from_fn(name: &str, f: impl Fn(f32) -> [f32; 3]) -> Self {
        let rgb = (0..LUT_SIZE)
            .map(|i| {
                let t = i as f32 / (LUT_SIZE - 1) as f32;
                let [r, g, b] = f(t);
                [
                    (r.clamp(0.0, 1.0) * 255.0).round() as u8,
                    (g.clamp(0.0, 1.0) * 255.0).round() as u8,
                    (b.clamp(0.0, 1.0) * 255.0).round() as u8,
                ]
            })
            .collect();
        Self {
            name: name.to_string(),
            rgb,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rgb.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rgb.is_empty()
    }

    /// Entry at `idx`, clamped to the table.
    pub fn get(&self, idx: usize) -> [u8; 3] {
        self.rgb[idx.min(self.rgb.len() - 1)]
    }

    pub fn gray() -> Self {
        Self::from_fn("gray", |t| [t, t, t])
    }

    pub fn heat() -> Self {
        Self::from_fn("heat", |t| [3.0 * t, 3.0 * t - 1.0, 3.0 * t - 2.0])
    }

    pub fn cool() -> Self {
        Self::from_fn("cool", |t| [t, 1.0 - t, 1.0])
    }

    pub fn rainbow() -> Self {
        // Blue through red, full saturation.
        Self::from_fn("rainbow", |t| hsv_to_rgb((1.0 - t) * 240.0, 1.0, 1.0))
    }

    pub fn red() -> Self {
        Self::from_fn("red", |t| [t, 0.0, 0.0])
    }

    pub fn green() -> Self {
        Self::from_fn("green", |t| [0.0, t, 0.0])
    }

    pub fn blue() -> Self {
        Self::from_fn("blue", |t| [0.0, 0.0, t])
    }
}

/// HSV to RGB, hue in degrees, s/v in [0, 1].
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h = h.rem_euclid(360.0) / 60.0;
    let i = h.floor();
    let f = h - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match i as u32 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// Registry of named color maps.
#[derive(Clone, Debug, Default)]
pub struct ColorMapRegistry {
    maps: HashMap<String, Arc<ColorMap>>,
}

impl ColorMapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in maps.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        for map in [
            ColorMap::gray(),
            ColorMap::heat(),
            ColorMap::cool(),
            ColorMap::rainbow(),
            ColorMap::red(),
            ColorMap::green(),
            ColorMap::blue(),
        ] {
            reg.register(map);
        }
        reg
    }

    /// Register a map under its own name, replacing any previous entry.
    pub fn register(&mut self, map: ColorMap) {
        self.maps.insert(map.name().to_string(), Arc::new(map));
    }

    pub fn get(&self, name: &str) -> Result<Arc<ColorMap>> {
        self.maps
            .get(name)
            .cloned()
            .ok_or_else(|| CallistoError::UnknownColorMap {
                name: name.to_string(),
                registered: self.names().join(", "),
            })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.maps.keys().cloned().collect();
        names.sort();
        names
    }
}
