//! Intensity maps: index-to-index curves applied before the color map.

use std::collections::HashMap;
use std::sync::Arc;

use crate::consts::LUT_SIZE;
use crate::error::{CallistoError, Result};

/// An immutable permutation/curve over color indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntensityMap {
    name: String,
    table: Vec<usize>,
}

impl IntensityMap {
    /// Build a map by sampling a [0,1] -> [0,1] curve at [`LUT_SIZE`]
    /// points; outputs are clamped before quantization.
    fn from_fn(name: &str, f: impl Fn(f32) -> f32) -> Self {
        let table = (0..LUT_SIZE)
            .map(|i| {
                let t = i as f32 / (LUT_SIZE - 1) as f32;
                (f(t).clamp(0.0, 1.0) * (LUT_SIZE - 1) as f32).round() as usize
            })
            .collect();
        Self {
            name: name.to_string(),
            table,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mapped index for `idx`, clamped to the table.
    pub fn get(&self, idx: usize) -> usize {
        self.table[idx.min(self.table.len() - 1)]
    }

    /// Identity curve.
    pub fn ramp() -> Self {
        Self::from_fn("ramp", |t| t)
    }

    /// Reversed ramp.
    pub fn neg() -> Self {
        Self::from_fn("neg", |t| 1.0 - t)
    }

    pub fn log() -> Self {
        Self::from_fn("log", |t| (1000.0 * t).ln_1p() / 1000.0f32.ln_1p())
    }

    pub fn expo() -> Self {
        Self::from_fn("expo", |t| (1000.0f32.powf(t) - 1.0) / 999.0)
    }

    pub fn gamma() -> Self {
        Self::from_fn("gamma", |t| t.powf(1.0 / 2.2))
    }

    /// Six flat steps.
    pub fn stairs() -> Self {
        Self::from_fn("stairs", |t| (t * 6.0).floor().min(5.0) / 5.0)
    }

    /// Everything maps to index 0.
    pub fn null() -> Self {
        Self::from_fn("null", |_| 0.0)
    }
}

/// Registry of named intensity maps.
#[derive(Clone, Debug, Default)]
pub struct IntensityMapRegistry {
    maps: HashMap<String, Arc<IntensityMap>>,
}

impl IntensityMapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        for map in [
            IntensityMap::ramp(),
            IntensityMap::neg(),
            IntensityMap::log(),
            IntensityMap::expo(),
            IntensityMap::gamma(),
            IntensityMap::stairs(),
            IntensityMap::null(),
        ] {
            reg.register(map);
        }
        reg
    }

    pub fn register(&mut self, map: IntensityMap) {
        self.maps.insert(map.name().to_string(), Arc::new(map));
    }

    pub fn get(&self, name: &str) -> Result<Arc<IntensityMap>> {
        self.maps
            .get(name)
            .cloned()
            .ok_or_else(|| CallistoError::UnknownIntensityMap {
                name: name.to_string(),
                registered: self.names().join(", "),
            })
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.maps.keys().cloned().collect();
        names.sort();
        names
    }
}
