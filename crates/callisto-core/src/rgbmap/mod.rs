pub mod cmap;
pub mod distribution;
pub mod imap;
mod mapper;

pub use cmap::{ColorMap, ColorMapRegistry};
pub use distribution::{Distribution, HistEqTable, DISTRIBUTIONS};
pub use imap::{IntensityMap, IntensityMapRegistry};
pub use mapper::{RgbBuffer, RgbMapper};
