pub mod canvas;
pub mod transform;
pub mod zoom;

pub use canvas::{CanvasShape, SharedCanvas};
pub use transform::{CoordSpace, DataBounds, Point, Viewport, WorldCoords};
pub use zoom::ZoomAlgorithm;
