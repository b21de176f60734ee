//! Raster data structures

mod element;
mod geotransform;
mod grid;
mod window;

pub use element::{RasterElement, SampleFormat};
pub use geotransform::GeoTransform;
pub use grid::{Raster, RasterStatistics};
pub use window::TerrainWindow;
