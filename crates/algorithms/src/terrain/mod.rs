//! Terrain analysis algorithms
//!
//! Per-pixel terrain layers derived once per scene from the elevation band:
//! - Slope: percent slope (Horn or Zevenbergen-Thorne gradient)
//! - Hillshade: 8-bit shaded relief for a given sun position
//!
//! Both read a fixed 3×3 neighborhood and leave the outermost row and column
//! at a caller-defined edge value.

pub mod gradient;
mod hillshade;
mod slope;

pub use gradient::Gradient;
pub use hillshade::{hillshade, relief_at, scale_relief, Hillshade, HillshadeParams, SunGeometry, Z_SCALE};
pub use slope::{
    check_resolution, percent_slope, percent_slope_at, scale_percent_slope,
    scale_percent_slope_value, Slope, SlopeAlgorithm, SlopeParams, PERCENT_SLOPE_NODATA,
    PERCENT_SLOPE_SCALE,
};
