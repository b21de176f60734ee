//! Hillshade (shaded relief) calculation
//!
//! Relative illumination of the terrain for a given sun position, scaled to
//! an 8-bit intensity. Low values mark deep terrain shadow, which the mask
//! compositor treats as unreliable for water detection.

use crate::maybe_rayon::*;
use crate::terrain::gradient;
use crate::terrain::slope::check_resolution;
use crate::terrain::SlopeAlgorithm;
use dswe_core::{Algorithm, Error, Raster, RasterElement, Result, TerrainWindow};
use serde::{Deserialize, Serialize};

/// Z-scale of the Horn gradient used by the relief model (1/8)
pub const Z_SCALE: f64 = 0.125;

/// Sun position, angles in radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunGeometry {
    /// Elevation above the horizon; 0 at the horizon, π/2 overhead
    pub elevation: f64,
    /// Azimuth clockwise from north
    pub azimuth: f64,
}

impl SunGeometry {
    /// Sun position from elevation and azimuth in degrees
    pub fn from_degrees(elevation: f64, azimuth: f64) -> Self {
        Self {
            elevation: elevation.to_radians(),
            azimuth: azimuth.to_radians(),
        }
    }

    /// Sun position from zenith and azimuth in degrees, as scene metadata
    /// usually reports it
    pub fn from_zenith_degrees(zenith: f64, azimuth: f64) -> Self {
        Self::from_degrees(90.0 - zenith, azimuth)
    }

    /// Reject non-finite angles
    pub fn validate(&self) -> Result<()> {
        if !self.elevation.is_finite() {
            return Err(Error::invalid("sun_elevation", self.elevation, "must be finite"));
        }
        if !self.azimuth.is_finite() {
            return Err(Error::invalid("sun_azimuth", self.azimuth, "must be finite"));
        }
        Ok(())
    }
}

impl Default for SunGeometry {
    fn default() -> Self {
        // NW illumination, 45° above the horizon
        Self::from_degrees(45.0, 315.0)
    }
}

/// Parameters for hillshade calculation
#[derive(Debug, Clone, Copy, Default)]
pub struct HillshadeParams {
    /// Sun position
    pub sun: SunGeometry,
    /// Value written to the outermost row and column
    pub edge_value: u8,
}

/// Hillshade algorithm
#[derive(Debug, Clone, Default)]
pub struct Hillshade;

impl Algorithm for Hillshade {
    type Input = Raster<f64>;
    type Output = Raster<u8>;
    type Params = HillshadeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Hillshade"
    }

    fn description(&self) -> &'static str {
        "Calculate 8-bit shaded relief from a DEM"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        hillshade(&input, params)
    }
}

/// Relief scalar of a single interior window.
///
/// ```text
/// aspect = atan2(y, x)
/// relief = (sin(elev) − cos(elev) · 0.125 · √(x² + y²) · sin(aspect − azimuth))
///          / √(1 + 0.125² · (x² + y²))
/// ```
///
/// where x and y are Horn differences divided by the pixel size only.
#[inline]
pub fn relief_at(window: &TerrainWindow, ew_res: f64, ns_res: f64, sun: &SunGeometry) -> f64 {
    let g = gradient::horn_unnormalized(window, ew_res, ns_res);
    let xx_plus_yy = g.magnitude_squared();
    let aspect = g.aspect();

    (sun.elevation.sin()
        - sun.elevation.cos() * Z_SCALE * xx_plus_yy.sqrt() * (aspect - sun.azimuth).sin())
        / (1.0 + Z_SCALE * Z_SCALE * xx_plus_yy).sqrt()
}

/// Map a relief scalar to 0..=255: non-positive (or NaN) relief is 0,
/// otherwise `round(254 × relief) + 1`
#[inline]
pub fn scale_relief(relief: f64) -> u8 {
    if !(relief > 0.0) {
        return 0;
    }
    ((254.0 * relief).round() + 1.0).clamp(0.0, 255.0) as u8
}

/// Calculate hillshade from a DEM
///
/// # Arguments
/// * `dem` - Input elevation raster; pixel sizes come from its geotransform
/// * `params` - Sun position and the value for edge pixels
///
/// # Returns
/// 8-bit hillshade raster, same shape and georeferencing as `dem`
pub fn hillshade<T: RasterElement>(dem: &Raster<T>, params: HillshadeParams) -> Result<Raster<u8>> {
    let (rows, cols) = dem.shape();
    let (ew_res, ns_res) = dem.resolution();
    check_resolution(ew_res, ns_res, SlopeAlgorithm::Horn)?;
    params.sun.validate()?;

    let mut output_data = vec![params.edge_value; rows * cols];
    if cols > 0 {
        output_data
            .par_chunks_mut(cols)
            .enumerate()
            .for_each(|(row, row_data)| {
                for (col, out) in row_data.iter_mut().enumerate() {
                    if let Some(w) = TerrainWindow::extract(dem, row, col) {
                        *out = scale_relief(relief_at(&w, ew_res, ns_res, &params.sun));
                    }
                }
            });
    }

    dem.derive(output_data, None)
}
