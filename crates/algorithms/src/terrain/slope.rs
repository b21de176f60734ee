//! Percent slope from DEMs
//!
//! Rise over run × 100, estimated from a 3×3 neighborhood with either the
//! Horn (1981) or the Zevenbergen-Thorne (1987) gradient. The outermost
//! row and column of the raster carry slope 0.

use std::str::FromStr;

use crate::maybe_rayon::*;
use crate::terrain::gradient;
use dswe_core::{Algorithm, Error, Raster, RasterElement, Result, TerrainWindow};
use serde::{Deserialize, Serialize};

/// Fixed-point factor applied when percent slope is exported as `i16`
pub const PERCENT_SLOPE_SCALE: f32 = 10.0;

/// Fill value of the exported percent slope band
pub const PERCENT_SLOPE_NODATA: i16 = -9999;

/// Gradient estimator used for slope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeAlgorithm {
    /// Horn (1981) weighted differences over all eight neighbors
    #[default]
    Horn,
    /// Zevenbergen-Thorne (1987) central differences; square pixels only
    ZevenbergenThorne,
}

impl FromStr for SlopeAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "horn" => Ok(SlopeAlgorithm::Horn),
            "zevenbergen-thorne" | "zevenbergen_thorne" | "zt" => {
                Ok(SlopeAlgorithm::ZevenbergenThorne)
            }
            _ => Err(Error::invalid(
                "slope_algorithm",
                s,
                "expected 'horn' or 'zevenbergen-thorne'",
            )),
        }
    }
}

/// Parameters for slope calculation
#[derive(Debug, Clone, Copy, Default)]
pub struct SlopeParams {
    /// Gradient estimator
    pub algorithm: SlopeAlgorithm,
}

/// Percent slope algorithm
#[derive(Debug, Clone, Default)]
pub struct Slope;

impl Algorithm for Slope {
    type Input = Raster<f64>;
    type Output = Raster<f32>;
    type Params = SlopeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Slope"
    }

    fn description(&self) -> &'static str {
        "Calculate percent slope from a DEM using Horn or Zevenbergen-Thorne gradients"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        percent_slope(&input, params)
    }
}

/// Check that the pixel sizes can drive the chosen estimator
pub fn check_resolution(ew_res: f64, ns_res: f64, algorithm: SlopeAlgorithm) -> Result<()> {
    for (name, res) in [("ew_res", ew_res), ("ns_res", ns_res)] {
        if !(res.is_finite() && res > 0.0) {
            return Err(Error::invalid(name, res, "pixel size must be positive"));
        }
    }
    if algorithm == SlopeAlgorithm::ZevenbergenThorne
        && (ew_res - ns_res).abs() > f64::EPSILON * ew_res.max(ns_res)
    {
        return Err(Error::ResolutionMismatch { ew_res, ns_res });
    }
    Ok(())
}

/// Percent slope of a single interior window
#[inline]
pub fn percent_slope_at(
    window: &TerrainWindow,
    ew_res: f64,
    ns_res: f64,
    algorithm: SlopeAlgorithm,
) -> f64 {
    let g = match algorithm {
        SlopeAlgorithm::Horn => gradient::horn(window, ew_res, ns_res),
        SlopeAlgorithm::ZevenbergenThorne => gradient::zevenbergen_thorne(window, ew_res, ns_res),
    };
    100.0 * g.magnitude()
}

/// Calculate percent slope from a DEM
///
/// Pixel sizes come from the DEM's geotransform. Edge pixels are 0;
/// fill values inside a window are treated as ordinary elevations.
///
/// # Arguments
/// * `dem` - Input elevation raster
/// * `params` - Slope calculation parameters
///
/// # Returns
/// Raster with percent slope values, same shape and georeferencing as `dem`
pub fn percent_slope<T: RasterElement>(dem: &Raster<T>, params: SlopeParams) -> Result<Raster<f32>> {
    let (rows, cols) = dem.shape();
    let (ew_res, ns_res) = dem.resolution();
    check_resolution(ew_res, ns_res, params.algorithm)?;

    let mut output_data = vec![0.0_f32; rows * cols];
    if cols > 0 {
        output_data
            .par_chunks_mut(cols)
            .enumerate()
            .for_each(|(row, row_data)| {
                for (col, out) in row_data.iter_mut().enumerate() {
                    if let Some(w) = TerrainWindow::extract(dem, row, col) {
                        *out = percent_slope_at(&w, ew_res, ns_res, params.algorithm) as f32;
                    }
                }
            });
    }

    dem.derive(output_data, None)
}

/// Fixed-point export of percent slope: `value × 10 + 0.5`, truncated and
/// clamped to `i16::MAX`
#[inline]
pub fn scale_percent_slope_value(value: f32) -> i16 {
    let scaled = value * PERCENT_SLOPE_SCALE + 0.5;
    if scaled > i16::MAX as f32 {
        i16::MAX
    } else {
        scaled as i16
    }
}

/// Convert a percent slope raster to its `i16` export form
pub fn scale_percent_slope(slope: &Raster<f32>) -> Result<Raster<i16>> {
    let data: Vec<i16> = slope.data().iter().map(|&v| scale_percent_slope_value(v)).collect();
    slope.derive(data, Some(PERCENT_SLOPE_NODATA))
}
