//! Whole-scene DSWE classification
//!
//! Terrain layers are computed once from the elevation band, then every
//! pixel runs the diagnostic tests, the recode lookup and the mask
//! compositor. Pixels where any band holds its fill value short-circuit to
//! fill in all outputs.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use tracing::{debug, info};

use crate::classification::{
    classify, composite, recode, ConfidenceClass, Composite, DsweThresholds, QualityEncoding,
    DIAGNOSTIC_NODATA, MASK_NODATA,
};
use crate::imagery::Reflectance;
use crate::maybe_rayon::*;
use crate::terrain::{
    check_resolution, hillshade, percent_slope, scale_percent_slope, HillshadeParams,
    SlopeAlgorithm, SlopeParams, SunGeometry,
};
use dswe_core::{Error, GeoTransform, Raster, RasterElement, Result};

/// Multiplicative scale applied to each reflectance band before the tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    pub blue: f32,
    pub green: f32,
    pub red: f32,
    pub nir: f32,
    pub swir1: f32,
    pub swir2: f32,
}

impl BandScale {
    /// The same factor for all six bands
    pub fn uniform(factor: f32) -> Self {
        Self {
            blue: factor,
            green: factor,
            red: factor,
            nir: factor,
            swir1: factor,
            swir2: factor,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, factor) in [
            ("blue_scale", self.blue),
            ("green_scale", self.green),
            ("red_scale", self.red),
            ("nir_scale", self.nir),
            ("swir1_scale", self.swir1),
            ("swir2_scale", self.swir2),
        ] {
            if !(factor.is_finite() && factor > 0.0) {
                return Err(Error::invalid(name, factor, "scale factor must be positive"));
            }
        }
        Ok(())
    }
}

impl Default for BandScale {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// Input rasters of one scene.
///
/// Every band carries its own fill value; all must share one shape.
#[derive(Debug, Clone, Copy)]
pub struct BandSet<'a, R: RasterElement, E: RasterElement> {
    pub blue: &'a Raster<R>,
    pub green: &'a Raster<R>,
    pub red: &'a Raster<R>,
    pub nir: &'a Raster<R>,
    pub swir1: &'a Raster<R>,
    pub swir2: &'a Raster<R>,
    pub quality: &'a Raster<u16>,
    pub elevation: &'a Raster<E>,
    pub scale: BandScale,
}

impl<'a, R: RasterElement, E: RasterElement> BandSet<'a, R, E> {
    /// (rows, cols) of the scene
    pub fn shape(&self) -> (usize, usize) {
        self.blue.shape()
    }

    /// Fail with `SizeMismatch` if any band differs in shape from blue, or
    /// `TransformMismatch` if it is georeferenced onto another grid
    pub fn validate(&self) -> Result<()> {
        let reference = self.blue;
        reference.ensure_same_shape("green", self.green)?;
        reference.ensure_same_shape("red", self.red)?;
        reference.ensure_same_shape("nir", self.nir)?;
        reference.ensure_same_shape("swir1", self.swir1)?;
        reference.ensure_same_shape("swir2", self.swir2)?;
        reference.ensure_same_shape("quality", self.quality)?;
        reference.ensure_same_shape("elevation", self.elevation)?;

        reference.ensure_same_grid("green", self.green)?;
        reference.ensure_same_grid("red", self.red)?;
        reference.ensure_same_grid("nir", self.nir)?;
        reference.ensure_same_grid("swir1", self.swir1)?;
        reference.ensure_same_grid("swir2", self.swir2)?;
        reference.ensure_same_grid("quality", self.quality)?;
        reference.ensure_same_grid("elevation", self.elevation)?;
        self.scale.validate()
    }

    /// Terrain pixel size: the explicit override, else the elevation band's
    /// own georeferencing
    fn resolution(&self, explicit: Option<(f64, f64)>) -> Result<(f64, f64)> {
        match explicit {
            Some(res) => Ok(res),
            None if self.elevation.transform().is_georeferenced() => Ok(self.elevation.resolution()),
            None => Err(Error::invalid(
                "resolution",
                "none",
                "elevation band has no georeferencing; set the pixel size explicitly",
            )),
        }
    }

    /// Whether any band holds its fill value at (row, col)
    ///
    /// # Safety
    /// Caller must ensure (row, col) is inside the validated shape
    #[inline]
    unsafe fn is_fill(&self, row: usize, col: usize) -> bool {
        let reflectance = [self.blue, self.green, self.red, self.nir, self.swir1, self.swir2];
        reflectance
            .iter()
            .any(|band| band.is_nodata(unsafe { band.get_unchecked(row, col) }))
            || self.quality.is_nodata(unsafe { self.quality.get_unchecked(row, col) })
            || self.elevation.is_nodata(unsafe { self.elevation.get_unchecked(row, col) })
    }

    /// Scaled reflectance at (row, col)
    ///
    /// # Safety
    /// Caller must ensure (row, col) is inside the validated shape
    #[inline]
    unsafe fn reflectance(&self, row: usize, col: usize) -> Reflectance {
        let s = &self.scale;
        let sample = |band: &Raster<R>, factor: f32| unsafe { band.get_unchecked(row, col) }.to_f32() * factor;
        Reflectance {
            blue: sample(self.blue, s.blue),
            green: sample(self.green, s.green),
            red: sample(self.red, s.red),
            nir: sample(self.nir, s.nir),
            swir1: sample(self.swir1, s.swir1),
            swir2: sample(self.swir2, s.swir2),
        }
    }
}

/// Parameters of a DSWE run
#[derive(Debug, Clone, Default)]
pub struct DsweParams {
    /// Resolved, validated before any pixel is processed
    pub thresholds: DsweThresholds,
    pub slope_algorithm: SlopeAlgorithm,
    pub sun: SunGeometry,
    pub quality_encoding: QualityEncoding,
    /// Hillshade value of the outermost row and column
    pub hillshade_edge: u8,
    /// (ew, ns) pixel size of the elevation band, overriding its
    /// georeferencing
    pub resolution: Option<(f64, f64)>,
    /// Emit the raw diagnostic code band
    pub include_diagnostic: bool,
    /// Emit the scaled percent slope band
    pub include_percent_slope: bool,
    /// Emit the hillshade band
    pub include_hillshade: bool,
}

impl DsweParams {
    /// Configuration checks that do not depend on the input rasters
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.quality_encoding.validate()?;
        self.sun.validate()
    }
}

/// Output bands of a DSWE run
#[derive(Debug, Clone)]
pub struct DsweOutput {
    /// Confidence class before masking
    pub interpreted: Raster<u8>,
    /// Confidence class after slope, hillshade and quality masking
    pub filtered: Raster<u8>,
    /// Mask bits
    pub mask: Raster<u8>,
    /// Raw diagnostic codes
    pub diagnostic: Option<Raster<i16>>,
    /// Percent slope × 10
    pub percent_slope: Option<Raster<i16>>,
    pub hillshade: Option<Raster<u8>>,
}

impl DsweOutput {
    /// Pixel counts of the filtered classification
    pub fn summary(&self) -> ClassSummary {
        ClassSummary::from_raster(&self.filtered)
    }
}

/// Per-class pixel counts of a classification band
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSummary {
    counts: BTreeMap<u8, usize>,
}

impl ClassSummary {
    pub fn from_raster(raster: &Raster<u8>) -> Self {
        let mut counts = BTreeMap::new();
        for &value in raster.data().iter() {
            *counts.entry(value).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, class: ConfidenceClass) -> usize {
        self.counts.get(&class.as_u8()).copied().unwrap_or(0)
    }

    /// All pixels, fill included
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Pixels in any water or wetland class
    pub fn water_like(&self) -> usize {
        self.counts
            .iter()
            .filter(|(v, _)| ConfidenceClass::from_u8(**v).is_some_and(ConfidenceClass::is_water_like))
            .map(|(_, &n)| n)
            .sum()
    }

    /// (byte value, count) pairs in ascending byte order
    pub fn iter(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.counts.iter().map(|(&v, &n)| (v, n))
    }
}

#[derive(Debug, Clone, Copy)]
struct PixelOutput {
    interpreted: u8,
    filtered: u8,
    mask: u8,
    diagnostic: i16,
}

impl PixelOutput {
    const FILL: PixelOutput = PixelOutput {
        interpreted: Composite::NO_DATA.0,
        filtered: Composite::NO_DATA.1,
        mask: Composite::NO_DATA.2,
        diagnostic: DIAGNOSTIC_NODATA,
    };
}

/// Classify a scene
///
/// See [`run_with_progress`].
pub fn run<R, E>(bands: &BandSet<'_, R, E>, params: &DsweParams) -> Result<DsweOutput>
where
    R: RasterElement,
    E: RasterElement,
{
    run_with_progress(bands, params, |_, _| {})
}

/// Classify a scene, reporting progress.
///
/// Configuration is validated before anything is computed; an invalid
/// threshold, band shape or pixel size fails the whole run.
///
/// # Arguments
/// * `bands` - Reflectance, quality and elevation rasters
/// * `params` - Thresholds, terrain settings and optional outputs
/// * `progress` - Called with (rows done, total rows) after each row
///
/// # Returns
/// Interpreted, filtered and mask bands plus the optional diagnostic,
/// percent slope and hillshade bands, all georeferenced like `bands.blue`
pub fn run_with_progress<R, E, F>(
    bands: &BandSet<'_, R, E>,
    params: &DsweParams,
    progress: F,
) -> Result<DsweOutput>
where
    R: RasterElement,
    E: RasterElement,
    F: Fn(usize, usize) + Sync,
{
    params.validate()?;
    bands.validate()?;
    let (ew_res, ns_res) = bands.resolution(params.resolution)?;
    check_resolution(ew_res, ns_res, params.slope_algorithm)?;

    let elevation: Cow<'_, Raster<E>> = if params.resolution.is_some() {
        let mut dem = bands.elevation.clone();
        let gt = *dem.transform();
        dem.set_transform(GeoTransform::new(gt.origin_x, gt.origin_y, ew_res, -ns_res));
        Cow::Owned(dem)
    } else {
        Cow::Borrowed(bands.elevation)
    };

    let (rows, cols) = bands.shape();
    info!(rows, cols, algorithm = ?params.slope_algorithm, "classifying scene");
    debug!(thresholds = ?params.thresholds, quality = ?params.quality_encoding, "resolved configuration");

    let start = Instant::now();
    let slope = percent_slope(
        &*elevation,
        SlopeParams {
            algorithm: params.slope_algorithm,
        },
    )?;
    let shade = hillshade(
        &*elevation,
        HillshadeParams {
            sun: params.sun,
            edge_value: params.hillshade_edge,
        },
    )?;
    debug!(elapsed = ?start.elapsed(), "terrain layers computed");

    let start = Instant::now();
    let thresholds = &params.thresholds;
    let rows_done = AtomicUsize::new(0);

    let pixels: Vec<PixelOutput> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![PixelOutput::FILL; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                // row < rows and col < cols, and every band shares the shape
                if unsafe { bands.is_fill(row, col) } {
                    continue;
                }

                let r = unsafe { bands.reflectance(row, col) };
                let code = classify(&r, &thresholds.spectral);
                let class = recode(code);
                let flags = params
                    .quality_encoding
                    .decode(unsafe { bands.quality.get_unchecked(row, col) });
                let c = composite(
                    class,
                    unsafe { slope.get_unchecked(row, col) },
                    unsafe { shade.get_unchecked(row, col) },
                    flags,
                    &thresholds.slope,
                    thresholds.hillshade,
                );

                let (interpreted, filtered, mask) = c.to_bytes();
                *out = PixelOutput {
                    interpreted,
                    filtered,
                    mask,
                    diagnostic: code.as_i16(),
                };
            }

            let done = rows_done.fetch_add(1, Ordering::Relaxed) + 1;
            progress(done, rows);
            row_data
        })
        .collect();
    debug!(elapsed = ?start.elapsed(), "pixels classified");

    let reference = bands.blue;
    let class_nodata = Some(ConfidenceClass::NoData.as_u8());
    let interpreted = reference.derive(pixels.iter().map(|p| p.interpreted).collect(), class_nodata)?;
    let filtered = reference.derive(pixels.iter().map(|p| p.filtered).collect(), class_nodata)?;
    let mask = reference.derive(pixels.iter().map(|p| p.mask).collect(), Some(MASK_NODATA))?;

    let diagnostic = if params.include_diagnostic {
        Some(reference.derive(
            pixels.iter().map(|p| p.diagnostic).collect(),
            Some(DIAGNOSTIC_NODATA),
        )?)
    } else {
        None
    };
    let percent_slope = if params.include_percent_slope {
        Some(scale_percent_slope(&slope)?)
    } else {
        None
    };
    let hillshade = params.include_hillshade.then_some(shade);

    let output = DsweOutput {
        interpreted,
        filtered,
        mask,
        diagnostic,
        percent_slope,
        hillshade,
    };

    let summary = output.summary();
    info!(
        water = summary.water_like(),
        cloud = summary.count(ConfidenceClass::CloudCloudShadowSnow),
        fill = summary.count(ConfidenceClass::NoData),
        "classification complete"
    );

    Ok(output)
}
