//! Spectral water indices
//!
//! Per-pixel index formulas over surface reflectance, evaluated in `f32`.
//! Denominators are not guarded: a zero-sum band pair yields ±inf or NaN,
//! and every later threshold comparison against NaN is false.

/// Surface reflectance of the six optical bands at one pixel, already scaled
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reflectance {
    pub blue: f32,
    pub green: f32,
    pub red: f32,
    pub nir: f32,
    pub swir1: f32,
    pub swir2: f32,
}

/// `(a - b) / (a + b)`
#[inline]
pub fn normalized_difference(a: f32, b: f32) -> f32 {
    (a - b) / (a + b)
}

/// Modified Normalized Difference Water Index (Xu 2006)
#[inline]
pub fn mndwi(green: f32, swir1: f32) -> f32 {
    normalized_difference(green, swir1)
}

/// Normalized Difference Vegetation Index
#[inline]
pub fn ndvi(nir: f32, red: f32) -> f32 {
    normalized_difference(nir, red)
}

/// Multi-band spectral relationship, visible: green + red
#[inline]
pub fn mbsrv(green: f32, red: f32) -> f32 {
    green + red
}

/// Multi-band spectral relationship, near-infrared: nir + swir1
#[inline]
pub fn mbsrn(nir: f32, swir1: f32) -> f32 {
    nir + swir1
}

/// Automated Water Extent Shadow index:
/// `blue + 2.5·green − 1.5·MBSRN − 0.25·swir2`
#[inline]
pub fn awesh(blue: f32, green: f32, mbsrn: f32, swir2: f32) -> f32 {
    blue + 2.5 * green - 1.5 * mbsrn - 0.25 * swir2
}

/// Every index the diagnostic tests read, computed once per pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralIndices {
    pub mndwi: f32,
    pub mbsrv: f32,
    pub mbsrn: f32,
    pub awesh: f32,
    pub ndvi: f32,
}

impl SpectralIndices {
    #[inline]
    pub fn compute(r: &Reflectance) -> Self {
        let mbsrn = mbsrn(r.nir, r.swir1);
        Self {
            mndwi: mndwi(r.green, r.swir1),
            mbsrv: mbsrv(r.green, r.red),
            mbsrn,
            awesh: awesh(r.blue, r.green, mbsrn, r.swir2),
            ndvi: ndvi(r.nir, r.red),
        }
    }
}
