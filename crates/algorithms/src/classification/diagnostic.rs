//! Raw diagnostic tests
//!
//! Five independent spectral tests, each contributing one decimal digit to
//! the raw code: ones = wetness, tens = visible brightness, hundreds = AWEsh,
//! thousands = partial surface water 1, ten-thousands = partial surface
//! water 2. A code therefore only contains the digits 0 and 1.

use std::fmt;

use crate::classification::SpectralThresholds;
use crate::imagery::{Reflectance, SpectralIndices};

/// Fill value of the diagnostic band
pub const DIAGNOSTIC_NODATA: i16 = -9999;

/// Digit-encoded outcome of the diagnostic tests, 0..=11111
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RawCode(u16);

impl RawCode {
    pub const WETNESS: u16 = 1;
    pub const VISIBLE_BRIGHTNESS: u16 = 10;
    pub const AWESH: u16 = 100;
    pub const PARTIAL_WATER_1: u16 = 1_000;
    pub const PARTIAL_WATER_2: u16 = 10_000;

    /// Wrap an existing code without checking its digits
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    #[inline]
    fn digit(self, place: u16) -> bool {
        (self.0 / place) % 10 != 0
    }

    pub fn wetness(self) -> bool {
        self.digit(Self::WETNESS)
    }

    pub fn visible_brightness(self) -> bool {
        self.digit(Self::VISIBLE_BRIGHTNESS)
    }

    pub fn awesh(self) -> bool {
        self.digit(Self::AWESH)
    }

    pub fn partial_water_1(self) -> bool {
        self.digit(Self::PARTIAL_WATER_1)
    }

    pub fn partial_water_2(self) -> bool {
        self.digit(Self::PARTIAL_WATER_2)
    }

    /// Value written to the diagnostic band
    pub fn as_i16(self) -> i16 {
        // 11111 is the largest code the tests produce
        self.0 as i16
    }
}

impl From<RawCode> for u16 {
    fn from(code: RawCode) -> u16 {
        code.0
    }
}

impl fmt::Display for RawCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

/// Run the five diagnostic tests on precomputed indices.
///
/// Every comparison is strict and false against NaN, so undefined indices
/// simply fail their test.
#[inline]
pub fn classify_indices(r: &Reflectance, idx: &SpectralIndices, t: &SpectralThresholds) -> RawCode {
    let mut code = 0;

    if idx.mndwi > t.wigt {
        code += RawCode::WETNESS;
    }

    if idx.mbsrv > idx.mbsrn {
        code += RawCode::VISIBLE_BRIGHTNESS;
    }

    if idx.awesh > t.awgt {
        code += RawCode::AWESH;
    }

    if idx.mndwi > t.pswt1_mndwi
        && r.swir1 < t.pswt1_swir1
        && r.nir < t.pswt1_nir
        && idx.ndvi < t.pswt1_ndvi
    {
        code += RawCode::PARTIAL_WATER_1;
    }

    if idx.mndwi > t.pswt2_mndwi
        && r.blue < t.pswt2_blue
        && r.swir1 < t.pswt2_swir1
        && r.swir2 < t.pswt2_swir2
        && r.nir < t.pswt2_nir
    {
        code += RawCode::PARTIAL_WATER_2;
    }

    RawCode(code)
}

/// Compute the spectral indices of one pixel and run the diagnostic tests
#[inline]
pub fn classify(r: &Reflectance, t: &SpectralThresholds) -> RawCode {
    classify_indices(r, &SpectralIndices::compute(r), t)
}
