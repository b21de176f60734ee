//! Raster element trait for band sample values

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// On-disk sample layout of a raster element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    U8,
    U16,
    I16,
    I32,
    F32,
    F64,
}

/// Trait for types that can be stored in a raster cell.
///
/// Covers the sample types that appear in surface reflectance products:
/// 8-bit class and mask bands, 16-bit reflectance and quality bands, and
/// floating point intermediates.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Check if this value equals the band's fill value.
    ///
    /// Fill detection is an exact comparison; a band without a declared
    /// fill value never reports fill.
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// Sample layout used when this type is written to disk
    fn sample_format() -> SampleFormat;

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }

    /// Convert self to f32, the working precision of the spectral tests
    fn to_f32(self) -> f32 {
        NumCast::from(self).unwrap_or(f32::NAN)
    }
}

macro_rules! impl_raster_element_int {
    ($t:ty, $fmt:ident) => {
        impl RasterElement for $t {
            #[inline]
            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                nodata == Some(*self)
            }

            fn sample_format() -> SampleFormat {
                SampleFormat::$fmt
            }
        }
    };
}

macro_rules! impl_raster_element_float {
    ($t:ty, $fmt:ident) => {
        impl RasterElement for $t {
            #[inline]
            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                match nodata {
                    // A NaN fill marks every NaN sample
                    Some(nd) if nd.is_nan() => self.is_nan(),
                    Some(nd) => *self == nd,
                    None => false,
                }
            }

            fn sample_format() -> SampleFormat {
                SampleFormat::$fmt
            }
        }
    };
}

impl_raster_element_int!(u8, U8);
impl_raster_element_int!(u16, U16);
impl_raster_element_int!(i16, I16);
impl_raster_element_int!(i32, I32);
impl_raster_element_float!(f32, F32);
impl_raster_element_float!(f64, F64);
