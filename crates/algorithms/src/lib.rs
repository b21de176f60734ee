//! # DSWE Algorithms
//!
//! Dynamic Surface Water Extent classification for multispectral scenes.
//!
//! ## Algorithm Categories
//!
//! - **terrain**: Percent slope (Horn, Zevenbergen-Thorne) and hillshade from a DEM
//! - **imagery**: Per-pixel spectral indices (MNDWI, NDVI, MBSRV/MBSRN, AWEsh)
//! - **classification**: Raw diagnostic tests, recoding to confidence classes,
//!   quality-band decoding, and terrain/cloud mask compositing
//! - **pipeline**: Whole-scene orchestration producing the output bands

pub mod classification;
pub mod imagery;
pub(crate) mod maybe_rayon;
pub mod pipeline;
pub mod terrain;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classification::{
        classify, composite, recode, Composite, ConfidenceClass, DsweThresholds, MaskBits,
        QualityEncoding, QualityFlags, RawCode, Sensor, SlopeThresholds, SpectralThresholds,
        ThresholdOverrides,
    };
    pub use crate::imagery::{Reflectance, SpectralIndices};
    pub use crate::pipeline::{run, run_with_progress, BandScale, BandSet, ClassSummary, DsweOutput, DsweParams};
    pub use crate::terrain::{
        hillshade, percent_slope, scale_percent_slope, Hillshade, HillshadeParams, Slope,
        SlopeAlgorithm, SlopeParams, SunGeometry,
    };
    pub use dswe_core::prelude::*;
}
