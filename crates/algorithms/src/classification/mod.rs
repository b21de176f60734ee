//! Water classification
//!
//! - **diagnostic**: five spectral tests packed into a digit-encoded raw code
//! - **recode**: raw code to confidence class lookup
//! - **quality**: cloud, cloud shadow and snow flags from the quality band
//! - **mask**: slope, hillshade and quality masking of the class
//! - **thresholds**: threshold sets, sensor defaults and overrides

mod diagnostic;
mod mask;
mod quality;
mod recode;
mod thresholds;

pub use diagnostic::{classify, classify_indices, RawCode, DIAGNOSTIC_NODATA};
pub use mask::{composite, Composite, MaskBits, MASK_NODATA};
pub use quality::{QualityEncoding, QualityFlags};
pub use recode::{recode, ConfidenceClass};
pub use thresholds::{DsweThresholds, Sensor, SlopeThresholds, SpectralThresholds, ThresholdOverrides};
