//! Multispectral imagery indices
//!
//! Per-pixel spectral indices consumed by the diagnostic water tests:
//! MNDWI, NDVI, MBSRV, MBSRN and AWEsh.

mod indices;

pub use indices::{awesh, mbsrn, mbsrv, mndwi, ndvi, normalized_difference, Reflectance, SpectralIndices};
