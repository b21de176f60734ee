//! # DSWE Core
//!
//! Core types, traits and I/O shared by the Dynamic Surface Water Extent
//! crates.
//!
//! This crate provides:
//! - `Raster<T>`: Generic single-band raster grid with a fill value
//! - `GeoTransform`: Affine transformation and pixel resolution
//! - `TerrainWindow`: The 3x3 elevation stencil used by slope and hillshade
//! - Algorithm trait for a consistent API
//! - GeoTIFF band I/O

pub mod error;
pub mod io;
pub mod raster;

pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement, SampleFormat, TerrainWindow};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement, TerrainWindow};
    pub use crate::Algorithm;
}

/// Core trait for the raster algorithms in DSWE.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
