//! Main Raster type

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, RasterElement};
use ndarray::Array2;

/// A georeferenced single-band raster.
///
/// `Raster<T>` stores one band of `lines x samples` values in row-major
/// order together with its geotransform and the band's fill value.
///
/// # Example
///
/// ```ignore
/// use dswe_core::Raster;
///
/// let mut green: Raster<i16> = Raster::new(100, 100);
/// green.set_nodata(Some(-9999));
/// green.set(10, 20, 812)?;
/// assert!(!green.is_nodata_at(10, 20)?);
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Raster data stored in row-major order (line, sample)
    data: Array2<T>,
    /// Affine transformation
    transform: GeoTransform,
    /// Fill value marking "no data" samples
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_array(Array2::zeros((rows, cols)))
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Create a raster from a flat row-major buffer
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self::from_array(array))
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self {
            data,
            transform: GeoTransform::default(),
            nodata: None,
        }
    }

    /// Wrap a flat row-major buffer with this raster's shape and georeferencing
    pub fn derive<U: RasterElement>(&self, data: Vec<U>, nodata: Option<U>) -> Result<Raster<U>> {
        let (rows, cols) = self.shape();
        let mut output = Raster::from_vec(data, rows, cols)?;
        output.transform = self.transform;
        output.nodata = nodata;
        Ok(output)
    }

    // Dimensions

    /// Number of rows (lines)
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns (samples)
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fail with `SizeMismatch` unless `other` has this raster's shape
    pub fn ensure_same_shape<U: RasterElement>(&self, band: &'static str, other: &Raster<U>) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::SizeMismatch {
                band,
                er: self.rows(),
                ec: self.cols(),
                ar: other.rows(),
                ac: other.cols(),
            });
        }
        Ok(())
    }

    /// Fail with `TransformMismatch` if both rasters are georeferenced and
    /// their grids do not line up
    ///
    /// A raster without georeferencing is accepted against any grid.
    pub fn ensure_same_grid<U: RasterElement>(&self, band: &'static str, other: &Raster<U>) -> Result<()> {
        let (a, b) = (self.transform(), other.transform());
        if a.is_georeferenced() && b.is_georeferenced() && !a.matches(b) {
            return Err(Error::TransformMismatch {
                band,
                expected: format!("{:?}", a),
                actual: format!("{:?}", b),
            });
        }
        Ok(())
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Get value at (row, col) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure row < self.rows() and col < self.cols()
    #[inline]
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> T {
        unsafe { *self.data.uget((row, col)) }
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    // Metadata

    /// Get the geotransform
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Set the geotransform
    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    /// Get the fill value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the fill value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// East-west and north-south pixel size in map units
    pub fn resolution(&self) -> (f64, f64) {
        self.transform.resolution()
    }

    /// Map bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.cols(), self.rows())
    }

    // Value checks

    /// Check if a value is this band's fill value
    #[inline]
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    /// Check if cell at (row, col) contains fill
    pub fn is_nodata_at(&self, row: usize, col: usize) -> Result<bool> {
        let value = self.get(row, col)?;
        Ok(self.is_nodata(value))
    }

    // Statistics

    /// Min, max and valid-cell count, skipping fill
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut valid_count = 0;

        for &value in self.data.iter() {
            if self.is_nodata(value) {
                continue;
            }
            if min.map_or(true, |m| value < m) {
                min = Some(value);
            }
            if max.map_or(true, |m| value > m) {
                max = Some(value);
            }
            valid_count += 1;
        }

        RasterStatistics {
            min,
            max,
            valid_count,
            nodata_count: self.len() - valid_count,
        }
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub valid_count: usize,
    pub nodata_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_creation() {
        let raster: Raster<i16> = Raster::new(100, 200);
        assert_eq!(raster.rows(), 100);
        assert_eq!(raster.cols(), 200);
        assert_eq!(raster.shape(), (100, 200));
    }

    #[test]
    fn test_ensure_same_grid() {
        let mut a: Raster<i16> = Raster::new(2, 2);
        let mut b: Raster<u16> = Raster::new(2, 2);
        assert!(a.ensure_same_grid("b", &b).is_ok());

        a.set_transform(GeoTransform::new(500_000.0, 4_000_000.0, 30.0, -30.0));
        assert!(a.ensure_same_grid("b", &b).is_ok());

        b.set_transform(GeoTransform::new(500_030.0, 4_000_000.0, 30.0, -30.0));
        assert!(matches!(
            a.ensure_same_grid("b", &b),
            Err(Error::TransformMismatch { band: "b", .. })
        ));

        b.set_transform(*a.transform());
        assert!(a.ensure_same_grid("b", &b).is_ok());
    }

    #[test]
    fn test_from_vec_rejects_bad_length() {
        let err = Raster::<u8>::from_vec(vec![0; 5], 2, 3);
        assert!(matches!(err, Err(Error::InvalidDimensions { width: 3, height: 2 })));
    }

    #[test]
    fn test_from_vec_is_row_major() {
        let raster = Raster::from_vec(vec![0i16, 1, 2, 3, 4, 5], 2, 3).unwrap();
        assert_eq!(raster.get(0, 2).unwrap(), 2);
        assert_eq!(raster.get(1, 0).unwrap(), 3);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut raster: Raster<f32> = Raster::new(4, 4);
        assert!(raster.get(4, 0).is_err());
        assert!(raster.set(0, 4, 1.0).is_err());
    }

    #[test]
    fn test_shape_mismatch() {
        let a: Raster<i16> = Raster::new(4, 4);
        let b: Raster<u16> = Raster::new(4, 5);
        let err = a.ensure_same_shape("qa", &b).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { band: "qa", .. }));
        assert!(a.ensure_same_shape("self", &a).is_ok());
    }

    #[test]
    fn test_statistics_skip_fill() {
        let mut raster = Raster::from_vec(vec![-9999i16, 10, 20, 30], 2, 2).unwrap();
        raster.set_nodata(Some(-9999));

        let stats = raster.statistics();
        assert_eq!(stats.min, Some(10));
        assert_eq!(stats.max, Some(30));
        assert_eq!(stats.valid_count, 3);
        assert_eq!(stats.nodata_count, 1);
    }

    #[test]
    fn test_derive_keeps_transform() {
        let mut raster: Raster<i16> = Raster::new(2, 2);
        raster.set_transform(GeoTransform::new(10.0, 20.0, 30.0, -30.0));
        let out = raster.derive(vec![1u8, 2, 3, 4], Some(255)).unwrap();
        assert_eq!(out.transform(), raster.transform());
        assert_eq!(out.nodata(), Some(255));
    }
}
