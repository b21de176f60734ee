//! 3x3 elevation stencil for terrain operators

use super::{Raster, RasterElement};
use std::ops::Index;

/// The nine elevation samples surrounding a pixel.
///
/// ```text
/// 0 1 2      (NW) (N) (NE)
/// 3 4 5  ->  (W)  (C) (E)
/// 6 7 8      (SW) (S) (SE)
/// ```
///
/// Rows run north to south and columns west to east, matching the raster's
/// row-major layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainWindow {
    z: [f64; 9],
}

impl TerrainWindow {
    /// Index of the center sample
    pub const CENTER: usize = 4;

    /// Build a window from nine row-major samples
    pub fn new(z: [f64; 9]) -> Self {
        Self { z }
    }

    /// Whether (row, col) lies on the outermost ring of a `rows x cols` grid,
    /// where no full window exists
    #[inline]
    pub fn is_edge(rows: usize, cols: usize, row: usize, col: usize) -> bool {
        row == 0 || col == 0 || row + 1 >= rows || col + 1 >= cols
    }

    /// Read the window centered on (row, col).
    ///
    /// Returns `None` on the outermost row/column and for positions outside
    /// the raster.
    #[inline]
    pub fn extract<T: RasterElement>(raster: &Raster<T>, row: usize, col: usize) -> Option<Self> {
        let (rows, cols) = raster.shape();
        if Self::is_edge(rows, cols, row, col) {
            return None;
        }

        let mut z = [0.0; 9];
        for (k, value) in z.iter_mut().enumerate() {
            let r = row + k / 3 - 1;
            let c = col + k % 3 - 1;
            // In bounds: the edge check above guarantees a full 3x3 ring
            let sample = unsafe { raster.get_unchecked(r, c) };
            *value = sample.to_f64().unwrap_or(f64::NAN);
        }

        Some(Self { z })
    }

    /// All nine samples in row-major order
    pub fn values(&self) -> &[f64; 9] {
        &self.z
    }

    /// The center elevation
    pub fn center(&self) -> f64 {
        self.z[Self::CENTER]
    }
}

impl Index<usize> for TerrainWindow {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.z[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(rows: usize, cols: usize) -> Raster<i16> {
        let data = (0..rows * cols).map(|i| i as i16).collect();
        Raster::from_vec(data, rows, cols).unwrap()
    }

    #[test]
    fn test_extract_interior() {
        let dem = ramp(4, 5);
        let w = TerrainWindow::extract(&dem, 1, 1).unwrap();
        assert_eq!(w.values(), &[0.0, 1.0, 2.0, 5.0, 6.0, 7.0, 10.0, 11.0, 12.0]);
        assert_eq!(w.center(), 6.0);
        assert_eq!(w[8], 12.0);
    }

    #[test]
    fn test_edges_have_no_window() {
        let dem = ramp(4, 5);
        for col in 0..5 {
            assert!(TerrainWindow::extract(&dem, 0, col).is_none());
            assert!(TerrainWindow::extract(&dem, 3, col).is_none());
        }
        for row in 0..4 {
            assert!(TerrainWindow::extract(&dem, row, 0).is_none());
            assert!(TerrainWindow::extract(&dem, row, 4).is_none());
        }
        assert!(TerrainWindow::extract(&dem, 10, 10).is_none());
    }

    #[test]
    fn test_tiny_raster_is_all_edge() {
        let dem = ramp(2, 2);
        for row in 0..2 {
            for col in 0..2 {
                assert!(TerrainWindow::is_edge(2, 2, row, col));
                assert!(TerrainWindow::extract(&dem, row, col).is_none());
            }
        }
    }
}
