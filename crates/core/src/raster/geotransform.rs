//! North-up georeferencing of a scene grid

use serde::{Deserialize, Serialize};

/// Upper-left corner and pixel size of a north-up grid.
///
/// ```text
/// x = origin_x + col * pixel_width
/// y = origin_y + row * pixel_height
/// ```
///
/// Rows run southward, so `pixel_height` is negative for a conventional
/// scene. Terrain stencils only need the magnitudes, see
/// [`GeoTransform::resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// Map x of the upper-left corner
    pub origin_x: f64,
    /// Map y of the upper-left corner
    pub origin_y: f64,
    /// East-west pixel size
    pub pixel_width: f64,
    /// North-south pixel size, negative when rows run south
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// East-west and north-south pixel size, both positive.
    ///
    /// The southward sign of rows is applied by the gradient operators.
    pub fn resolution(&self) -> (f64, f64) {
        (self.pixel_width.abs(), self.pixel_height.abs())
    }

    /// Map coordinates of the upper-left corner of pixel (row, col)
    pub fn corner(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_x + col as f64 * self.pixel_width,
            self.origin_y + row as f64 * self.pixel_height,
        )
    }

    /// False for the unit image-space transform of a raster read without
    /// georeferencing tags
    pub fn is_georeferenced(&self) -> bool {
        *self != Self::default()
    }

    /// Whether two grids line up, within a relative tolerance of 1e-9
    pub fn matches(&self, other: &GeoTransform) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0);
        close(self.origin_x, other.origin_x)
            && close(self.origin_y, other.origin_y)
            && close(self.pixel_width, other.pixel_width)
            && close(self.pixel_height, other.pixel_height)
    }

    /// Map extent (min_x, min_y, max_x, max_y) of a `rows x cols` grid
    pub fn bounds(&self, cols: usize, rows: usize) -> (f64, f64, f64, f64) {
        let (x0, y0) = self.corner(0, 0);
        let (x1, y1) = self.corner(rows, cols);
        (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }
}

impl Default for GeoTransform {
    /// Unit pixels in image space
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resolution_is_positive() {
        let gt = GeoTransform::new(500_000.0, 4_200_000.0, 30.0, -30.0);
        assert_eq!(gt.resolution(), (30.0, 30.0));

        let gt = GeoTransform::new(0.0, 0.0, 25.0, -30.0);
        assert_eq!(gt.resolution(), (25.0, 30.0));
    }

    #[test]
    fn test_corner() {
        let gt = GeoTransform::new(100.0, 200.0, 30.0, -30.0);
        assert_eq!(gt.corner(0, 0), (100.0, 200.0));
        assert_eq!(gt.corner(2, 1), (130.0, 140.0));
    }

    #[test]
    fn test_georeferenced() {
        assert!(!GeoTransform::default().is_georeferenced());
        assert!(GeoTransform::new(0.0, 0.0, 30.0, -30.0).is_georeferenced());
    }

    #[test]
    fn test_matches_tolerates_rounding() {
        let a = GeoTransform::new(500_000.0, 4_200_000.0, 30.0, -30.0);
        let b = GeoTransform::new(500_000.0 + 1e-6, 4_200_000.0, 30.0, -30.0);
        assert!(a.matches(&b));
        assert!(!a.matches(&GeoTransform::new(500_030.0, 4_200_000.0, 30.0, -30.0)));
        assert!(!a.matches(&GeoTransform::new(500_000.0, 4_200_000.0, 60.0, -60.0)));
    }

    #[test]
    fn test_bounds() {
        let gt = GeoTransform::new(0.0, 3000.0, 30.0, -30.0);
        let (min_x, min_y, max_x, max_y) = gt.bounds(50, 100);

        assert_relative_eq!(min_x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(min_y, 0.0, epsilon = 1e-10);
        assert_relative_eq!(max_x, 1500.0, epsilon = 1e-10);
        assert_relative_eq!(max_y, 3000.0, epsilon = 1e-10);
    }
}
