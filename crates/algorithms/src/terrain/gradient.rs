//! First-order surface gradients from 3×3 elevation windows
//!
//! ```text
//! 3×3 window indexing:
//!
//!   w0 w1 w2      (NW) (N) (NE)
//!   w3 w4 w5  →   (W)  (C) (E)
//!   w6 w7 w8      (SW) (S) (SE)
//! ```
//!
//! Both estimators take the east-west and north-south pixel sizes
//! separately. The north-south resolution enters negated because rows run
//! north to south while map y grows northward.
//!
//! Reference:
//! Horn, B.K.P. (1981). Hill shading and the reflectance map. IEEE.
//! Zevenbergen, L.W. & Thorne, C.R. (1987). Quantitative analysis of
//!   land surface topography. ESPL.

use dswe_core::TerrainWindow;

/// Partial derivatives of elevation in map units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gradient {
    /// ∂z/∂x, positive when elevation drops eastward
    pub x: f64,
    /// ∂z/∂y
    pub y: f64,
}

impl Gradient {
    /// x² + y²
    #[inline]
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Rise over run: √(x² + y²)
    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Direction of steepest change, atan2(y, x)
    #[inline]
    pub fn aspect(&self) -> f64 {
        self.y.atan2(self.x)
    }
}

/// Horn's weighted differences, west minus east and south minus north
#[inline]
fn horn_differences(w: &TerrainWindow) -> (f64, f64) {
    let dx = (w[0] + 2.0 * w[3] + w[6]) - (w[2] + 2.0 * w[5] + w[8]);
    let dy = (w[6] + 2.0 * w[7] + w[8]) - (w[0] + 2.0 * w[1] + w[2]);
    (dx, dy)
}

/// Horn (1981) gradient.
///
/// ```text
/// x = ((w0 + 2·w3 + w6) − (w2 + 2·w5 + w8)) / (8 · ew_res)
/// y = ((w6 + 2·w7 + w8) − (w0 + 2·w1 + w2)) / (8 · −ns_res)
/// ```
#[inline]
pub fn horn(w: &TerrainWindow, ew_res: f64, ns_res: f64) -> Gradient {
    let (dx, dy) = horn_differences(w);
    Gradient {
        x: dx / (8.0 * ew_res),
        y: dy / (8.0 * -ns_res),
    }
}

/// Horn differences divided by resolution only.
///
/// The hillshade model applies the 1/8 factor itself through its z-scale.
#[inline]
pub fn horn_unnormalized(w: &TerrainWindow, ew_res: f64, ns_res: f64) -> Gradient {
    let (dx, dy) = horn_differences(w);
    Gradient {
        x: dx / ew_res,
        y: dy / -ns_res,
    }
}

/// Zevenbergen-Thorne (1987) central-difference gradient.
///
/// ```text
/// x = (w5 − w3) / (2 · ew_res)
/// y = (w1 − w7) / (2 · −ns_res)
/// ```
#[inline]
pub fn zevenbergen_thorne(w: &TerrainWindow, ew_res: f64, ns_res: f64) -> Gradient {
    Gradient {
        x: (w[5] - w[3]) / (2.0 * ew_res),
        y: (w[1] - w[7]) / (2.0 * -ns_res),
    }
}
