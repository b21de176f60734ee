//! Classification thresholds and their per-sensor defaults
//!
//! Threshold resolution is an explicit step: start from the sensor's
//! defaults, layer [`ThresholdOverrides`] (from a JSON file, then from the
//! command line), and [`DsweThresholds::validate`] the result before any
//! pixel is processed.

use std::fmt;
use std::str::FromStr;

use dswe_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Thresholds of the five spectral diagnostic tests.
///
/// Reflectance thresholds are in the same units as the scaled band values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralThresholds {
    /// Wetness index threshold (MNDWI)
    pub wigt: f32,
    /// AWEsh threshold
    pub awgt: f32,
    pub pswt1_mndwi: f32,
    pub pswt1_nir: f32,
    pub pswt1_swir1: f32,
    pub pswt1_ndvi: f32,
    pub pswt2_mndwi: f32,
    pub pswt2_blue: f32,
    pub pswt2_nir: f32,
    pub pswt2_swir1: f32,
    pub pswt2_swir2: f32,
}

/// Percent slope at or above which each confidence class is masked
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeThresholds {
    pub high: f32,
    pub moderate: f32,
    pub wetland: f32,
    pub low: f32,
}

/// Complete threshold set consumed by the classifier and mask compositor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DsweThresholds {
    pub spectral: SpectralThresholds,
    pub slope: SlopeThresholds,
    /// Hillshade at or below which a pixel is masked as terrain shadow
    pub hillshade: u8,
}

impl Default for DsweThresholds {
    fn default() -> Self {
        Sensor::Landsat8.default_thresholds()
    }
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    // NaN fails both comparisons
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(Error::invalid(name, value, format!("must be in [{}, {}]", min, max)))
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid(name, value, "must be a non-negative reflectance"))
    }
}

impl SpectralThresholds {
    pub fn validate(&self) -> Result<()> {
        check_range("wigt", self.wigt, 0.0, 2.0)?;
        check_range("awgt", self.awgt, -2.0, 2.0)?;
        check_range("pswt1_mndwi", self.pswt1_mndwi, -2.0, 2.0)?;
        check_range("pswt1_ndvi", self.pswt1_ndvi, 0.0, 2.0)?;
        check_range("pswt2_mndwi", self.pswt2_mndwi, -2.0, 2.0)?;
        check_non_negative("pswt1_nir", self.pswt1_nir)?;
        check_non_negative("pswt1_swir1", self.pswt1_swir1)?;
        check_non_negative("pswt2_blue", self.pswt2_blue)?;
        check_non_negative("pswt2_nir", self.pswt2_nir)?;
        check_non_negative("pswt2_swir1", self.pswt2_swir1)?;
        check_non_negative("pswt2_swir2", self.pswt2_swir2)?;
        Ok(())
    }
}

impl SlopeThresholds {
    pub fn validate(&self) -> Result<()> {
        check_range("percent_slope_high", self.high, 0.0, 100.0)?;
        check_range("percent_slope_moderate", self.moderate, 0.0, 100.0)?;
        check_range("percent_slope_wetland", self.wetland, 0.0, 100.0)?;
        check_range("percent_slope_low", self.low, 0.0, 100.0)?;
        Ok(())
    }
}

impl DsweThresholds {
    /// Range-check every threshold. The hillshade threshold is a `u8` and
    /// always in range.
    pub fn validate(&self) -> Result<()> {
        self.spectral.validate()?;
        self.slope.validate()
    }
}

/// Landsat instrument generation selecting the default thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sensor {
    /// Landsat 4, 5 and 7 (TM/ETM+)
    Landsat4To7,
    /// Landsat 8 (OLI)
    #[default]
    Landsat8,
}

impl Sensor {
    /// Default thresholds for this sensor generation
    pub fn default_thresholds(self) -> DsweThresholds {
        // Both generations are currently tuned to the same values
        match self {
            Sensor::Landsat4To7 | Sensor::Landsat8 => DsweThresholds {
                spectral: SpectralThresholds {
                    wigt: 0.124,
                    awgt: 0.0,
                    pswt1_mndwi: -0.44,
                    pswt1_nir: 1500.0,
                    pswt1_swir1: 900.0,
                    pswt1_ndvi: 0.7,
                    pswt2_mndwi: -0.5,
                    pswt2_blue: 1000.0,
                    pswt2_nir: 2500.0,
                    pswt2_swir1: 3000.0,
                    pswt2_swir2: 1000.0,
                },
                slope: SlopeThresholds {
                    high: 30.0,
                    moderate: 30.0,
                    wetland: 20.0,
                    low: 10.0,
                },
                hillshade: 110,
            },
        }
    }
}

impl FromStr for Sensor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "landsat4" | "landsat5" | "landsat7" | "l4" | "l5" | "l7" | "l47" | "landsat47"
            | "lt04" | "lt05" | "le07" => Ok(Sensor::Landsat4To7),
            "landsat8" | "l8" | "lc08" => Ok(Sensor::Landsat8),
            _ => Err(Error::invalid(
                "sensor",
                s,
                "unsupported satellite, expected LANDSAT_4, LANDSAT_5, LANDSAT_7 or LANDSAT_8",
            )),
        }
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sensor::Landsat4To7 => write!(f, "Landsat 4-7"),
            Sensor::Landsat8 => write!(f, "Landsat 8"),
        }
    }
}

/// Sparse threshold overrides, e.g. a JSON configuration file.
///
/// Field names match the command-line flags with `_` for `-`. Unknown keys
/// are rejected so that a misspelt threshold is not silently ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdOverrides {
    pub wigt: Option<f32>,
    pub awgt: Option<f32>,
    pub pswt1_mndwi: Option<f32>,
    pub pswt1_nir: Option<f32>,
    pub pswt1_swir1: Option<f32>,
    pub pswt1_ndvi: Option<f32>,
    pub pswt2_mndwi: Option<f32>,
    pub pswt2_blue: Option<f32>,
    pub pswt2_nir: Option<f32>,
    pub pswt2_swir1: Option<f32>,
    pub pswt2_swir2: Option<f32>,
    pub percent_slope_high: Option<f32>,
    pub percent_slope_moderate: Option<f32>,
    pub percent_slope_wetland: Option<f32>,
    pub percent_slope_low: Option<f32>,
    pub hillshade: Option<u8>,
}

fn set<T: Copy>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}

impl ThresholdOverrides {
    /// Combine two override layers; values in `other` win
    pub fn merge(self, other: ThresholdOverrides) -> Self {
        Self {
            wigt: other.wigt.or(self.wigt),
            awgt: other.awgt.or(self.awgt),
            pswt1_mndwi: other.pswt1_mndwi.or(self.pswt1_mndwi),
            pswt1_nir: other.pswt1_nir.or(self.pswt1_nir),
            pswt1_swir1: other.pswt1_swir1.or(self.pswt1_swir1),
            pswt1_ndvi: other.pswt1_ndvi.or(self.pswt1_ndvi),
            pswt2_mndwi: other.pswt2_mndwi.or(self.pswt2_mndwi),
            pswt2_blue: other.pswt2_blue.or(self.pswt2_blue),
            pswt2_nir: other.pswt2_nir.or(self.pswt2_nir),
            pswt2_swir1: other.pswt2_swir1.or(self.pswt2_swir1),
            pswt2_swir2: other.pswt2_swir2.or(self.pswt2_swir2),
            percent_slope_high: other.percent_slope_high.or(self.percent_slope_high),
            percent_slope_moderate: other.percent_slope_moderate.or(self.percent_slope_moderate),
            percent_slope_wetland: other.percent_slope_wetland.or(self.percent_slope_wetland),
            percent_slope_low: other.percent_slope_low.or(self.percent_slope_low),
            hillshade: other.hillshade.or(self.hillshade),
        }
    }

    /// Apply the overrides on top of `base`. The result is not validated.
    pub fn apply(&self, base: DsweThresholds) -> DsweThresholds {
        let mut t = base;
        let s = &mut t.spectral;
        set(&mut s.wigt, self.wigt);
        set(&mut s.awgt, self.awgt);
        set(&mut s.pswt1_mndwi, self.pswt1_mndwi);
        set(&mut s.pswt1_nir, self.pswt1_nir);
        set(&mut s.pswt1_swir1, self.pswt1_swir1);
        set(&mut s.pswt1_ndvi, self.pswt1_ndvi);
        set(&mut s.pswt2_mndwi, self.pswt2_mndwi);
        set(&mut s.pswt2_blue, self.pswt2_blue);
        set(&mut s.pswt2_nir, self.pswt2_nir);
        set(&mut s.pswt2_swir1, self.pswt2_swir1);
        set(&mut s.pswt2_swir2, self.pswt2_swir2);
        let p = &mut t.slope;
        set(&mut p.high, self.percent_slope_high);
        set(&mut p.moderate, self.percent_slope_moderate);
        set(&mut p.wetland, self.percent_slope_wetland);
        set(&mut p.low, self.percent_slope_low);
        set(&mut t.hillshade, self.hillshade);
        t
    }
}
