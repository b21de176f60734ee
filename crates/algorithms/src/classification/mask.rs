//! Terrain and quality mask compositing
//!
//! Applied in a fixed order, each step can only downgrade the class:
//!
//! 1. start from the interpreted class with an empty mask
//! 2. mask the class when percent slope reaches its class threshold
//! 3. copy the quality flags into the shadow, snow and cloud bits
//! 4. mask anything at or below the hillshade threshold
//! 5. any quality flag overrides the result with cloud/shadow/snow

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::classification::{ConfidenceClass, QualityFlags, SlopeThresholds};

/// Mask byte of fill pixels
pub const MASK_NODATA: u8 = 255;

/// Five independent mask flags packed into one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaskBits(u8);

impl MaskBits {
    pub const SHADOW: MaskBits = MaskBits(1 << 0);
    pub const SNOW: MaskBits = MaskBits(1 << 1);
    pub const CLOUD: MaskBits = MaskBits(1 << 2);
    pub const PERCENT_SLOPE: MaskBits = MaskBits(1 << 3);
    pub const HILLSHADE: MaskBits = MaskBits(1 << 4);

    pub const fn empty() -> Self {
        MaskBits(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Keep only the five defined bits
    pub const fn from_bits_truncate(bits: u8) -> Self {
        MaskBits(bits & 0b1_1111)
    }

    #[inline]
    pub const fn contains(self, other: MaskBits) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: MaskBits) {
        self.0 |= other.0;
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Shadow, snow and cloud bits for a set of quality flags
    pub fn from_quality(flags: QualityFlags) -> Self {
        let mut bits = MaskBits::empty();
        if flags.cloud_shadow {
            bits.insert(MaskBits::SHADOW);
        }
        if flags.snow {
            bits.insert(MaskBits::SNOW);
        }
        if flags.cloud {
            bits.insert(MaskBits::CLOUD);
        }
        bits
    }
}

impl BitOr for MaskBits {
    type Output = MaskBits;

    fn bitor(self, rhs: MaskBits) -> MaskBits {
        MaskBits(self.0 | rhs.0)
    }
}

impl BitOrAssign for MaskBits {
    fn bitor_assign(&mut self, rhs: MaskBits) {
        self.insert(rhs);
    }
}

impl fmt::Binary for MaskBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}

/// Outputs of one pixel after masking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Composite {
    /// Class before any masking
    pub interpreted: ConfidenceClass,
    /// Class after slope, hillshade and quality masking
    pub filtered: ConfidenceClass,
    pub mask: MaskBits,
}

impl Composite {
    /// Output triple of a fill pixel
    pub const NO_DATA: (u8, u8, u8) = (
        ConfidenceClass::NoData.as_u8(),
        ConfidenceClass::NoData.as_u8(),
        MASK_NODATA,
    );

    /// (interpreted, filtered, mask) bytes as written to the output bands
    pub fn to_bytes(self) -> (u8, u8, u8) {
        (self.interpreted.as_u8(), self.filtered.as_u8(), self.mask.bits())
    }
}

/// Percent slope threshold that applies to `class`, if any
fn slope_threshold(class: ConfidenceClass, t: &SlopeThresholds) -> Option<f32> {
    match class {
        ConfidenceClass::WaterHighConfidence => Some(t.high),
        ConfidenceClass::WaterModerateConfidence => Some(t.moderate),
        ConfidenceClass::PotentialWetland => Some(t.wetland),
        ConfidenceClass::LowConfidenceWaterOrWetland => Some(t.low),
        _ => None,
    }
}

/// Apply slope, hillshade and quality masking to one classified pixel
#[inline]
pub fn composite(
    class: ConfidenceClass,
    percent_slope: f32,
    hillshade: u8,
    flags: QualityFlags,
    slope_thresholds: &SlopeThresholds,
    hillshade_threshold: u8,
) -> Composite {
    let mut filtered = class;
    let mut mask = MaskBits::empty();

    if let Some(threshold) = slope_threshold(class, slope_thresholds) {
        if percent_slope >= threshold {
            filtered = ConfidenceClass::NotWater;
            mask |= MaskBits::PERCENT_SLOPE;
        }
    }

    mask |= MaskBits::from_quality(flags);

    if hillshade <= hillshade_threshold {
        filtered = ConfidenceClass::NotWater;
        mask |= MaskBits::HILLSHADE;
    }

    if flags.any() {
        filtered = ConfidenceClass::CloudCloudShadowSnow;
    }

    Composite {
        interpreted: class,
        filtered,
        mask,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{recode, DsweThresholds, RawCode};

    fn slope() -> SlopeThresholds {
        DsweThresholds::default().slope
    }

    const LIT: u8 = 200;
    const HS: u8 = 110;

    #[test]
    fn test_unmasked_pixel_keeps_class() {
        let c = composite(
            ConfidenceClass::WaterHighConfidence,
            2.0,
            LIT,
            QualityFlags::CLEAR,
            &slope(),
            HS,
        );
        assert_eq!(c.filtered, ConfidenceClass::WaterHighConfidence);
        assert!(c.mask.is_empty());
        assert_eq!(c.to_bytes(), (1, 1, 0));
    }

    #[test]
    fn test_steep_high_confidence_is_masked() {
        let class = recode(RawCode::new(11111));
        assert_eq!(class, ConfidenceClass::WaterHighConfidence);
        let c = composite(class, 30.0, LIT, QualityFlags::CLEAR, &slope(), HS);
        assert_eq!(c.interpreted, ConfidenceClass::WaterHighConfidence);
        assert_eq!(c.filtered, ConfidenceClass::NotWater);
        assert_eq!(c.mask, MaskBits::PERCENT_SLOPE);
        assert_eq!(c.to_bytes(), (1, 0, 0b1000));
    }

    #[test]
    fn test_slope_thresholds_follow_class() {
        let t = slope();
        // 15% is steep for low confidence (10) but not for wetland (20)
        let low = composite(ConfidenceClass::LowConfidenceWaterOrWetland, 15.0, LIT, QualityFlags::CLEAR, &t, HS);
        let wet = composite(ConfidenceClass::PotentialWetland, 15.0, LIT, QualityFlags::CLEAR, &t, HS);
        assert_eq!(low.filtered, ConfidenceClass::NotWater);
        assert!(low.mask.contains(MaskBits::PERCENT_SLOPE));
        assert_eq!(wet.filtered, ConfidenceClass::PotentialWetland);

        // Not water never gets the slope bit
        let dry = composite(ConfidenceClass::NotWater, 90.0, LIT, QualityFlags::CLEAR, &t, HS);
        assert!(dry.mask.is_empty());

        // NaN slope never masks
        let nan = composite(ConfidenceClass::WaterModerateConfidence, f32::NAN, LIT, QualityFlags::CLEAR, &t, HS);
        assert_eq!(nan.filtered, ConfidenceClass::WaterModerateConfidence);
    }

    #[test]
    fn test_hillshade_at_threshold_masks() {
        let class = recode(RawCode::new(11000));
        assert_eq!(class, ConfidenceClass::PotentialWetland);

        let c = composite(class, 0.0, HS, QualityFlags::CLEAR, &slope(), HS);
        assert_eq!(c.filtered, ConfidenceClass::NotWater);
        assert_eq!(c.mask, MaskBits::HILLSHADE);
        assert_eq!(c.to_bytes(), (3, 0, 0b1_0000));

        let c = composite(class, 0.0, HS + 1, QualityFlags::CLEAR, &slope(), HS);
        assert_eq!(c.filtered, ConfidenceClass::PotentialWetland);
    }

    #[test]
    fn test_quality_overrides_everything() {
        let flags = QualityFlags {
            cloud: false,
            cloud_shadow: true,
            snow: true,
        };
        let c = composite(ConfidenceClass::WaterModerateConfidence, 80.0, 0, flags, &slope(), HS);
        assert_eq!(c.filtered, ConfidenceClass::CloudCloudShadowSnow);
        assert_eq!(
            c.mask,
            MaskBits::SHADOW | MaskBits::SNOW | MaskBits::PERCENT_SLOPE | MaskBits::HILLSHADE
        );
        assert_eq!(c.to_bytes().1, 9);

        for class in ConfidenceClass::ALL {
            let flags = QualityFlags {
                cloud: true,
                ..QualityFlags::CLEAR
            };
            let c = composite(class, 0.0, LIT, flags, &slope(), HS);
            assert_eq!(c.filtered, ConfidenceClass::CloudCloudShadowSnow);
            assert!(c.mask.contains(MaskBits::CLOUD));
        }
    }

    #[test]
    fn test_no_data_triple() {
        assert_eq!(Composite::NO_DATA, (255, 255, 255));
        assert_eq!(MaskBits::from_bits_truncate(0xff).bits(), 0b1_1111);
    }
}
