//! Raw code to confidence class
//!
//! The mapping is an empirically derived lookup table, reproduced code by
//! code. It is not a function of the digit count.

use std::fmt;

use crate::classification::RawCode;

/// Interpreted DSWE class, with its output byte as discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum ConfidenceClass {
    #[default]
    NotWater = 0,
    WaterHighConfidence = 1,
    WaterModerateConfidence = 2,
    PotentialWetland = 3,
    LowConfidenceWaterOrWetland = 4,
    CloudCloudShadowSnow = 9,
    NoData = 255,
}

impl ConfidenceClass {
    /// Every class in output-byte order
    pub const ALL: [ConfidenceClass; 7] = [
        ConfidenceClass::NotWater,
        ConfidenceClass::WaterHighConfidence,
        ConfidenceClass::WaterModerateConfidence,
        ConfidenceClass::PotentialWetland,
        ConfidenceClass::LowConfidenceWaterOrWetland,
        ConfidenceClass::CloudCloudShadowSnow,
        ConfidenceClass::NoData,
    ];

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ConfidenceClass::NotWater),
            1 => Some(ConfidenceClass::WaterHighConfidence),
            2 => Some(ConfidenceClass::WaterModerateConfidence),
            3 => Some(ConfidenceClass::PotentialWetland),
            4 => Some(ConfidenceClass::LowConfidenceWaterOrWetland),
            9 => Some(ConfidenceClass::CloudCloudShadowSnow),
            255 => Some(ConfidenceClass::NoData),
            _ => None,
        }
    }

    /// Any of the four water or wetland classes
    pub fn is_water_like(self) -> bool {
        matches!(
            self,
            ConfidenceClass::WaterHighConfidence
                | ConfidenceClass::WaterModerateConfidence
                | ConfidenceClass::PotentialWetland
                | ConfidenceClass::LowConfidenceWaterOrWetland
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceClass::NotWater => "not water",
            ConfidenceClass::WaterHighConfidence => "water, high confidence",
            ConfidenceClass::WaterModerateConfidence => "water, moderate confidence",
            ConfidenceClass::PotentialWetland => "potential wetland",
            ConfidenceClass::LowConfidenceWaterOrWetland => "low confidence water or wetland",
            ConfidenceClass::CloudCloudShadowSnow => "cloud, cloud shadow or snow",
            ConfidenceClass::NoData => "fill",
        }
    }
}

impl From<ConfidenceClass> for u8 {
    fn from(class: ConfidenceClass) -> u8 {
        class.as_u8()
    }
}

impl fmt::Display for ConfidenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a raw diagnostic code to its confidence class.
///
/// Codes outside the table, including 1111, are not water.
pub fn recode(code: RawCode) -> ConfidenceClass {
    match code.value() {
        11111 | 10111 | 11011 | 11101 | 11110 => ConfidenceClass::WaterHighConfidence,

        111 | 1011 | 1101 | 1110 | 10011 | 10101 | 10110 | 11001 | 11010 | 11100 => {
            ConfidenceClass::WaterModerateConfidence
        }

        11000 => ConfidenceClass::PotentialWetland,

        11 | 101 | 110 | 1001 | 1010 | 1100 | 10000 | 10001 | 10010 | 10100 => {
            ConfidenceClass::LowConfidenceWaterOrWetland
        }

        _ => ConfidenceClass::NotWater,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_of(code: u16) -> ConfidenceClass {
        recode(RawCode::new(code))
    }

    #[test]
    fn test_high_confidence_codes() {
        for code in [11111, 10111, 11011, 11101, 11110] {
            assert_eq!(class_of(code), ConfidenceClass::WaterHighConfidence, "{}", code);
        }
    }

    #[test]
    fn test_moderate_confidence_codes() {
        for code in [111, 1011, 1101, 1110, 10011, 10101, 10110, 11001, 11010, 11100] {
            assert_eq!(class_of(code), ConfidenceClass::WaterModerateConfidence, "{}", code);
        }
    }

    #[test]
    fn test_wetland_and_low_confidence_codes() {
        assert_eq!(class_of(11000), ConfidenceClass::PotentialWetland);
        for code in [11, 101, 110, 1001, 1010, 1100, 10000, 10001, 10010, 10100] {
            assert_eq!(class_of(code), ConfidenceClass::LowConfidenceWaterOrWetland, "{}", code);
        }
    }

    #[test]
    fn test_unlisted_codes_are_not_water() {
        for code in [0, 1, 10, 100, 1000, 1111, 2, 9999, 99, 11112, u16::MAX] {
            assert_eq!(class_of(code), ConfidenceClass::NotWater, "{}", code);
        }
    }

    #[test]
    fn test_every_binary_code_has_a_defined_class() {
        // All 32 combinations of the five tests
        let mut counts = [0usize; 5];
        for bits in 0u16..32 {
            let code: u16 = [1u16, 10, 100, 1000, 10000]
                .iter()
                .enumerate()
                .filter(|&(i, _)| bits & (1 << i) != 0)
                .map(|(_, place)| place)
                .sum();
            let class = class_of(code);
            assert!(class.as_u8() <= 4);
            counts[class.as_u8() as usize] += 1;
        }
        // not water: 0, 1, 10, 100, 1000, 1111
        assert_eq!(counts, [6, 5, 10, 1, 10]);
    }

    #[test]
    fn test_byte_round_trip() {
        for class in ConfidenceClass::ALL {
            assert_eq!(ConfidenceClass::from_u8(class.as_u8()), Some(class));
        }
        assert_eq!(ConfidenceClass::from_u8(7), None);
        assert!(ConfidenceClass::PotentialWetland.is_water_like());
        assert!(!ConfidenceClass::CloudCloudShadowSnow.is_water_like());
    }
}
