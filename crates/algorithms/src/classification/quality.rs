//! Quality band decoding
//!
//! Cloud, cloud shadow and snow flags come from the scene's quality band,
//! either as individual bits (Collection pixel QA) or as a single class
//! code per pixel (legacy CFmask).

use dswe_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Atmospheric and surface conditions that make a pixel unusable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct QualityFlags {
    pub cloud: bool,
    pub cloud_shadow: bool,
    pub snow: bool,
}

impl QualityFlags {
    pub const CLEAR: QualityFlags = QualityFlags {
        cloud: false,
        cloud_shadow: false,
        snow: false,
    };

    /// Whether any flag is raised
    #[inline]
    pub fn any(self) -> bool {
        self.cloud || self.cloud_shadow || self.snow
    }
}

/// Layout of the quality band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityEncoding {
    /// One bit per condition
    PixelQa {
        cloud_shadow_bit: u8,
        snow_bit: u8,
        cloud_bit: u8,
    },
    /// CFmask class codes: 2 = cloud shadow, 3 = snow, 4 = cloud
    Cfmask,
}

impl Default for QualityEncoding {
    fn default() -> Self {
        QualityEncoding::PixelQa {
            cloud_shadow_bit: 3,
            snow_bit: 4,
            cloud_bit: 5,
        }
    }
}

impl QualityEncoding {
    pub const CFMASK_CLOUD_SHADOW: u16 = 2;
    pub const CFMASK_SNOW: u16 = 3;
    pub const CFMASK_CLOUD: u16 = 4;

    /// Bit positions must address a 16-bit quality band
    pub fn validate(&self) -> Result<()> {
        if let QualityEncoding::PixelQa {
            cloud_shadow_bit,
            snow_bit,
            cloud_bit,
        } = *self
        {
            for (name, bit) in [
                ("cloud_shadow_bit", cloud_shadow_bit),
                ("snow_bit", snow_bit),
                ("cloud_bit", cloud_bit),
            ] {
                if bit >= 16 {
                    return Err(Error::invalid(name, bit, "quality bits must be in 0..16"));
                }
            }
        }
        Ok(())
    }

    /// Decode one quality sample
    #[inline]
    pub fn decode(&self, value: u16) -> QualityFlags {
        match *self {
            QualityEncoding::PixelQa {
                cloud_shadow_bit,
                snow_bit,
                cloud_bit,
            } => QualityFlags {
                cloud: bit_set(value, cloud_bit),
                cloud_shadow: bit_set(value, cloud_shadow_bit),
                snow: bit_set(value, snow_bit),
            },
            QualityEncoding::Cfmask => QualityFlags {
                cloud: value == Self::CFMASK_CLOUD,
                cloud_shadow: value == Self::CFMASK_CLOUD_SHADOW,
                snow: value == Self::CFMASK_SNOW,
            },
        }
    }
}

#[inline]
fn bit_set(value: u16, bit: u8) -> bool {
    1u16.checked_shl(bit as u32).is_some_and(|mask| value & mask != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_qa_bits() {
        let qa = QualityEncoding::default();
        assert_eq!(qa.decode(0), QualityFlags::CLEAR);
        // Clear + low confidence bits only
        assert!(!qa.decode(0b0000_0010_0100_0010).any());

        let f = qa.decode(1 << 3);
        assert!(f.cloud_shadow && !f.snow && !f.cloud);
        let f = qa.decode(1 << 4);
        assert!(f.snow && !f.cloud_shadow);
        let f = qa.decode((1 << 5) | (1 << 3));
        assert!(f.cloud && f.cloud_shadow && !f.snow);
    }

    #[test]
    fn test_cfmask_codes() {
        let qa = QualityEncoding::Cfmask;
        assert!(!qa.decode(0).any());
        assert!(!qa.decode(1).any());
        assert!(qa.decode(2).cloud_shadow);
        assert!(qa.decode(3).snow);
        assert!(qa.decode(4).cloud);
        assert!(!qa.decode(255).any());
    }

    #[test]
    fn test_validate_bits() {
        assert!(QualityEncoding::default().validate().is_ok());
        let bad = QualityEncoding::PixelQa {
            cloud_shadow_bit: 3,
            snow_bit: 16,
            cloud_bit: 5,
        };
        assert!(bad.validate().is_err());
        // Out-of-range bits decode as unset
        assert!(!bad.decode(u16::MAX).snow);
    }
}
