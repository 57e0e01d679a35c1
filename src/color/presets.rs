//! Color correction and color temperature presets
//!
//! Corrections compensate for the emitters of a given LED package,
//! temperatures describe the white point of the light a strip should mimic.
//! Both are multiplied together with the brightness when a frame is shown.

use super::{Rgb, rgb_from_u32};

/// Typical values for SMD5050 LEDs
pub const TYPICAL_SMD5050: Rgb = rgb_from_u32(0xFF_B0_F0);
/// Typical values for generic LED strips
pub const TYPICAL_LED_STRIP: Rgb = rgb_from_u32(0xFF_B0_F0);
/// Typical values for 8 mm "pixels on a string"
pub const TYPICAL_8MM_PIXEL: Rgb = rgb_from_u32(0xFF_E0_8C);
/// Typical values for pixel strings
pub const TYPICAL_PIXEL_STRING: Rgb = rgb_from_u32(0xFF_E0_8C);
/// No correction
pub const UNCORRECTED_COLOR: Rgb = rgb_from_u32(0xFF_FF_FF);

/// 1900 Kelvin
pub const CANDLE: Rgb = rgb_from_u32(0xFF_93_29);
/// 2600 Kelvin
pub const TUNGSTEN_40W: Rgb = rgb_from_u32(0xFF_C5_8F);
/// 2850 Kelvin
pub const TUNGSTEN_100W: Rgb = rgb_from_u32(0xFF_D6_AA);
/// 3200 Kelvin
pub const HALOGEN: Rgb = rgb_from_u32(0xFF_F1_E0);
/// 5200 Kelvin
pub const CARBON_ARC: Rgb = rgb_from_u32(0xFF_FA_F4);
/// 5400 Kelvin
pub const HIGH_NOON_SUN: Rgb = rgb_from_u32(0xFF_FF_FB);
/// 6000 Kelvin
pub const DIRECT_SUNLIGHT: Rgb = rgb_from_u32(0xFF_FF_FF);
/// 7000 Kelvin
pub const OVERCAST_SKY: Rgb = rgb_from_u32(0xC9_E2_FF);
/// 20000 Kelvin
pub const CLEAR_BLUE_SKY: Rgb = rgb_from_u32(0x40_9C_FF);
/// No temperature adjustment
pub const UNCORRECTED_TEMPERATURE: Rgb = rgb_from_u32(0xFF_FF_FF);
