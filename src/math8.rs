/// Scale an 8-bit value by a factor (0-255 = 0.0-1.0)
///
/// Uses integer math for efficiency on embedded systems.
#[inline]
#[allow(clippy::cast_lossless)]
pub const fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * (1 + scale as u16)) >> 8) as u8
}

/// Add two 8-bit values, saturating at 255
#[inline]
pub const fn qadd8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

/// Scale a 16-bit value by an 8-bit factor (0-255 = 0.0-1.0)
#[inline]
#[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
pub const fn scale16by8(value: u16, scale: u8) -> u16 {
    ((value as u32 * (1 + scale as u32)) >> 8) as u16
}

/// Expand an 8-bit value to 16 bits so that 0xFF maps to 0xFFFF
#[inline]
#[allow(clippy::cast_lossless)]
pub const fn expand8to16(value: u8) -> u16 {
    (value as u16) << 8 | value as u16
}
