mod kelvin;
mod order;
pub mod presets;

use smart_leds::RGB8;

pub use kelvin::kelvin_to_rgb;
pub use order::ColorOrder;

pub type Rgb = RGB8;

/// Black, used to clear a strip
pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Create an RGB color from a u32 value (0xRRGGBB format)
#[allow(clippy::cast_possible_truncation)]
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: (color >> 16) as u8,
        g: (color >> 8) as u8,
        b: color as u8,
    }
}

/// Read a color as three channel bytes in logical R, G, B order
#[inline]
pub const fn channels_of(color: Rgb) -> [u8; 3] {
    [color.r, color.g, color.b]
}
