//! Device controllers
//!
//! A [`Controller`] is one attached strip: a reference to the caller's pixel
//! buffer, the per-device correction settings and the protocol writer that
//! turns a [`PixelController`] into bytes or pulses on the wire.
//!
//! [`PixelWriter`] is the only seam a protocol adapter implements. The
//! controller computes the combined scale, validates the buffer once and
//! hands the writer a fresh pixel controller for every frame.

use core::fmt;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::color::{BLACK, ColorOrder, Rgb, presets};
use crate::dither::DitherMode;
use crate::pixels::{ExtendedPlanes, PixelController};

/// Error returned when a frame cannot be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowError {
    /// An extended plane does not match the color buffer
    PlaneLength { expected: usize, actual: usize },
    /// The buffer cannot be split evenly into lanes
    LaneLength { leds: usize, lanes: usize },
}

impl fmt::Display for ShowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaneLength { expected, actual } => {
                write!(f, "plane holds {actual} pixels, buffer holds {expected}")
            }
            Self::LaneLength { leds, lanes } => {
                write!(f, "{leds} pixels cannot be split into {lanes} lanes")
            }
        }
    }
}

impl core::error::Error for ShowError {}

/// Correction settings of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedSettings {
    /// Per-channel correction of the LED package
    pub correction: Rgb,
    /// Per-channel white point
    pub temperature: Rgb,
    pub dither: DitherMode,
}

impl Default for LedSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LedSettings {
    /// Uncorrected settings with binary dithering
    pub const fn new() -> Self {
        Self {
            correction: presets::UNCORRECTED_COLOR,
            temperature: presets::UNCORRECTED_TEMPERATURE,
            dither: DitherMode::Binary,
        }
    }

    pub fn set_correction(&mut self, correction: Rgb) -> &mut Self {
        self.correction = correction;
        self
    }

    pub fn set_temperature(&mut self, temperature: Rgb) -> &mut Self {
        self.temperature = temperature;
        self
    }

    pub fn set_dither(&mut self, dither: DitherMode) -> &mut Self {
        self.dither = dither;
        self
    }

    /// Combined per-channel scale for a brightness
    ///
    /// Each channel is `(correction + 1) * (temperature + 1) * brightness / 65536`.
    /// A channel whose correction or temperature is zero stays off at any
    /// brightness.
    #[cfg(not(feature = "no-correction"))]
    pub const fn adjustment(&self, brightness: u8) -> Rgb {
        Rgb {
            r: adjust_channel(self.correction.r, self.temperature.r, brightness),
            g: adjust_channel(self.correction.g, self.temperature.g, brightness),
            b: adjust_channel(self.correction.b, self.temperature.b, brightness),
        }
    }

    /// Flat per-channel scale for a brightness
    #[cfg(feature = "no-correction")]
    pub const fn adjustment(&self, brightness: u8) -> Rgb {
        Rgb {
            r: brightness,
            g: brightness,
            b: brightness,
        }
    }
}

#[cfg(not(feature = "no-correction"))]
#[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
const fn adjust_channel(correction: u8, temperature: u8, brightness: u8) -> u8 {
    if correction == 0 || temperature == 0 || brightness == 0 {
        return 0;
    }
    let work = (correction as u32 + 1) * (temperature as u32 + 1) * brightness as u32;
    let work = work >> 16;
    if work > u8::MAX as u32 {
        u8::MAX
    } else {
        work as u8
    }
}

/// Protocol writer for one device family
///
/// Implementors pull samples from the pixel controller in the order their
/// device expects and push them to a transport.
pub trait PixelWriter<const LANES: usize = 1> {
    /// Chipset name, used in logs
    fn chipset(&self) -> &'static str;

    /// Prepare the transport, called once when the device is registered
    fn init(&mut self) {}

    /// Write a full frame
    fn write_pixels(&mut self, pixels: &mut PixelController<'_, LANES>);
}

/// Object-safe contract of an attached device
pub trait Device<'a> {
    /// Prepare the device, called once on registration
    fn init(&mut self);

    /// Attach a new pixel buffer
    fn set_leds(&mut self, leds: &'a [Rgb]);

    /// Attach a new pixel buffer with extended planes
    fn set_extended_leds(&mut self, leds: &'a [Rgb], planes: ExtendedPlanes<'a>);

    /// Currently attached pixel buffer
    fn leds(&self) -> &'a [Rgb];

    /// Number of pixels per lane
    fn size(&self) -> usize;

    fn settings(&self) -> &LedSettings;

    fn settings_mut(&mut self) -> &mut LedSettings;

    /// Chipset name of the device
    fn chipset(&self) -> &'static str;

    /// Show the buffer at a brightness, applying correction and temperature
    fn show(&mut self, brightness: u8) -> Result<(), ShowError> {
        let scale = self.settings().adjustment(brightness);
        self.show_scaled(scale)
    }

    /// Show the buffer with an explicit per-channel scale
    fn show_scaled(&mut self, scale: Rgb) -> Result<(), ShowError>;

    /// Show one color on every pixel at a brightness
    fn show_color(&mut self, color: Rgb, brightness: u8) {
        let scale = self.settings().adjustment(brightness);
        let count = self.size();
        self.show_color_scaled(color, count, scale);
    }

    /// Show one color on `count` pixels with an explicit scale
    fn show_color_scaled(&mut self, color: Rgb, count: usize, scale: Rgb);

    /// Turn off `count` pixels
    fn clear_leds(&mut self, count: usize) {
        self.show_color_scaled(BLACK, count, BLACK);
    }
}

/// A device: pixel buffer, settings and protocol writer
pub struct Controller<'a, W, const LANES: usize = 1> {
    writer: W,
    order: ColorOrder,
    leds: &'a [Rgb],
    planes: ExtendedPlanes<'a>,
    settings: LedSettings,
}

impl<'a, W: PixelWriter<LANES>, const LANES: usize> Controller<'a, W, LANES> {
    /// Create a controller without pixels
    pub const fn new(writer: W, order: ColorOrder) -> Self {
        Self {
            writer,
            order,
            leds: &[],
            planes: ExtendedPlanes::new(),
            settings: LedSettings::new(),
        }
    }

    #[must_use]
    pub fn with_leds(mut self, leds: &'a [Rgb]) -> Self {
        self.leds = leds;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: LedSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn set_correction(&mut self, correction: Rgb) -> &mut Self {
        self.settings.set_correction(correction);
        self
    }

    pub fn set_temperature(&mut self, temperature: Rgb) -> &mut Self {
        self.settings.set_temperature(temperature);
        self
    }

    pub fn set_dither(&mut self, dither: DitherMode) -> &mut Self {
        self.settings.set_dither(dither);
        self
    }

    pub const fn order(&self) -> ColorOrder {
        self.order
    }

    pub const fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Check buffer and planes once before a frame
    fn validate(&self) -> Result<(), ShowError> {
        let leds = self.leds.len();
        if LANES > 1 && !leds.is_multiple_of(LANES) {
            return Err(ShowError::LaneLength { leds, lanes: LANES });
        }
        match self.planes.mismatch(leds) {
            Some(actual) => Err(ShowError::PlaneLength {
                expected: leds,
                actual,
            }),
            None => Ok(()),
        }
    }
}

impl<'a, W: PixelWriter<LANES>, const LANES: usize> Device<'a> for Controller<'a, W, LANES> {
    fn init(&mut self) {
        self.writer.init();
    }

    fn set_leds(&mut self, leds: &'a [Rgb]) {
        self.leds = leds;
        self.planes = ExtendedPlanes::new();
    }

    fn set_extended_leds(&mut self, leds: &'a [Rgb], planes: ExtendedPlanes<'a>) {
        self.leds = leds;
        self.planes = planes;
    }

    fn leds(&self) -> &'a [Rgb] {
        self.leds
    }

    fn size(&self) -> usize {
        self.leds.len() / LANES.max(1)
    }

    fn settings(&self) -> &LedSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut LedSettings {
        &mut self.settings
    }

    fn chipset(&self) -> &'static str {
        self.writer.chipset()
    }

    fn show_scaled(&mut self, scale: Rgb) -> Result<(), ShowError> {
        if let Err(error) = self.validate() {
            #[cfg(feature = "esp32-log")]
            println!(
                "[Controller.show] {} rejected frame: {}",
                self.writer.chipset(),
                error
            );
            return Err(error);
        }
        let mut pixels =
            PixelController::<LANES>::new(self.leds, self.order, scale, self.settings.dither)
                .with_planes(self.planes);
        self.writer.write_pixels(&mut pixels);
        Ok(())
    }

    fn show_color_scaled(&mut self, color: Rgb, count: usize, scale: Rgb) {
        let mut pixels =
            PixelController::<LANES>::solid(&color, count, self.order, scale, self.settings.dither);
        self.writer.write_pixels(&mut pixels);
    }
}
