//! Clock-driven chipsets
//!
//! Devices with a separate clock line. Each writer frames the pixels with
//! its start and end markers and packs every pixel the way its chipset
//! expects, then hands the bytes to a [`ClockedTransport`].

use embassy_time::Duration;

use crate::controller::PixelWriter;
use crate::frame_gate::FrameGate;
use crate::math8::scale8;
use crate::pixels::{MAX_BRIGHTNESS_5BIT, PixelController};
use crate::transport::{ByteAdjust, ClockedTransport, LeadingBits};

/// Pixels covered by one unit of end frame
///
/// The latch travels down the chain one pixel per half clock, so every 32
/// pixels need another 32 clocks.
pub const PIXELS_PER_END_UNIT: usize = 32;

/// Zero words ahead of an HD108 frame
pub const HD108_START_WORDS: usize = 8;

/// Pixels covered by one 8-byte unit of HD108 end frame
pub const HD108_PIXELS_PER_END_UNIT: usize = 48;

/// Minimum gap between WS2801 frames
pub const WS2801_LATCH: Duration = Duration::from_micros(1000);

/// Units of end frame needed to latch `pixels` pixels
pub const fn end_frame_units(pixels: usize) -> usize {
    pixels / PIXELS_PER_END_UNIT + 1
}

fn write_end_frame<T: ClockedTransport>(transport: &mut T, pixels: usize, unit: [u8; 4]) {
    for _ in 0..end_frame_units(pixels) {
        for byte in unit {
            transport.write_byte(byte);
        }
    }
}

/// Source of the 5-bit brightness field of APA102-style pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apa102Brightness {
    /// The same value for every pixel, color dithered at full resolution
    Fixed(u8),
    /// Derived from the frame scale, color keeps its resolution at low
    /// brightness
    Global,
    /// Taken from the brightness plane of every pixel
    PerPixel,
}

/// APA102 and SK9822 writer
///
/// Frame: 32 zero bits, then per pixel a `0b111` marker with a 5-bit
/// brightness followed by three color bytes, then the end frame.
#[derive(Debug)]
pub struct Apa102<T> {
    transport: T,
    brightness: Apa102Brightness,
    end_unit: [u8; 4],
    name: &'static str,
}

impl<T: ClockedTransport> Apa102<T> {
    /// APA102 at full fixed brightness
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            brightness: Apa102Brightness::Fixed(MAX_BRIGHTNESS_5BIT),
            end_unit: [0xFF, 0x00, 0x00, 0x00],
            name: "APA102",
        }
    }

    /// SK9822, APA102 framing with an all-zero end frame
    pub const fn sk9822(transport: T) -> Self {
        Self {
            transport,
            brightness: Apa102Brightness::Fixed(MAX_BRIGHTNESS_5BIT),
            end_unit: [0x00; 4],
            name: "SK9822",
        }
    }

    #[must_use]
    pub fn with_brightness(mut self, brightness: Apa102Brightness) -> Self {
        self.brightness = brightness;
        self
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    fn write_led(&mut self, brightness: u8, c0: u8, c1: u8, c2: u8) {
        self.transport
            .write_byte(0xE0 | (brightness & MAX_BRIGHTNESS_5BIT));
        self.transport.write_byte(c0);
        self.transport.write_byte(c1);
        self.transport.write_byte(c2);
    }

    fn write_fixed(&mut self, brightness: u8, pixels: &mut PixelController<'_>) {
        while pixels.has(1) {
            let [c0, c1, c2] = pixels.load_and_scale_rgb();
            self.write_led(brightness, c0, c1, c2);
            pixels.step_dithering();
            pixels.advance_data();
        }
    }

    fn write_per_pixel(&mut self, pixels: &mut PixelController<'_>) {
        while pixels.has(1) {
            let [c0, c1, c2] = pixels.load_and_scale_rgb();
            self.write_led(pixels.load_brightness(0), c0, c1, c2);
            pixels.step_dithering();
            pixels.advance_data();
        }
    }

    /// Move the frame scale into the brightness field
    #[allow(clippy::cast_possible_truncation)]
    fn write_global(&mut self, pixels: &mut PixelController<'_>) {
        let max_brightness = u16::from(MAX_BRIGHTNESS_5BIT);
        let scale = [pixels.scale(0), pixels.scale(1), pixels.scale(2)];
        let peak = u16::from(scale[0].max(scale[1]).max(scale[2]));
        let brightness = (((peak + 1) * max_brightness - 1) >> 8) + 1;
        let rescale = scale.map(|s| {
            let s = (max_brightness * u16::from(s) + (brightness >> 1)) / brightness;
            s.min(u16::from(u8::MAX)) as u8
        });

        while pixels.has(1) {
            let c0 = scale8(pixels.load_byte(0), rescale[0]);
            let c1 = scale8(pixels.load_byte(1), rescale[1]);
            let c2 = scale8(pixels.load_byte(2), rescale[2]);
            self.write_led(brightness as u8, c0, c1, c2);
            pixels.step_dithering();
            pixels.advance_data();
        }
    }
}

impl<T: ClockedTransport> PixelWriter for Apa102<T> {
    fn chipset(&self) -> &'static str {
        self.name
    }

    fn init(&mut self) {
        self.transport.init();
    }

    fn write_pixels(&mut self, pixels: &mut PixelController<'_>) {
        let len = pixels.len();
        self.transport.select();
        self.transport.write_word(0);
        self.transport.write_word(0);

        match self.brightness {
            Apa102Brightness::Fixed(brightness) => self.write_fixed(brightness, pixels),
            Apa102Brightness::Global => self.write_global(pixels),
            Apa102Brightness::PerPixel => self.write_per_pixel(pixels),
        }

        write_end_frame(&mut self.transport, len, self.end_unit);
        self.transport.wait_until_idle();
        self.transport.release();
    }
}

/// P9813 writer
///
/// Every pixel starts with a flag byte carrying `0b11` and the inverted top
/// two bits of each channel, followed by the channels in blue, green, red
/// order. Build the controller with [`ColorOrder::Rgb`](crate::ColorOrder::Rgb)
/// so that slots 0, 1, 2 are red, green, blue.
#[derive(Debug)]
pub struct P9813<T> {
    transport: T,
}

impl<T: ClockedTransport> P9813<T> {
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    fn write_boundary(&mut self) {
        self.transport.write_word(0);
        self.transport.write_word(0);
    }
}

/// Flag byte of a P9813 pixel
pub const fn p9813_flag(r: u8, g: u8, b: u8) -> u8 {
    0xC0 | ((!b & 0xC0) >> 2) | ((!g & 0xC0) >> 4) | ((!r & 0xC0) >> 6)
}

impl<T: ClockedTransport> PixelWriter for P9813<T> {
    fn chipset(&self) -> &'static str {
        "P9813"
    }

    fn init(&mut self) {
        self.transport.init();
    }

    fn write_pixels(&mut self, pixels: &mut PixelController<'_>) {
        self.transport.select();
        self.write_boundary();
        while pixels.has(1) {
            let [r, g, b] = pixels.load_and_scale_rgb();
            self.transport.write_byte(p9813_flag(r, g, b));
            self.transport.write_byte(b);
            self.transport.write_byte(g);
            self.transport.write_byte(r);
            pixels.advance_data();
            pixels.step_dithering();
        }
        self.write_boundary();
        self.transport.wait_until_idle();
        self.transport.release();
    }
}

/// LPD8806 writer
///
/// 7 bits per channel with the top bit forced high, latched by trailing
/// zero bytes.
#[derive(Debug)]
pub struct Lpd8806<T> {
    transport: T,
}

impl<T: ClockedTransport> Lpd8806<T> {
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: ClockedTransport> PixelWriter for Lpd8806<T> {
    fn chipset(&self) -> &'static str {
        "LPD8806"
    }

    fn init(&mut self) {
        self.transport.init();
    }

    fn write_pixels(&mut self, pixels: &mut PixelController<'_>) {
        self.transport
            .write_all_pixels(LeadingBits::None, ByteAdjust::Lpd8806, pixels);
    }
}

/// LPD6803 writer
///
/// Four zero bytes, then one 16-bit word per pixel: a start bit and three
/// 5-bit channels. No end frame is sent.
#[derive(Debug)]
pub struct Lpd6803<T> {
    transport: T,
}

impl<T: ClockedTransport> Lpd6803<T> {
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

/// Pixel word of an LPD6803
#[allow(clippy::cast_lossless)]
pub const fn lpd6803_word(c0: u8, c1: u8, c2: u8) -> u16 {
    0x8000 | ((c0 as u16 & 0xF8) << 7) | ((c1 as u16 & 0xF8) << 2) | (c2 as u16 >> 3)
}

impl<T: ClockedTransport> PixelWriter for Lpd6803<T> {
    fn chipset(&self) -> &'static str {
        "LPD6803"
    }

    fn init(&mut self) {
        self.transport.init();
    }

    fn write_pixels(&mut self, pixels: &mut PixelController<'_>) {
        self.transport.select();
        self.transport.write_repeated_byte(0, 4);
        while pixels.has(1) {
            let [c0, c1, c2] = pixels.load_and_scale_rgb();
            self.transport.write_word(lpd6803_word(c0, c1, c2));
            pixels.step_dithering();
            pixels.advance_data();
        }
        self.transport.wait_until_idle();
        self.transport.release();
    }
}

/// WS2801 writer
///
/// Plain three bytes per pixel. The chip latches after the clock has been
/// idle for a while, so frames are kept [`WS2801_LATCH`] apart.
#[derive(Debug)]
pub struct Ws2801<T> {
    transport: T,
    gate: FrameGate,
}

impl<T: ClockedTransport> Ws2801<T> {
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            gate: FrameGate::new(WS2801_LATCH),
        }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: ClockedTransport> PixelWriter for Ws2801<T> {
    fn chipset(&self) -> &'static str {
        "WS2801"
    }

    fn init(&mut self) {
        self.transport.init();
        self.gate.mark();
    }

    fn write_pixels(&mut self, pixels: &mut PixelController<'_>) {
        self.gate.wait();
        self.transport
            .write_all_pixels(LeadingBits::None, ByteAdjust::None, pixels);
        self.gate.mark();
    }
}

/// HD108 writer, 16 bits per channel with a 5-bit brightness per channel
///
/// Frame: 8 zero words, then per pixel a header word (start bit and three
/// 5-bit brightness fields) followed by three 16-bit channel words, then
/// one unit of 8 zero bytes per 48 pixels plus one. Colors come from
/// [`PixelController::load_and_scale16`] and brightness from the
/// brightness plane, so both extended planes are honored when attached.
#[derive(Debug)]
pub struct Hd108<T> {
    transport: T,
}

impl<T: ClockedTransport> Hd108<T> {
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

/// Header word of an HD108 pixel
#[allow(clippy::cast_lossless)]
pub const fn hd108_header(b0: u8, b1: u8, b2: u8) -> u16 {
    0x8000
        | ((b0 & MAX_BRIGHTNESS_5BIT) as u16) << 10
        | ((b1 & MAX_BRIGHTNESS_5BIT) as u16) << 5
        | (b2 & MAX_BRIGHTNESS_5BIT) as u16
}

impl<T: ClockedTransport> PixelWriter for Hd108<T> {
    fn chipset(&self) -> &'static str {
        "HD108"
    }

    fn init(&mut self) {
        self.transport.init();
    }

    fn write_pixels(&mut self, pixels: &mut PixelController<'_>) {
        let len = pixels.len();
        self.transport.select();
        for _ in 0..HD108_START_WORDS {
            self.transport.write_word(0);
        }
        while pixels.has(1) {
            let header = hd108_header(
                pixels.load_brightness(0),
                pixels.load_brightness(1),
                pixels.load_brightness(2),
            );
            self.transport.write_word(header);
            for slot in 0..3 {
                self.transport.write_word(pixels.load_and_scale16(slot));
            }
            pixels.advance_data();
        }
        let units = len / HD108_PIXELS_PER_END_UNIT + 1;
        self.transport.write_repeated_byte(0, units * 8);
        self.transport.wait_until_idle();
        self.transport.release();
    }
}

/// SM16716 writer
///
/// Every pixel is a `1` start bit followed by three bytes. The frame ends
/// with a 50-bit zero header that latches the data.
#[derive(Debug)]
pub struct Sm16716<T> {
    transport: T,
}

impl<T: ClockedTransport> Sm16716<T> {
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    fn write_header(&mut self) {
        self.transport.select();
        for _ in 0..2 {
            self.transport.write_bit(false);
            self.transport.write_repeated_byte(0, 3);
        }
        self.transport.wait_until_idle();
        self.transport.release();
    }
}

impl<T: ClockedTransport> PixelWriter for Sm16716<T> {
    fn chipset(&self) -> &'static str {
        "SM16716"
    }

    fn init(&mut self) {
        self.transport.init();
    }

    fn write_pixels(&mut self, pixels: &mut PixelController<'_>) {
        self.transport
            .write_all_pixels(LeadingBits::StartBit, ByteAdjust::None, pixels);
        self.write_header();
    }
}
