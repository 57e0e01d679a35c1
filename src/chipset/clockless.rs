//! Self-clocked chipsets
//!
//! Devices that recover the clock from the data line itself. They only
//! differ in their bit cell timings and reset gap, so one table describes
//! them all and a single writer drives any of them through a
//! [`TimingEngine`].
//!
//! Every writer here steps the dithering before loading a pixel, so pixel
//! `i` is sampled with the offsets after `i + 1` steps.

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::controller::PixelWriter;
use crate::frame_gate::FrameGate;
use crate::pixels::PixelController;
use crate::transport::{
    ClocklessTiming, ConfigError, ParallelTimingEngine, PulseEngine, PulseLine, TimingEngine,
};

/// Reset gap of most self-clocked chipsets
pub const DEFAULT_RESET: Duration = Duration::from_micros(50);

/// Known self-clocked chipsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClocklessChipset {
    Ws2812,
    Ws2811,
    /// WS2811 in its slow 400 kHz mode
    Ws2811Slow,
    Ws2813,
    Sk6812,
    Sk6822,
    Tm1809,
    Tm1803,
    Tm1829,
    Ucs1903,
    Ucs1903b,
    Ucs2903,
    Apa106,
    Pl9823,
    Ge8822,
    Lpd1886,
    Gw6205,
    Sm16703,
}

impl ClocklessChipset {
    pub const ALL: [Self; 18] = [
        Self::Ws2812,
        Self::Ws2811,
        Self::Ws2811Slow,
        Self::Ws2813,
        Self::Sk6812,
        Self::Sk6822,
        Self::Tm1809,
        Self::Tm1803,
        Self::Tm1829,
        Self::Ucs1903,
        Self::Ucs1903b,
        Self::Ucs2903,
        Self::Apa106,
        Self::Pl9823,
        Self::Ge8822,
        Self::Lpd1886,
        Self::Gw6205,
        Self::Sm16703,
    ];

    /// Bit cell phases `(T1, T2, T3)` in nanoseconds
    pub const fn timing_ns(self) -> (u32, u32, u32) {
        match self {
            Self::Ws2812 => (250, 625, 375),
            Self::Ws2811 | Self::Ws2813 => (320, 320, 640),
            Self::Ws2811Slow => (800, 800, 900),
            Self::Sk6812 => (300, 300, 600),
            Self::Sm16703 => (300, 600, 300),
            Self::Sk6822 => (375, 1000, 375),
            Self::Tm1809 => (350, 350, 450),
            Self::Tm1803 => (700, 1100, 700),
            Self::Tm1829 => (340, 340, 550),
            Self::Ucs1903 => (500, 1500, 500),
            Self::Ucs1903b => (400, 450, 450),
            Self::Ucs2903 => (250, 750, 250),
            Self::Apa106 => (400, 800, 400),
            Self::Pl9823 => (350, 1010, 350),
            Self::Ge8822 => (350, 660, 350),
            Self::Lpd1886 => (200, 400, 200),
            Self::Gw6205 => (800, 800, 800),
        }
    }

    /// Idle time the line must be held low to latch a frame
    pub const fn reset(self) -> Duration {
        match self {
            Self::Ws2813 => Duration::from_micros(300),
            Self::Tm1829 => Duration::from_micros(500),
            _ => DEFAULT_RESET,
        }
    }

    /// Zero bits sent after every 8-bit channel value
    ///
    /// Chipsets with 12-bit cells take 8 data bits and 4 padding bits.
    pub const fn extra_bits(self) -> u8 {
        match self {
            Self::Ge8822 | Self::Lpd1886 | Self::Gw6205 => 4,
            _ => 0,
        }
    }

    /// Bits per channel cell on the wire
    pub const fn cell_bits(self) -> u8 {
        8 + self.extra_bits()
    }

    /// Whether the data line idles high and pulses low
    pub const fn inverted(self) -> bool {
        matches!(self, Self::Tm1829)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ws2812 => "WS2812",
            Self::Ws2811 => "WS2811",
            Self::Ws2811Slow => "WS2811_400",
            Self::Ws2813 => "WS2813",
            Self::Sk6812 => "SK6812",
            Self::Sk6822 => "SK6822",
            Self::Tm1809 => "TM1809",
            Self::Tm1803 => "TM1803",
            Self::Tm1829 => "TM1829",
            Self::Ucs1903 => "UCS1903",
            Self::Ucs1903b => "UCS1903B",
            Self::Ucs2903 => "UCS2903",
            Self::Apa106 => "APA106",
            Self::Pl9823 => "PL9823",
            Self::Ge8822 => "GE8822",
            Self::Lpd1886 => "LPD1886",
            Self::Gw6205 => "GW6205",
            Self::Sm16703 => "SM16703",
        }
    }

    /// Bit cell timing for an engine running at `tick_hz`
    pub const fn timing(self, tick_hz: u32) -> Result<ClocklessTiming, ConfigError> {
        let (t1, t2, t3) = self.timing_ns();
        ClocklessTiming::from_ns(t1, t2, t3, tick_hz)
    }

    /// Portable engine for this chipset on top of `line`
    pub fn pulse_engine<L: PulseLine>(
        self,
        line: L,
        tick_hz: u32,
    ) -> Result<PulseEngine<L>, ConfigError> {
        let timing = self.timing(tick_hz)?;
        Ok(PulseEngine::new(line, timing).with_inverted(self.inverted()))
    }
}

/// Configuration of a self-clocked writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClocklessConfig {
    pub chipset: ClocklessChipset,
    /// Send a fourth white channel per pixel
    pub white: bool,
    /// Reset gap, defaults to the chipset's
    pub reset: Duration,
}

impl ClocklessConfig {
    pub const fn new(chipset: ClocklessChipset) -> Self {
        Self {
            chipset,
            white: false,
            reset: chipset.reset(),
        }
    }

    #[must_use]
    pub const fn with_white(mut self) -> Self {
        self.white = true;
        self
    }

    #[must_use]
    pub const fn with_reset(mut self, reset: Duration) -> Self {
        self.reset = reset;
        self
    }
}

/// Split off the white component shared by all three samples
///
/// Returns the samples with the white removed and the white value.
pub fn extract_white([c0, c1, c2]: [u8; 3]) -> ([u8; 3], u8) {
    let white = c0.min(c1).min(c2);
    ([c0 - white, c1 - white, c2 - white], white)
}

/// Writer for a single self-clocked data line
#[derive(Debug)]
pub struct Clockless<E> {
    engine: E,
    config: ClocklessConfig,
    gate: FrameGate,
}

impl<E: TimingEngine> Clockless<E> {
    pub const fn new(engine: E, config: ClocklessConfig) -> Self {
        Self {
            engine,
            gate: FrameGate::new(config.reset),
            config,
        }
    }

    pub const fn config(&self) -> ClocklessConfig {
        self.config
    }

    pub const fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Send pixels with the first sample of each pixel loaded one step ahead
    fn write_rgb(engine: &mut E, bits: u8, pixels: &mut PixelController<'_>) {
        if !pixels.has(1) {
            return;
        }
        pixels.pre_step_first_slot_dithering();
        let mut first = pixels.load_and_scale(0);
        while pixels.has(1) {
            pixels.step_dithering();
            engine.write_bits(first, bits);
            engine.write_bits(pixels.load_and_scale(1), bits);
            engine.write_bits(pixels.load_and_scale(2), bits);
            first = pixels.advance_and_load_and_scale0();
        }
    }

    fn write_rgbw(engine: &mut E, bits: u8, pixels: &mut PixelController<'_>) {
        while pixels.has(1) {
            pixels.step_dithering();
            let (colors, white) = extract_white(pixels.load_and_scale_rgb());
            for value in colors {
                engine.write_bits(value, bits);
            }
            engine.write_bits(white, bits);
            pixels.advance_data();
        }
    }
}

impl<E: TimingEngine> PixelWriter for Clockless<E> {
    fn chipset(&self) -> &'static str {
        self.config.chipset.name()
    }

    fn write_pixels(&mut self, pixels: &mut PixelController<'_>) {
        self.gate.wait();
        let white = self.config.white;
        let bits = self.config.chipset.cell_bits();
        let engine = &mut self.engine;
        critical_section::with(|_| {
            engine.begin_frame();
            if white {
                Self::write_rgbw(engine, bits, pixels);
            } else {
                Self::write_rgb(engine, bits, pixels);
            }
            engine.end_frame();
        });
        self.gate.mark();
    }
}

/// Writer for several self-clocked lines sharing one bit clock
///
/// Lane `i` drives the `i`-th equal part of the pixel buffer. Lanes outside
/// the mask are sent zeros.
#[derive(Debug)]
pub struct ParallelClockless<E, const LANES: usize> {
    engine: E,
    chipset: ClocklessChipset,
    lane_mask: u32,
    gate: FrameGate,
}

impl<E: ParallelTimingEngine<LANES>, const LANES: usize> ParallelClockless<E, LANES> {
    /// Writer with every lane enabled
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(engine: E, chipset: ClocklessChipset) -> Self {
        let lane_mask = if LANES >= 32 {
            u32::MAX
        } else {
            (1u32 << LANES as u32) - 1
        };
        Self {
            engine,
            chipset,
            lane_mask,
            gate: FrameGate::new(chipset.reset()),
        }
    }

    /// Only drive the lanes set in `mask`
    #[must_use]
    pub fn with_lane_mask(mut self, mask: u32) -> Self {
        self.lane_mask = mask;
        self
    }

    pub const fn lane_mask(&self) -> u32 {
        self.lane_mask
    }

    pub const fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    fn lane_enabled(&self, lane: usize) -> bool {
        lane < 32 && self.lane_mask & (1 << lane) != 0
    }
}

impl<E: ParallelTimingEngine<LANES>, const LANES: usize> PixelWriter<LANES>
    for ParallelClockless<E, LANES>
{
    fn chipset(&self) -> &'static str {
        self.chipset.name()
    }

    fn init(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!(
            "[ParallelClockless.init] {} on {} lanes, mask {:#x}",
            self.chipset.name(),
            LANES,
            self.lane_mask
        );
    }

    fn write_pixels(&mut self, pixels: &mut PixelController<'_, LANES>) {
        self.gate.wait();
        let mut enabled = [false; LANES];
        for (lane, on) in enabled.iter_mut().enumerate() {
            *on = self.lane_enabled(lane);
        }
        let bits = self.chipset.cell_bits();
        let engine = &mut self.engine;
        critical_section::with(|_| {
            engine.begin_frame();
            let mut bytes = [0u8; LANES];
            while pixels.has(1) {
                pixels.step_dithering();
                for slot in 0..3 {
                    for (lane, byte) in bytes.iter_mut().enumerate() {
                        *byte = if enabled[lane] {
                            pixels.load_and_scale_lane(lane, slot)
                        } else {
                            0
                        };
                    }
                    engine.write_lane_bytes(&bytes, bits);
                }
                pixels.advance_data();
            }
            engine.end_frame();
        });
        self.gate.mark();
    }
}
