//! Transports the protocol adapters write through
//!
//! Clock-driven devices take bytes over a data/clock pair through a
//! [`ClockedTransport`]. Self-clocked devices get their bits as timed
//! pulses from a [`TimingEngine`].

mod timing;

pub use timing::{
    BitCell, ClocklessTiming, ConfigError, ParallelTimingEngine, PulseEngine, PulseLine,
    TimingEngine, MAX_TIMING_ERROR_NS,
};

use crate::pixels::PixelController;

/// Bits sent ahead of every pixel by the bulk path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LeadingBits {
    #[default]
    None,
    /// A single `1` bit before the first byte of each pixel
    StartBit,
}

/// Per-byte adjustment applied by the bulk path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ByteAdjust {
    /// Bytes are sent as sampled
    #[default]
    None,
    /// 7-bit data with the top bit forced high, followed by latch bytes
    Lpd8806,
}

impl ByteAdjust {
    /// Adjust one sample before it is sent
    #[inline]
    pub const fn adjust(self, value: u8) -> u8 {
        match self {
            Self::None => value,
            Self::Lpd8806 => {
                let round = (value != 0 && value < 0xFE) as u8;
                ((value >> 1) | 0x80) + round
            }
        }
    }

    /// Bytes to send after all pixels of a frame
    pub fn post_block<T: ClockedTransport + ?Sized>(self, transport: &mut T, pixels: usize) {
        match self {
            Self::None => {}
            Self::Lpd8806 => transport.write_repeated_byte(0, (pixels * 3 + 63) >> 6),
        }
    }
}

/// Byte/bit transport for devices with a clock line
///
/// Every write blocks until the data has been handed to the hardware.
pub trait ClockedTransport {
    /// Prepare the hardware, called once
    fn init(&mut self) {}

    /// Start a transmission
    fn select(&mut self);

    /// End a transmission
    fn release(&mut self);

    /// Block until everything written so far has left the wire
    fn wait_until_idle(&mut self);

    fn write_byte(&mut self, value: u8);

    /// Write a word, most significant byte first
    fn write_word(&mut self, value: u16) {
        let [high, low] = value.to_be_bytes();
        self.write_byte(high);
        self.write_byte(low);
    }

    /// Write a single bit with one clock pulse
    fn write_bit(&mut self, value: bool);

    fn write_repeated_byte(&mut self, value: u8, count: usize) {
        for _ in 0..count {
            self.write_byte(value);
        }
    }

    /// Write every pixel of a frame, three slots per pixel
    ///
    /// The channel order is the one the pixel controller was built with.
    /// Transports with a faster path for whole frames should override this.
    fn write_all_pixels(
        &mut self,
        lead: LeadingBits,
        adjust: ByteAdjust,
        pixels: &mut PixelController<'_>,
    ) {
        let len = pixels.len();
        self.select();
        while pixels.has(1) {
            if lead == LeadingBits::StartBit {
                self.write_bit(true);
            }
            self.write_byte(adjust.adjust(pixels.load_and_scale(0)));
            self.write_byte(adjust.adjust(pixels.load_and_scale(1)));
            self.write_byte(adjust.adjust(pixels.load_and_scale(2)));
            pixels.advance_data();
            pixels.step_dithering();
        }
        adjust.post_block(self, len);
        self.wait_until_idle();
        self.release();
    }
}
