//! Temporal (binary) dithering
//!
//! Each frame adds a small, frame-dependent offset to every channel before
//! it is scaled down, so that over a cycle of `2^VIRTUAL_BITS` frames the
//! average output keeps the fraction that plain truncation would drop.
//!
//! The frame counter is shared by every pixel controller, so consecutive
//! frames of any device walk through the dither phases. The phase is the
//! bit-reversed counter, which visits the sub-frame phases in a
//! low-discrepancy order (0, 128, 64, 192, ...) instead of sequentially.

use core::cell::Cell;

use critical_section::Mutex;

use crate::math8::scale8;

/// Fastest refresh rate a strip is realistically driven at
pub const MAX_LIKELY_UPDATE_RATE_HZ: u32 = 400;

/// Slowest full dither cycle before flicker becomes visible
pub const MIN_ACCEPTABLE_DITHER_RATE_HZ: u32 = 50;

/// Number of extra bits recovered by dithering
pub const VIRTUAL_BITS: u8 =
    virtual_bits(MAX_LIKELY_UPDATE_RATE_HZ / MIN_ACCEPTABLE_DITHER_RATE_HZ);

/// Frames in a full dither cycle
pub const DITHER_CYCLE: u16 = 1 << VIRTUAL_BITS;

static FRAME_COUNTER: Mutex<Cell<u8>> = Mutex::new(Cell::new(0));

/// Dithering mode of a device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DitherMode {
    /// Plain fixed-point scaling
    Disabled,
    /// Temporal binary dithering
    #[default]
    Binary,
}

/// Count how many powers of two `updates_per_cycle` exceeds, capped at 8
const fn virtual_bits(updates_per_cycle: u32) -> u8 {
    let mut bits = 0;
    while bits < 8 && updates_per_cycle > (1 << bits) {
        bits += 1;
    }
    bits
}

/// Advance the shared frame counter and return its new value
pub fn next_frame() -> u8 {
    critical_section::with(|cs| {
        let counter = FRAME_COUNTER.borrow(cs);
        let frame = counter.get().wrapping_add(1);
        counter.set(frame);
        frame
    })
}

/// Dither phase `Q` of a frame
///
/// The frame counter is masked to `VIRTUAL_BITS` bits and bit-reversed.
#[allow(clippy::cast_possible_truncation)]
pub const fn dither_phase(frame: u8) -> u8 {
    let mask = ((1u16 << VIRTUAL_BITS) - 1) as u8;
    (frame & mask).reverse_bits()
}

/// Per-channel dither offsets of a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DitherState {
    /// Current offset per channel
    offset: [u8; 3],
    /// Offset increment per channel
    step: [u8; 3],
}

impl DitherState {
    /// Dithering with all offsets at zero
    pub const fn disabled() -> Self {
        Self {
            offset: [0; 3],
            step: [0; 3],
        }
    }

    /// Prepare dither offsets for a frame
    ///
    /// `scale` holds the per-channel scale values the offsets are sized for.
    /// The offset is derived from the full increment, the stored step is one
    /// less so that `step - offset` stays inside the same interval.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(frame: u8, scale: [u8; 3]) -> Self {
        let phase = dither_phase(frame);
        let mut offset = [0u8; 3];
        let mut step = [0u8; 3];
        let mut i = 0;
        while i < 3 {
            let s = scale[i];
            if s > 0 {
                let e = 256 / s as u16 + 1;
                step[i] = if e > u8::MAX as u16 { u8::MAX } else { e as u8 };
            }
            let d = scale8(phase, step[i]);
            offset[i] = d.saturating_sub(1);
            step[i] = step[i].saturating_sub(1);
            i += 1;
        }
        Self { offset, step }
    }

    /// Current offset of a channel
    #[inline]
    pub const fn offset(&self, channel: usize) -> u8 {
        self.offset[channel]
    }

    /// Increment of a channel
    #[inline]
    pub const fn step(&self, channel: usize) -> u8 {
        self.step[channel]
    }

    /// Toggle all offsets for the next pixel
    #[inline]
    pub fn step_all(&mut self) {
        for channel in 0..3 {
            self.step_channel(channel);
        }
    }

    /// Toggle the offset of a single channel
    #[inline]
    pub fn step_channel(&mut self, channel: usize) {
        self.offset[channel] = self.step[channel].wrapping_sub(self.offset[channel]);
    }
}
