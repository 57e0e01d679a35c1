//! Pixel controller - lazy sample producer over a pixel buffer
//!
//! A [`PixelController`] is built fresh for every frame. Protocol adapters
//! pull channel samples from it in whatever order their device wants,
//! advancing pixel by pixel. Scaling, channel reordering and temporal
//! dithering happen on the fly, so no intermediate frame is ever stored.
//!
//! The sequence is forward-only: once a pixel is advanced past it cannot be
//! read again, a new controller has to be built to walk the buffer again.

use crate::color::{ColorOrder, Rgb, channels_of};
use crate::dither::{self, DitherMode, DitherState};
use crate::math8::{expand8to16, qadd8, scale8, scale16by8};

/// Default 5-bit brightness when no brightness plane is attached
pub const MAX_BRIGHTNESS_5BIT: u8 = 0x1F;

/// Per-pixel 5-bit brightness values
#[derive(Debug, Clone, Copy)]
pub enum BrightnessPlane<'a> {
    /// One value shared by the three channels of a pixel
    Global(&'a [u8]),
    /// One value per channel of a pixel
    PerChannel(&'a [Rgb]),
}

impl BrightnessPlane<'_> {
    /// Number of pixels in the plane
    pub const fn len(&self) -> usize {
        match self {
            Self::Global(plane) => plane.len(),
            Self::PerChannel(plane) => plane.len(),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Optional planes that travel in lock-step with the color buffer
///
/// Used by extended bit-depth devices. Every attached plane must hold as
/// many pixels as the color buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedPlanes<'a> {
    /// 5-bit brightness per pixel or per channel
    pub brightness: Option<BrightnessPlane<'a>>,
    /// Low bytes of 16-bit channel values, high bytes are the color buffer
    pub low: Option<&'a [Rgb]>,
}

impl<'a> ExtendedPlanes<'a> {
    pub const fn new() -> Self {
        Self {
            brightness: None,
            low: None,
        }
    }

    #[must_use]
    pub const fn with_brightness(mut self, plane: BrightnessPlane<'a>) -> Self {
        self.brightness = Some(plane);
        self
    }

    #[must_use]
    pub const fn with_low(mut self, plane: &'a [Rgb]) -> Self {
        self.low = Some(plane);
        self
    }

    /// Find the first plane whose length differs from `pixels`
    ///
    /// Returns the length of the offending plane.
    pub fn mismatch(&self, pixels: usize) -> Option<usize> {
        if let Some(brightness) = self.brightness {
            if brightness.len() != pixels {
                return Some(brightness.len());
            }
        }
        match self.low {
            Some(low) if low.len() != pixels => Some(low.len()),
            _ => None,
        }
    }
}

/// Lazy, forward-only producer of scaled and dithered channel samples
///
/// `LANES` is the number of parallel sub-streams. Lane `i` starts at
/// `i * len` in the shared buffer, every lane holds `len` pixels.
///
/// Sample positions are output *slots*: slot 0 is what the device expects
/// first. The color order maps every slot to a logical channel of the
/// stored pixel.
#[derive(Debug, Clone)]
pub struct PixelController<'a, const LANES: usize = 1> {
    data: &'a [Rgb],
    planes: ExtendedPlanes<'a>,
    /// Pixel index within every lane
    cursor: usize,
    /// 1 for a buffer, 0 for a repeated solid color
    advance: usize,
    /// Pixels per lane
    len: usize,
    remaining: usize,
    lane_offsets: [usize; LANES],
    channels: [usize; 3],
    order: ColorOrder,
    scale: [u8; 3],
    mode: DitherMode,
    dither: DitherState,
}

impl<'a, const LANES: usize> PixelController<'a, LANES> {
    /// Create a controller over a buffer of `LANES * len` pixels
    ///
    /// With dithering enabled this advances the shared dither frame counter.
    pub fn new(leds: &'a [Rgb], order: ColorOrder, scale: Rgb, dither: DitherMode) -> Self {
        let len = leds.len() / LANES;
        let mut lane_offsets = [0; LANES];
        for (lane, offset) in lane_offsets.iter_mut().enumerate() {
            *offset = lane * len;
        }
        Self::build(leds, len, 1, lane_offsets, order, scale, dither)
    }

    /// Create a controller that repeats a single color `count` times on every lane
    pub fn solid(
        color: &'a Rgb,
        count: usize,
        order: ColorOrder,
        scale: Rgb,
        dither: DitherMode,
    ) -> Self {
        Self::build(
            core::slice::from_ref(color),
            count,
            0,
            [0; LANES],
            order,
            scale,
            dither,
        )
    }

    fn build(
        data: &'a [Rgb],
        len: usize,
        advance: usize,
        lane_offsets: [usize; LANES],
        order: ColorOrder,
        scale: Rgb,
        mode: DitherMode,
    ) -> Self {
        const { assert!(LANES > 0, "a pixel controller needs at least one lane") };
        let scale = channels_of(scale);
        let dither = match mode {
            DitherMode::Binary => DitherState::new(dither::next_frame(), scale),
            DitherMode::Disabled => DitherState::disabled(),
        };
        Self {
            data,
            planes: ExtendedPlanes::new(),
            cursor: 0,
            advance,
            len,
            remaining: len,
            lane_offsets,
            channels: order.channels(),
            order,
            scale,
            mode,
            dither,
        }
    }

    /// Attach extended planes
    ///
    /// Plane lengths are the caller's responsibility, see
    /// [`ExtendedPlanes::mismatch`].
    #[must_use]
    pub const fn with_planes(mut self, planes: ExtendedPlanes<'a>) -> Self {
        self.planes = planes;
        self
    }

    /// Re-seed dithering from an explicit frame counter value
    ///
    /// Does not touch the shared counter. Has no effect when dithering is
    /// disabled for this controller.
    #[must_use]
    pub fn with_dither_frame(mut self, frame: u8) -> Self {
        if self.mode == DitherMode::Binary {
            self.dither = DitherState::new(frame, self.scale);
        }
        self
    }

    /// Check that at least `n` pixels remain
    #[inline]
    pub const fn has(&self, n: usize) -> bool {
        self.remaining >= n
    }

    /// Pixels per lane
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pixels not yet advanced past
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Number of lanes
    #[inline]
    pub const fn lanes(&self) -> usize {
        LANES
    }

    /// Channel order the samples are produced in
    #[inline]
    pub const fn order(&self) -> ColorOrder {
        self.order
    }

    /// Static scale of a slot, without dithering
    #[inline]
    pub const fn scale(&self, slot: usize) -> u8 {
        self.scale[self.channels[slot]]
    }

    #[inline]
    fn index(&self, lane: usize) -> usize {
        self.lane_offsets[lane] + self.cursor
    }

    #[inline]
    fn pixel(&self, lane: usize) -> Rgb {
        self.data[self.index(lane)]
    }

    /// Raw, unscaled byte of a slot
    #[inline]
    pub fn load_byte(&self, slot: usize) -> u8 {
        self.load_byte_lane(0, slot)
    }

    /// Raw, unscaled byte of a slot on a lane
    #[inline]
    pub fn load_byte_lane(&self, lane: usize, slot: usize) -> u8 {
        channels_of(self.pixel(lane))[self.channels[slot]]
    }

    /// Dithered and scaled sample of a slot
    #[inline]
    pub fn load_and_scale(&self, slot: usize) -> u8 {
        self.load_and_scale_lane(0, slot)
    }

    /// Dithered and scaled sample of a slot on a lane
    ///
    /// A zero byte is never dithered, black stays black.
    #[inline]
    pub fn load_and_scale_lane(&self, lane: usize, slot: usize) -> u8 {
        let channel = self.channels[slot];
        let raw = channels_of(self.pixel(lane))[channel];
        if raw == 0 {
            return 0;
        }
        scale8(qadd8(raw, self.dither.offset(channel)), self.scale[channel])
    }

    /// Dithered and scaled samples of all three slots, in output order
    #[inline]
    pub fn load_and_scale_rgb(&self) -> [u8; 3] {
        [
            self.load_and_scale(0),
            self.load_and_scale(1),
            self.load_and_scale(2),
        ]
    }

    /// Move to the next pixel
    ///
    /// Attached planes follow the color buffer in lock-step.
    #[inline]
    pub fn advance_data(&mut self) {
        self.cursor += self.advance;
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// Advance the dither offsets for the next pixel
    #[inline]
    pub fn step_dithering(&mut self) {
        self.dither.step_all();
    }

    /// Advance only slot 0's dither offset
    ///
    /// For adapters that load a pixel's first sample before stepping the
    /// dithering of the previous one.
    #[inline]
    pub fn pre_step_first_slot_dithering(&mut self) {
        self.dither.step_channel(self.channels[0]);
    }

    /// Advance to the next pixel and load its slot 0 sample
    ///
    /// Returns 0 once the buffer is exhausted.
    #[inline]
    pub fn advance_and_load_and_scale0(&mut self) -> u8 {
        self.advance_data();
        if self.has(1) {
            self.load_and_scale(0)
        } else {
            0
        }
    }

    /// 5-bit brightness of a slot from the brightness plane
    ///
    /// Full brightness when no plane is attached.
    #[inline]
    pub fn load_brightness(&self, slot: usize) -> u8 {
        let index = self.index(0);
        let value = match self.planes.brightness {
            Some(BrightnessPlane::Global(plane)) => plane[index],
            Some(BrightnessPlane::PerChannel(plane)) => {
                channels_of(plane[index])[self.channels[slot]]
            }
            None => MAX_BRIGHTNESS_5BIT,
        };
        value & MAX_BRIGHTNESS_5BIT
    }

    /// Scaled 16-bit sample of a slot
    ///
    /// The color buffer holds the high byte and the low plane the low byte.
    /// Without a low plane the high byte is expanded to the full 16-bit range.
    /// No dithering is applied at this depth.
    #[inline]
    pub fn load_and_scale16(&self, slot: usize) -> u16 {
        let channel = self.channels[slot];
        let index = self.index(0);
        let high = channels_of(self.data[index])[channel];
        let value = match self.planes.low {
            Some(low) => u16::from(high) << 8 | u16::from(channels_of(low[index])[channel]),
            None => expand8to16(high),
        };
        scale16by8(value, self.scale[channel])
    }
}
