//! Self-clocked bit timing
//!
//! A bit cell is described by three durations:
//!
//! ```text
//!  ___________________
//! |   T1    |   T2    |   T3    |
//! |_________|.........|_________|
//!   always    high for  always
//!   high      a one     low
//! ```
//!
//! The line is asserted at the start of the cell, released after `T1` for a
//! zero or after `T1 + T2` for a one, and the cell ends at `T1 + T2 + T3`.
//! On an inverted line the two levels swap.

use core::fmt;

/// Largest rounding error accepted when converting a duration to ticks
///
/// Datasheets of common self-clocked chipsets allow ±150 ns per edge.
pub const MAX_TIMING_ERROR_NS: u32 = 150;

/// Error returned when a timing cannot be produced by an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The engine tick rate is zero
    ZeroTickRate,
    /// A bit cell phase has zero length
    ZeroPhase,
    /// The engine tick is too coarse for the requested duration
    TooCoarse { ns: u32, error_ns: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroTickRate => write!(f, "engine tick rate is zero"),
            Self::ZeroPhase => write!(f, "bit cell phase has zero length"),
            Self::TooCoarse { ns, error_ns } => {
                write!(f, "{ns} ns cannot be produced within {error_ns} ns")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

/// Bit cell durations in engine ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClocklessTiming {
    t1: u32,
    t2: u32,
    t3: u32,
}

impl ClocklessTiming {
    pub const fn from_ticks(t1: u32, t2: u32, t3: u32) -> Self {
        Self { t1, t2, t3 }
    }

    /// Convert datasheet durations to ticks of an engine running at `tick_hz`
    ///
    /// Durations are rounded up to whole ticks. Rejects configurations the
    /// engine cannot produce within [`MAX_TIMING_ERROR_NS`].
    pub const fn from_ns(t1: u32, t2: u32, t3: u32, tick_hz: u32) -> Result<Self, ConfigError> {
        if tick_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if t1 == 0 || t2 == 0 || t3 == 0 {
            return Err(ConfigError::ZeroPhase);
        }
        let t1 = match ns_to_ticks(t1, tick_hz) {
            Ok(ticks) => ticks,
            Err(error) => return Err(error),
        };
        let t2 = match ns_to_ticks(t2, tick_hz) {
            Ok(ticks) => ticks,
            Err(error) => return Err(error),
        };
        let t3 = match ns_to_ticks(t3, tick_hz) {
            Ok(ticks) => ticks,
            Err(error) => return Err(error),
        };
        Ok(Self { t1, t2, t3 })
    }

    /// Unconditional high time
    pub const fn t1(&self) -> u32 {
        self.t1
    }

    /// Extra high time of a one
    pub const fn t2(&self) -> u32 {
        self.t2
    }

    /// Trailing low time
    pub const fn t3(&self) -> u32 {
        self.t3
    }

    /// Length of a whole bit cell
    pub const fn period(&self) -> u32 {
        self.t1 + self.t2 + self.t3
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn ns_to_ticks(ns: u32, tick_hz: u32) -> Result<u32, ConfigError> {
    const NS_PER_SECOND: u64 = 1_000_000_000;
    let ticks = (ns as u64 * tick_hz as u64).div_ceil(NS_PER_SECOND);
    let actual_ns = ticks * NS_PER_SECOND / tick_hz as u64;
    let error_ns = actual_ns - ns as u64;
    if error_ns > MAX_TIMING_ERROR_NS as u64 {
        return Err(ConfigError::TooCoarse {
            ns,
            error_ns: error_ns as u32,
        });
    }
    Ok(ticks as u32)
}

/// Output pins driven by a [`PulseEngine`]
///
/// The only platform-specific part of self-clocked output. Lanes are a bit
/// mask, a single-pin port uses bit 0.
pub trait PulseLine {
    /// Drive the given lanes high
    fn assert(&mut self, lanes: u32);

    /// Drive the given lanes low
    fn deassert(&mut self, lanes: u32);

    /// Busy-wait for a number of engine ticks
    fn delay_ticks(&mut self, ticks: u32);
}

/// Self-clocked output of a single data line
pub trait TimingEngine {
    /// Prepare the line for a frame
    fn begin_frame(&mut self);

    /// Send `value` MSB first as a cell of `bits` bits
    ///
    /// Cells wider than 8 bits are padded with trailing zero bits, cells
    /// narrower than 8 bits send only the most significant bits.
    fn write_bits(&mut self, value: u8, bits: u8);

    /// Release the line after a frame
    fn end_frame(&mut self);
}

/// Self-clocked output of several lanes sharing one bit clock
pub trait ParallelTimingEngine<const LANES: usize> {
    fn begin_frame(&mut self);

    /// Send one byte per lane, all lanes bit by bit in lock-step, MSB first
    ///
    /// `bits` follows [`TimingEngine::write_bits`].
    fn write_lane_bytes(&mut self, bytes: &[u8; LANES], bits: u8);

    fn end_frame(&mut self);
}

/// Phase of the bit cell state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BitCell {
    #[default]
    Idle,
    /// Line high, `T1` running
    Asserted,
    /// Line low before the cell ended
    DeassertedMidBit,
    /// `T3` elapsed, the next cell may start
    BitComplete,
}

/// Portable bit cell engine on top of a [`PulseLine`]
#[derive(Debug)]
pub struct PulseEngine<L> {
    line: L,
    timing: ClocklessTiming,
    lanes: u32,
    inverted: bool,
    phase: BitCell,
}

impl<L: PulseLine> PulseEngine<L> {
    /// Engine driving lane 0 only
    pub const fn new(line: L, timing: ClocklessTiming) -> Self {
        Self {
            line,
            timing,
            lanes: 1,
            inverted: false,
            phase: BitCell::Idle,
        }
    }

    /// Drive several lanes, one bit of `lanes` per lane
    #[must_use]
    pub fn with_lanes(mut self, lanes: u32) -> Self {
        self.lanes = lanes;
        self
    }

    /// Drive an inverted line, idle high and low during the pulse
    #[must_use]
    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    pub const fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub const fn timing(&self) -> ClocklessTiming {
        self.timing
    }

    pub const fn phase(&self) -> BitCell {
        self.phase
    }

    pub const fn line(&self) -> &L {
        &self.line
    }

    pub fn into_line(self) -> L {
        self.line
    }

    /// Start the pulse on `lanes`
    fn raise(&mut self, lanes: u32) {
        if self.inverted {
            self.line.deassert(lanes);
        } else {
            self.line.assert(lanes);
        }
    }

    /// End the pulse on `lanes`
    fn lower(&mut self, lanes: u32) {
        if self.inverted {
            self.line.assert(lanes);
        } else {
            self.line.deassert(lanes);
        }
    }

    /// Put every lane in its idle level and return to idle
    pub fn release(&mut self) {
        self.lower(self.lanes);
        self.phase = BitCell::Idle;
    }

    /// Run one bit cell, lanes in `ones` carry a one, the rest a zero
    pub fn write_cell(&mut self, ones: u32) {
        let ones = ones & self.lanes;
        let zeros = self.lanes & !ones;

        self.raise(self.lanes);
        self.phase = BitCell::Asserted;
        self.line.delay_ticks(self.timing.t1);

        if zeros != 0 {
            self.lower(zeros);
            self.phase = BitCell::DeassertedMidBit;
        }
        self.line.delay_ticks(self.timing.t2);

        if ones != 0 {
            self.lower(ones);
        }
        self.phase = BitCell::DeassertedMidBit;
        self.line.delay_ticks(self.timing.t3);

        self.phase = BitCell::BitComplete;
    }
}

impl<L: PulseLine> TimingEngine for PulseEngine<L> {
    fn begin_frame(&mut self) {
        self.release();
    }

    fn write_bits(&mut self, value: u8, bits: u8) {
        for bit in 0..bits {
            let ones = if bit < 8 && value & (0x80 >> bit) != 0 {
                self.lanes
            } else {
                0
            };
            self.write_cell(ones);
        }
    }

    fn end_frame(&mut self) {
        self.release();
    }
}

impl<L: PulseLine, const LANES: usize> ParallelTimingEngine<LANES> for PulseEngine<L> {
    fn begin_frame(&mut self) {
        self.release();
    }

    fn write_lane_bytes(&mut self, bytes: &[u8; LANES], bits: u8) {
        for bit in 0..bits {
            let mut ones = 0u32;
            if bit < 8 {
                let mask = 0x80u8 >> bit;
                for (lane, byte) in bytes.iter().enumerate() {
                    if byte & mask != 0 {
                        ones |= 1 << lane;
                    }
                }
            }
            self.write_cell(ones);
        }
    }

    fn end_frame(&mut self) {
        self.release();
    }
}
