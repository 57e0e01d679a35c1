//! Channel order of a device
//!
//! Pixels are always stored as logical R, G, B. A device expects its three
//! channel bytes in some permutation of that, so each order packs three
//! 2-bit fields, one per output slot, naming the logical channel
//! (0 = red, 1 = green, 2 = blue) that goes into that slot:
//! `slot0 << 4 | slot1 << 2 | slot2`.

const fn pack(slot0: u8, slot1: u8, slot2: u8) -> u8 {
    slot0 << 4 | slot1 << 2 | slot2
}

const ORDER_NAME_RGB: &str = "rgb";
const ORDER_NAME_RBG: &str = "rbg";
const ORDER_NAME_GRB: &str = "grb";
const ORDER_NAME_GBR: &str = "gbr";
const ORDER_NAME_BRG: &str = "brg";
const ORDER_NAME_BGR: &str = "bgr";

/// Permutation of the logical color channels on the wire
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum ColorOrder {
    #[default]
    Rgb = pack(0, 1, 2),
    Rbg = pack(0, 2, 1),
    Grb = pack(1, 0, 2),
    Gbr = pack(1, 2, 0),
    Brg = pack(2, 0, 1),
    Bgr = pack(2, 1, 0),
}

impl ColorOrder {
    /// All six valid orders
    pub const ALL: [Self; 6] = [
        Self::Rgb,
        Self::Rbg,
        Self::Grb,
        Self::Gbr,
        Self::Brg,
        Self::Bgr,
    ];

    /// Packed order code
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Order from a packed code, `None` for codes that are not a permutation
    pub const fn from_code(code: u8) -> Option<Self> {
        let mut i = 0;
        while i < Self::ALL.len() {
            if Self::ALL[i] as u8 == code {
                return Some(Self::ALL[i]);
            }
            i += 1;
        }
        None
    }

    /// Logical channel carried by the given output slot (0..3)
    #[inline]
    pub const fn channel(self, slot: usize) -> usize {
        ((self as u8 >> ((2 - slot) * 2)) & 0b11) as usize
    }

    /// Slot → channel table, decoded once per pixel controller
    pub const fn channels(self) -> [usize; 3] {
        [self.channel(0), self.channel(1), self.channel(2)]
    }

    /// Output slot that carries the given logical channel
    pub const fn slot_of(self, channel: usize) -> usize {
        if self.channel(0) == channel {
            0
        } else if self.channel(1) == channel {
            1
        } else {
            2
        }
    }

    /// Order that undoes this one
    ///
    /// Reordering with `self` and then with `self.inverse()` yields the
    /// original channel layout.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn inverse(self) -> Self {
        let code = pack(
            self.slot_of(0) as u8,
            self.slot_of(1) as u8,
            self.slot_of(2) as u8,
        );
        match Self::from_code(code) {
            Some(order) => order,
            None => Self::Rgb,
        }
    }

    /// Permute three logical channel bytes into output order
    pub const fn reorder(self, channels: [u8; 3]) -> [u8; 3] {
        [
            channels[self.channel(0)],
            channels[self.channel(1)],
            channels[self.channel(2)],
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rgb => ORDER_NAME_RGB,
            Self::Rbg => ORDER_NAME_RBG,
            Self::Grb => ORDER_NAME_GRB,
            Self::Gbr => ORDER_NAME_GBR,
            Self::Brg => ORDER_NAME_BRG,
            Self::Bgr => ORDER_NAME_BGR,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            ORDER_NAME_RGB => Some(Self::Rgb),
            ORDER_NAME_RBG => Some(Self::Rbg),
            ORDER_NAME_GRB => Some(Self::Grb),
            ORDER_NAME_GBR => Some(Self::Gbr),
            ORDER_NAME_BRG => Some(Self::Brg),
            ORDER_NAME_BGR => Some(Self::Bgr),
            _ => None,
        }
    }
}
