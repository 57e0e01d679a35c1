//! Protocol adapters
//!
//! Every adapter is a [`PixelWriter`](crate::PixelWriter) for one device
//! family. Wrap it in a [`Controller`](crate::Controller) to attach a pixel
//! buffer.

pub mod clocked;
pub mod clockless;

pub use clocked::{
    Apa102, Apa102Brightness, Hd108, Lpd6803, Lpd8806, P9813, Sm16716, Ws2801,
};
pub use clockless::{Clockless, ClocklessChipset, ClocklessConfig, ParallelClockless};
