#![no_std]

pub mod chipset;
pub mod color;
pub mod controller;
pub mod dither;
pub mod frame_gate;
pub mod math8;
pub mod pixels;
pub mod registry;
pub mod transport;

pub use chipset::{
    Apa102, Apa102Brightness, Clockless, ClocklessChipset, ClocklessConfig, Hd108, Lpd6803,
    Lpd8806, P9813, ParallelClockless, Sm16716, Ws2801,
};
pub use color::{ColorOrder, Rgb, kelvin_to_rgb, presets, rgb_from_u32};
pub use controller::{Controller, Device, LedSettings, PixelWriter, ShowError};
pub use dither::DitherMode;
pub use frame_gate::FrameGate;
pub use pixels::{BrightnessPlane, ExtendedPlanes, PixelController};
pub use registry::{DeviceHandle, Registry};
pub use transport::{
    ClockedTransport, ClocklessTiming, ConfigError, ParallelTimingEngine, PulseEngine, PulseLine,
    TimingEngine,
};

pub use embassy_time::{Duration, Instant};
