//! Device registry
//!
//! An append-only list of attached devices in registration order. Devices
//! are never removed or reordered, so a [`DeviceHandle`] stays valid for the
//! lifetime of the registry and traversal always observes registration
//! order.

use heapless::Vec;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::color::Rgb;
use crate::controller::{Device, ShowError};
use crate::dither::DitherMode;
use crate::frame_gate::FrameGate;

/// Identity of a registered device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceHandle(u8);

impl DeviceHandle {
    /// Position of the device in registration order
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Ordered, append-only set of devices
///
/// `N` is the maximum number of devices, at most 256.
pub struct Registry<'r, 'a, const N: usize> {
    devices: Vec<&'r mut dyn Device<'a>, N>,
    brightness: u8,
    gate: FrameGate,
}

impl<'r, 'a, const N: usize> Default for Registry<'r, 'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r, 'a, const N: usize> Registry<'r, 'a, N> {
    /// Create an empty registry at full brightness without a rate limit
    pub const fn new() -> Self {
        Self {
            devices: Vec::new(),
            brightness: u8::MAX,
            gate: FrameGate::from_rate(0),
        }
    }

    /// Append a device and initialize it
    ///
    /// Returns the device if the registry is full.
    #[allow(clippy::cast_possible_truncation)]
    pub fn register(
        &mut self,
        device: &'r mut dyn Device<'a>,
    ) -> Result<DeviceHandle, &'r mut dyn Device<'a>> {
        let index = self.devices.len();
        if self.devices.is_full() || index > usize::from(u8::MAX) {
            return Err(device);
        }
        device.init();
        #[cfg(feature = "esp32-log")]
        println!(
            "[Registry.register] {} with {} pixels as #{}",
            device.chipset(),
            device.size(),
            index
        );
        self.devices.push(device)?;
        Ok(DeviceHandle(index as u8))
    }

    /// Number of registered devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// First registered device
    pub fn head(&self) -> Option<DeviceHandle> {
        (!self.devices.is_empty()).then_some(DeviceHandle(0))
    }

    /// Device registered after `handle`, `None` for the last one
    pub fn next(&self, handle: DeviceHandle) -> Option<DeviceHandle> {
        let next = handle.index() + 1;
        (next < self.devices.len()).then(|| DeviceHandle(handle.0 + 1))
    }

    pub fn get(&self, handle: DeviceHandle) -> Option<&(dyn Device<'a> + 'r)> {
        self.devices.get(handle.index()).map(|device| &**device)
    }

    pub fn get_mut(&mut self, handle: DeviceHandle) -> Option<&mut (dyn Device<'a> + 'r)> {
        self.devices
            .get_mut(handle.index())
            .map(|device| &mut **device)
    }

    /// Iterate devices in registration order
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Device<'a> + 'r)> {
        self.devices.iter().map(|device| &**device)
    }

    /// Iterate devices mutably in registration order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (dyn Device<'a> + 'r)> {
        self.devices.iter_mut().map(|device| &mut **device)
    }

    /// Total pixels across all devices
    pub fn total_size(&self) -> usize {
        self.iter().map(|device| device.size()).sum()
    }

    /// Global brightness used by [`Registry::show`]
    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn set_brightness(&mut self, brightness: u8) -> &mut Self {
        self.brightness = brightness;
        self
    }

    /// Limit how often [`Registry::show`] sends frames, `0` disables the limit
    pub fn set_max_refresh_rate(&mut self, hz: u32) -> &mut Self {
        self.gate = FrameGate::from_rate(hz);
        self
    }

    pub fn set_dither_all(&mut self, dither: DitherMode) -> &mut Self {
        for device in self.iter_mut() {
            device.settings_mut().set_dither(dither);
        }
        self
    }

    pub fn set_correction_all(&mut self, correction: Rgb) -> &mut Self {
        for device in self.iter_mut() {
            device.settings_mut().set_correction(correction);
        }
        self
    }

    pub fn set_temperature_all(&mut self, temperature: Rgb) -> &mut Self {
        for device in self.iter_mut() {
            device.settings_mut().set_temperature(temperature);
        }
        self
    }

    /// Show every device at the global brightness
    ///
    /// Every device is written even if an earlier one fails, the first error
    /// is returned.
    pub fn show(&mut self) -> Result<(), ShowError> {
        self.gate.wait();
        let brightness = self.brightness;
        let mut result = Ok(());
        for device in self.iter_mut() {
            if let Err(error) = device.show(brightness) {
                #[cfg(feature = "esp32-log")]
                println!("[Registry.show] {} failed: {}", device.chipset(), error);
                if result.is_ok() {
                    result = Err(error);
                }
            }
        }
        self.gate.mark();
        result
    }

    /// Show one color on every device at the global brightness
    pub fn show_color(&mut self, color: Rgb) {
        self.gate.wait();
        let brightness = self.brightness;
        for device in self.iter_mut() {
            device.show_color(color, brightness);
        }
        self.gate.mark();
    }

    /// Turn off every pixel of every device
    pub fn clear(&mut self) {
        for device in self.iter_mut() {
            let count = device.size();
            device.clear_leds(count);
        }
    }
}
