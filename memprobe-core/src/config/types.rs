//! Configuration type definitions

use heapless::String;

use crate::memtest::DescendingSweep;

/// Maximum length of a USB string descriptor value
pub const MAX_USB_STRING_LEN: usize = 32;

/// Placement of the memory window in the 16-bit address space
///
/// The window spans `start..=end`. `size()` is `end - start`, which is the
/// value the protocol reports and the length of the ascending pattern sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegionConfig {
    /// First absolute address of the window
    pub start: u16,
    /// Last addressable absolute address of the window
    pub end: u16,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            start: 0x2000,
            end: 0x4000,
        }
    }
}

impl RegionConfig {
    /// Check that the window is non-empty
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Window size in bytes as reported by the `s` and `o` commands
    pub fn size(&self) -> u16 {
        self.end.wrapping_sub(self.start)
    }

    /// Number of addressable cells (`start..=end`)
    pub fn span(&self) -> usize {
        self.size() as usize + 1
    }

    /// Absolute address of a window offset
    ///
    /// Offsets are not bounds checked; they wrap in the 16-bit address space.
    pub fn addr(&self, offset: u16) -> u16 {
        self.start.wrapping_add(offset)
    }

    /// Check whether an absolute address falls inside the window
    pub fn contains(&self, addr: u16) -> bool {
        (self.start..=self.end).contains(&addr)
    }
}

/// Boot-time self-test options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SelfTestConfig {
    /// Run the pattern tests on every bank before USB comes up
    pub run_at_boot: bool,
    /// Index range covered by the descending count test
    pub descending_sweep: DescendingSweep,
}

impl Default for SelfTestConfig {
    fn default() -> Self {
        Self {
            run_at_boot: true,
            descending_sweep: DescendingSweep::Reference,
        }
    }
}

/// USB device identity
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UsbConfig {
    pub vid: u16,
    pub pid: u16,
    pub manufacturer: String<MAX_USB_STRING_LEN>,
    pub product: String<MAX_USB_STRING_LEN>,
    pub serial: String<MAX_USB_STRING_LEN>,
}

impl Default for UsbConfig {
    fn default() -> Self {
        let mut manufacturer = String::new();
        let _ = manufacturer.push_str("memprobe");
        let mut product = String::new();
        let _ = product.push_str("SRAM Tester");
        let mut serial = String::new();
        let _ = serial.push_str("0001");
        Self {
            vid: 0x16c0,
            pid: 0x27dd,
            manufacturer,
            product,
            serial,
        }
    }
}

/// Foreground loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProbeLoopConfig {
    /// How long one cycle waits for an OUT packet before servicing output
    pub poll_interval_ms: u16,
}

impl Default for ProbeLoopConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProbeConfig {
    pub region: RegionConfig,
    pub self_test: SelfTestConfig,
    pub usb: UsbConfig,
    pub probe: ProbeLoopConfig,
}
