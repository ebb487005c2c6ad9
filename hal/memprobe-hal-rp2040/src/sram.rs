//! Banked SRAM window
//!
//! The RP2040 has no parallel memory bus, so the 16-bit address space is
//! backed by on-chip RAM: one 64 KiB image for addresses outside the window
//! and one buffer per bank for addresses inside it. Selecting a bank drives
//! the bank-select output so a logic analyser sees the same switching as on a
//! board with real banked SRAM.

use embedded_hal::digital::{OutputPin, PinState};

use memprobe_core::bank::{Bank, BANK_COUNT};
use memprobe_core::config::RegionConfig;
use memprobe_core::traits::{AddressSpace, BankSelect};

/// Cells available per bank (a 32 KiB window plus its end cell)
pub const BANK_CAPACITY: usize = 0x8001;

/// Number of addresses in the 16-bit address space
const ADDRESS_SPACE: usize = 0x1_0000;

/// Window placement errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SramError {
    /// Window start is not below its end
    EmptyWindow,
    /// Window needs more cells than a bank provides
    WindowTooLarge { span: usize },
}

/// Backing storage, placed in a static by the firmware
pub struct SramStorage {
    common: [u8; ADDRESS_SPACE],
    banks: [[u8; BANK_CAPACITY]; BANK_COUNT],
}

impl SramStorage {
    pub const fn new() -> Self {
        Self {
            common: [0; ADDRESS_SPACE],
            banks: [[0; BANK_CAPACITY]; BANK_COUNT],
        }
    }
}

impl Default for SramStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Window placement that fits the bank storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SramWindow(RegionConfig);

impl SramWindow {
    pub fn new(region: RegionConfig) -> Result<Self, SramError> {
        if !region.is_valid() {
            return Err(SramError::EmptyWindow);
        }
        if region.span() > BANK_CAPACITY {
            return Err(SramError::WindowTooLarge {
                span: region.span(),
            });
        }
        Ok(Self(region))
    }

    pub fn region(&self) -> RegionConfig {
        self.0
    }
}

impl Default for SramWindow {
    fn default() -> Self {
        // 0x2000..=0x4000 spans 0x2001 cells
        Self(RegionConfig::default())
    }
}

/// 16-bit address space with a switchable bank window
pub struct BankedSram<P: OutputPin> {
    region: RegionConfig,
    storage: &'static mut SramStorage,
    bank_pin: P,
    selected: Bank,
}

impl<P: OutputPin> BankedSram<P> {
    /// Create the memory with bank 0 mapped
    pub fn new(window: SramWindow, storage: &'static mut SramStorage, bank_pin: P) -> Self {
        let mut sram = Self {
            region: window.region(),
            storage,
            bank_pin,
            selected: Bank::Zero,
        };
        sram.select_bank(Bank::Zero);
        sram
    }

    pub fn region(&self) -> RegionConfig {
        self.region
    }

    /// Bank currently mapped into the window
    pub fn selected(&self) -> Bank {
        self.selected
    }

    fn window_offset(&self, addr: u16) -> Option<usize> {
        self.region
            .contains(addr)
            .then(|| (addr - self.region.start) as usize)
    }
}

impl<P: OutputPin> AddressSpace for BankedSram<P> {
    fn read(&self, addr: u16) -> u8 {
        match self.window_offset(addr) {
            Some(offset) => self.storage.banks[self.selected.index()][offset],
            None => self.storage.common[addr as usize],
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match self.window_offset(addr) {
            Some(offset) => self.storage.banks[self.selected.index()][offset] = value,
            None => self.storage.common[addr as usize] = value,
        }
    }
}

impl<P: OutputPin> BankSelect for BankedSram<P> {
    fn select_bank(&mut self, bank: Bank) {
        // GPIO outputs on the RP2040 are infallible
        let _ = self.bank_pin.set_state(PinState::from(bank == Bank::One));
        self.selected = bank;
    }
}
