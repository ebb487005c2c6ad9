//! Memory bus traits
//!
//! The tester and the interpreter see memory as a 16-bit address space
//! with one window whose backing bank can be switched.

use crate::bank::Bank;

/// Byte-addressable 16-bit address space
pub trait AddressSpace {
    /// Read the byte at an absolute address
    fn read(&self, addr: u16) -> u8;

    /// Write a byte at an absolute address
    fn write(&mut self, addr: u16, value: u8);
}

/// Selection of the bank mapped into the memory window
pub trait BankSelect {
    /// Map `bank` into the window
    ///
    /// Subsequent reads and writes inside the window observe that bank.
    fn select_bank(&mut self, bank: Bank);
}

/// Address space with a switchable bank window
pub trait MemoryBus: AddressSpace + BankSelect {}

// Blanket implementation
impl<T: AddressSpace + BankSelect> MemoryBus for T {}
