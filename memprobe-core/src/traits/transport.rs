//! Byte transport trait
//!
//! The core only sees the serial link as "bytes become available to read"
//! and "bytes may be pushed out". Enumeration, endpoint setup and line
//! coding stay with the implementation.

/// The link cannot accept another byte right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WouldBlock;

/// Non-blocking byte link to the host
pub trait Transport {
    /// Number of bytes ready to be received
    fn bytes_available(&self) -> usize;

    /// Take one received byte
    ///
    /// Returns `None` when `bytes_available()` is zero.
    fn receive_byte(&mut self) -> Option<u8>;

    /// Queue one byte for transmission
    fn send_byte(&mut self, byte: u8) -> Result<(), WouldBlock>;

    /// Periodic housekeeping, called once per pipeline cycle
    fn service(&mut self) {}
}
