//! Bulk packet termination
//!
//! A packet transport delivers a transfer to the host only when it ends with
//! a short packet. Output that fills the last packet exactly must be followed
//! by a zero-length packet, or the host holds it back until more data comes.

/// Tracks whether the last packet sent left a transfer open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketFraming {
    max_packet_size: usize,
    open: bool,
}

impl PacketFraming {
    pub const fn new(max_packet_size: usize) -> Self {
        Self {
            max_packet_size,
            open: false,
        }
    }

    /// Record a sent data packet of `len` bytes
    pub fn sent(&mut self, len: usize) {
        self.open = len == self.max_packet_size;
    }

    /// Whether an idle flush must send a zero-length packet
    ///
    /// Clears the flag; the caller sends the packet.
    pub fn take_terminator(&mut self) -> bool {
        core::mem::take(&mut self.open)
    }

    /// Forget any open transfer, e.g. after a disconnect
    pub fn reset(&mut self) {
        self.open = false;
    }
}
