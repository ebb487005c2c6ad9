//! USB CDC-ACM serial link
//!
//! Bridges the async CDC-ACM class to the non-blocking `Transport` the
//! pipeline expects. Received packets are staged in a small ring, and
//! outgoing bytes are collected into one packet that the owning task
//! flushes after every pipeline cycle.

use embassy_time::{with_timeout, Duration, Timer};
use embassy_usb::class::cdc_acm::CdcAcmClass;
use embassy_usb::driver::{Driver, EndpointError};
use heapless::{Deque, Vec};

use memprobe_core::traits::{Transport, WouldBlock};
use memprobe_core::PacketFraming;

/// Full-speed bulk packet size
pub const MAX_PACKET_SIZE: usize = 64;

/// Received bytes held until the pipeline takes them
const RX_STAGING: usize = 2 * MAX_PACKET_SIZE;

/// Link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Host went away or the device was unconfigured
    Disconnected,
    /// Host sent a packet larger than the staging buffer
    Overflow,
}

impl From<EndpointError> for LinkError {
    fn from(e: EndpointError) -> Self {
        match e {
            EndpointError::Disabled => LinkError::Disconnected,
            EndpointError::BufferOverflow => LinkError::Overflow,
        }
    }
}

/// Virtual serial port to the host
pub struct UsbSerialLink<'d, D: Driver<'d>> {
    class: CdcAcmClass<'d, D>,
    rx: Deque<u8, RX_STAGING>,
    tx: Vec<u8, MAX_PACKET_SIZE>,
    framing: PacketFraming,
    /// Last observed DTR state
    dtr: bool,
    /// DTR dropped since the last `take_hangup`
    hangup: bool,
}

impl<'d, D: Driver<'d>> UsbSerialLink<'d, D> {
    pub fn new(class: CdcAcmClass<'d, D>) -> Self {
        Self {
            class,
            rx: Deque::new(),
            tx: Vec::new(),
            framing: PacketFraming::new(MAX_PACKET_SIZE),
            dtr: false,
            hangup: false,
        }
    }

    /// Wait until the host opens the port
    ///
    /// Anything staged from an earlier connection is discarded.
    pub async fn wait_connection(&mut self) {
        self.class.wait_connection().await;
        self.discard();
        self.dtr = self.class.dtr();
        self.hangup = false;
    }

    /// Receive at most one packet, waiting no longer than `timeout`
    ///
    /// Returns the number of bytes staged. When the staging ring cannot hold
    /// a whole packet nothing is read and the call just waits out `timeout`.
    pub async fn poll_rx(&mut self, timeout: Duration) -> Result<usize, LinkError> {
        if self.rx.capacity() - self.rx.len() < MAX_PACKET_SIZE {
            Timer::after(timeout).await;
            return Ok(0);
        }

        let mut packet = [0u8; MAX_PACKET_SIZE];
        let n = match with_timeout(timeout, self.class.read_packet(&mut packet)).await {
            Ok(result) => result?,
            Err(_) => return Ok(0),
        };

        for &byte in &packet[..n] {
            // cannot fail: room for a whole packet was checked above
            let _ = self.rx.push_back(byte);
        }
        Ok(n)
    }

    /// Send the collected outgoing bytes as one packet
    ///
    /// With nothing to send, a zero-length packet closes a transfer whose
    /// last packet was full.
    pub async fn flush_tx(&mut self) -> Result<usize, LinkError> {
        if self.tx.is_empty() {
            if self.framing.take_terminator() {
                self.class.write_packet(&[]).await?;
            }
            return Ok(0);
        }
        let n = self.tx.len();
        let result = self.class.write_packet(&self.tx).await;
        self.tx.clear();
        result?;
        self.framing.sent(n);
        Ok(n)
    }

    /// Check for and clear a DTR drop seen by `service`
    pub fn take_hangup(&mut self) -> bool {
        core::mem::take(&mut self.hangup)
    }

    fn discard(&mut self) {
        self.rx.clear();
        self.tx.clear();
        self.framing.reset();
    }
}

impl<'d, D: Driver<'d>> Transport for UsbSerialLink<'d, D> {
    fn bytes_available(&self) -> usize {
        self.rx.len()
    }

    fn receive_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), WouldBlock> {
        self.tx.push(byte).map_err(|_| WouldBlock)
    }

    fn service(&mut self) {
        let dtr = self.class.dtr();
        if self.dtr && !dtr {
            self.discard();
            self.hangup = true;
        }
        self.dtr = dtr;
    }
}
