//! RP2040-specific HAL for the memprobe SRAM tester
//!
//! This crate provides RP2040 implementations of the `memprobe-core`
//! traits:
//!
//! - Banked SRAM window emulated in on-chip RAM with a bank-select GPIO
//!   (implements `memprobe_core::traits::MemoryBus`)
//! - USB CDC-ACM serial link (implements `memprobe_core::traits::Transport`)

#![no_std]

pub mod sram;
pub mod usb;

use embassy_rp::gpio::Output;
use embassy_rp::peripherals::USB;

pub use sram::{BankedSram, SramError, SramStorage, SramWindow, BANK_CAPACITY};
pub use usb::{LinkError, UsbSerialLink, MAX_PACKET_SIZE};

/// Banked SRAM driven by an RP2040 output pin
pub type RpBankedSram = BankedSram<Output<'static>>;

/// USB driver of the RP2040 device controller
pub type RpUsbDriver = embassy_rp::usb::Driver<'static, USB>;

/// Serial link on the RP2040 device controller
pub type RpUsbSerialLink = UsbSerialLink<'static, RpUsbDriver>;
