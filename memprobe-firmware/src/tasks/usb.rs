//! USB device task
//!
//! Handles enumeration, control requests and suspend/resume. Never returns.
//! Configuration changes are published in `USB_CONFIGURED` for the status
//! LED.

use defmt::*;
use embassy_usb::{Handler, UsbDevice};
use portable_atomic::{AtomicBool, Ordering};

use memprobe_hal_rp2040::RpUsbDriver;

/// Set while a host has the device configured
pub static USB_CONFIGURED: AtomicBool = AtomicBool::new(false);

/// Device event handler mirroring the configured state
pub struct UsbStateHandler;

impl Handler for UsbStateHandler {
    fn enabled(&mut self, enabled: bool) {
        debug!("USB enabled: {}", enabled);
        if !enabled {
            USB_CONFIGURED.store(false, Ordering::Relaxed);
        }
    }

    fn reset(&mut self) {
        debug!("USB bus reset");
        USB_CONFIGURED.store(false, Ordering::Relaxed);
    }

    fn configured(&mut self, configured: bool) {
        info!("USB configured: {}", configured);
        USB_CONFIGURED.store(configured, Ordering::Relaxed);
    }

    fn suspended(&mut self, suspended: bool) {
        debug!("USB suspended: {}", suspended);
    }
}

#[embassy_executor::task]
pub async fn usb_task(mut usb: UsbDevice<'static, RpUsbDriver>) -> ! {
    info!("USB task started");
    usb.run().await
}
