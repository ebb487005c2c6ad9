//! Embassy async tasks
//!
//! `usb_task` runs the USB device state machine; `probe_task` owns the
//! queues, the interpreter and the memory and runs the pipeline.

pub mod probe;
pub mod usb;

pub use probe::{probe_task, HOST_CONNECTED, PROBE_CYCLES};
pub use usb::{usb_task, UsbStateHandler, USB_CONFIGURED};
