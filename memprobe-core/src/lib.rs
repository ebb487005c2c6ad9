//! Board-agnostic core logic for the memprobe SRAM tester
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Byte queues between the USB transport and the interpreter
//! - Memory pattern self-test
//! - Command interpreter for the single-character debug protocol
//! - The cooperative pipeline step tying them together
//! - Bulk packet termination for packet transports
//! - Device status for the indicator LED
//! - Hardware abstraction traits (transport, memory bus)
//! - Configuration types and the embedded config parser
//!
//! # Data flow
//!
//! ```text
//! ┌───────────┐   ┌──────────┐   ┌─────────────┐   ┌───────────┐   ┌───────────┐
//! │ Transport │──▶│ inbound  │──▶│ Interpreter │──▶│ outbound  │──▶│ Transport │
//! └───────────┘   │ queue    │   └──────┬──────┘   │ queue     │   └───────────┘
//!                 └──────────┘          ▼          └───────────┘
//!                              MemoryBus / BankResults
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod bank;
pub mod config;
pub mod interpreter;
pub mod memtest;
pub mod packet;
pub mod pipeline;
pub mod queue;
pub mod status;
pub mod traits;

#[cfg(test)]
mod sim;

pub use bank::Bank;
pub use interpreter::{CommandInterpreter, InterpreterSession, PassSummary};
pub use memtest::{BankResults, DescendingSweep, MemoryTester, PatternTest, SelfTestResult};
pub use packet::PacketFraming;
pub use pipeline::{CycleReport, Pipeline};
pub use queue::{ByteQueue, QueueFull};
pub use status::DeviceStatus;
