//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod memory;
pub mod transport;

pub use memory::{AddressSpace, BankSelect, MemoryBus};
pub use transport::{Transport, WouldBlock};
