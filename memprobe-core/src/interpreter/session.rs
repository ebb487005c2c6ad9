//! Interpreter session state
//!
//! Carried across commands for the lifetime of the firmware.

use super::help::HelpPager;
use crate::bank::Bank;

/// Cursor and mode state of the command interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterpreterSession {
    /// Window offset used by `n`, set by `i`
    index: u16,
    help: HelpPager,
    /// Bank currently mapped into the window
    bank: Bank,
}

impl InterpreterSession {
    pub const fn new() -> Self {
        Self {
            index: 0,
            help: HelpPager::new(),
            bank: Bank::Zero,
        }
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn set_index(&mut self, index: u16) {
        self.index = index;
    }

    /// Move to the next offset, wrapping at the end of the address space
    pub fn advance(&mut self) {
        self.index = self.index.wrapping_add(1);
    }

    pub fn bank(&self) -> Bank {
        self.bank
    }

    pub fn set_bank(&mut self, bank: Bank) {
        self.bank = bank;
    }

    pub fn help_page(&self) -> usize {
        self.help.page()
    }

    pub fn next_help_page(&mut self) -> &'static str {
        self.help.next_page()
    }
}
