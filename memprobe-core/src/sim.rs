//! Simulated banked memory for host tests

use std::vec;
use std::vec::Vec;

use crate::bank::{Bank, BANK_COUNT};
use crate::config::RegionConfig;
use crate::traits::{AddressSpace, BankSelect};

/// 64 KiB address space with a banked window and optional stuck cells
pub struct SimBus {
    region: RegionConfig,
    common: Vec<u8>,
    banks: [Vec<u8>; BANK_COUNT],
    selected: Bank,
    /// (bank, address, value); `None` bank means every bank and the common image
    stuck: Vec<(Option<Bank>, u16, u8)>,
    selections: usize,
}

impl SimBus {
    pub fn new(region: RegionConfig) -> Self {
        Self {
            region,
            common: vec![0; 0x1_0000],
            banks: [vec![0; region.span()], vec![0; region.span()]],
            selected: Bank::Zero,
            stuck: Vec::new(),
            selections: 0,
        }
    }

    /// Reads at `addr` always return `value`, whatever bank is mapped
    pub fn stick(&mut self, addr: u16, value: u8) {
        self.stuck.push((None, addr, value));
    }

    /// Reads at `addr` return `value` while `bank` is mapped
    pub fn stick_in_bank(&mut self, bank: Bank, addr: u16, value: u8) {
        self.stuck.push((Some(bank), addr, value));
    }

    pub fn selected(&self) -> Bank {
        self.selected
    }

    /// Number of `select_bank` calls seen
    pub fn selections(&self) -> usize {
        self.selections
    }

    /// Raw content of a bank cell, bypassing stuck cells
    pub fn bank_cell(&self, bank: Bank, offset: u16) -> u8 {
        self.banks[bank.index()][offset as usize]
    }
}

impl AddressSpace for SimBus {
    fn read(&self, addr: u16) -> u8 {
        let stuck = self.stuck.iter().find(|(bank, stuck_addr, _)| {
            *stuck_addr == addr && bank.map_or(true, |bank| bank == self.selected)
        });
        if let Some((_, _, value)) = stuck {
            return *value;
        }
        if self.region.contains(addr) {
            self.banks[self.selected.index()][(addr - self.region.start) as usize]
        } else {
            self.common[addr as usize]
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        if self.region.contains(addr) {
            self.banks[self.selected.index()][(addr - self.region.start) as usize] = value;
        } else {
            self.common[addr as usize] = value;
        }
    }
}

impl BankSelect for SimBus {
    fn select_bank(&mut self, bank: Bank) {
        self.selected = bank;
        self.selections += 1;
    }
}
