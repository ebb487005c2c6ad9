//! Memory pattern self-test
//!
//! Seven write-then-verify passes over the memory window. The order and the
//! numbering are part of the diagnostic output: the `t` command reports the
//! number of the first failing test.
//!
//! | Test | Pattern                     | Sweep        |
//! |------|-----------------------------|--------------|
//! | 1    | `offset mod 256`            | ascending    |
//! | 2    | `offset mod 256`            | descending   |
//! | 3    | `0xFF`                      | ascending    |
//! | 4    | `0x00`                      | ascending    |
//! | 5    | `0xAA`                      | ascending    |
//! | 6    | `0x55`                      | ascending    |
//! | 7    | `offset mod 256` (recheck)  | ascending    |

use crate::bank::{Bank, BANK_COUNT};
use crate::config::RegionConfig;
use crate::traits::{AddressSpace, MemoryBus};

/// Offsets covered by the descending count test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DescendingSweep {
    /// `size` down to 1, so offset `size` (the window's `end` cell) is
    /// exercised and offset 0 is not
    #[default]
    Reference,
    /// `size - 1` down to 0, the same cells as the ascending sweep
    Window,
}

/// One pattern pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PatternTest {
    AscendingCount = 1,
    DescendingCount = 2,
    AllOnes = 3,
    AllZeros = 4,
    AlternatingAa = 5,
    Alternating55 = 6,
    AscendingRecheck = 7,
}

impl PatternTest {
    /// Execution order
    pub const SEQUENCE: [PatternTest; 7] = [
        PatternTest::AscendingCount,
        PatternTest::DescendingCount,
        PatternTest::AllOnes,
        PatternTest::AllZeros,
        PatternTest::AlternatingAa,
        PatternTest::Alternating55,
        PatternTest::AscendingRecheck,
    ];

    /// Test number reported to the operator
    pub const fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::SEQUENCE.iter().copied().find(|test| test.id() == id)
    }

    /// Value written to (and expected at) a window offset
    pub const fn expected(self, offset: u16) -> u8 {
        match self {
            PatternTest::AscendingCount
            | PatternTest::DescendingCount
            | PatternTest::AscendingRecheck => offset as u8,
            PatternTest::AllOnes => 0xFF,
            PatternTest::AllZeros => 0x00,
            PatternTest::AlternatingAa => 0xAA,
            PatternTest::Alternating55 => 0x55,
        }
    }
}

/// Outcome of one full run over a bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SelfTestResult {
    Passed,
    Failed {
        /// First test whose verify pass found a mismatch
        test: PatternTest,
        /// Window offset of the first mismatching cell
        offset: u16,
    },
}

impl SelfTestResult {
    /// Failing test number, 0 when every test passed
    pub fn test_id(&self) -> u8 {
        match self {
            SelfTestResult::Passed => 0,
            SelfTestResult::Failed { test, .. } => test.id(),
        }
    }

    pub fn failing_offset(&self) -> Option<u16> {
        match self {
            SelfTestResult::Passed => None,
            SelfTestResult::Failed { offset, .. } => Some(*offset),
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, SelfTestResult::Passed)
    }
}

/// Stored verdict per bank
///
/// `None` means the bank has not been checked since boot. An entry only
/// changes when that bank is tested again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BankResults {
    results: [Option<SelfTestResult>; BANK_COUNT],
}

impl BankResults {
    pub const fn new() -> Self {
        Self {
            results: [None; BANK_COUNT],
        }
    }

    pub fn record(&mut self, bank: Bank, result: SelfTestResult) {
        self.results[bank.index()] = Some(result);
    }

    pub fn get(&self, bank: Bank) -> Option<SelfTestResult> {
        self.results[bank.index()]
    }
}

/// Offsets visited by one pass, half-open `[front, back)`
#[derive(Debug, Clone)]
struct Sweep {
    front: u32,
    back: u32,
    descending: bool,
}

impl Iterator for Sweep {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        if self.front >= self.back {
            return None;
        }
        if self.descending {
            self.back -= 1;
            Some(self.back as u16)
        } else {
            self.front += 1;
            Some((self.front - 1) as u16)
        }
    }
}

/// Pattern tester for one memory window
#[derive(Debug, Clone, Copy)]
pub struct MemoryTester {
    region: RegionConfig,
    descending: DescendingSweep,
}

impl MemoryTester {
    /// Create a tester using the reference descending sweep
    pub fn new(region: RegionConfig) -> Self {
        Self {
            region,
            descending: DescendingSweep::Reference,
        }
    }

    pub fn with_descending_sweep(mut self, sweep: DescendingSweep) -> Self {
        self.descending = sweep;
        self
    }

    pub fn region(&self) -> RegionConfig {
        self.region
    }

    fn sweep(&self, test: PatternTest) -> Sweep {
        let size = self.region.size() as u32;
        match (test, self.descending) {
            (PatternTest::DescendingCount, DescendingSweep::Reference) => Sweep {
                front: 1,
                back: size + 1,
                descending: true,
            },
            (PatternTest::DescendingCount, DescendingSweep::Window) => Sweep {
                front: 0,
                back: size,
                descending: true,
            },
            _ => Sweep {
                front: 0,
                back: size,
                descending: false,
            },
        }
    }

    /// Write the whole sweep, then verify it
    ///
    /// Returns the first mismatching offset.
    fn run_pass<M: AddressSpace + ?Sized>(&self, memory: &mut M, test: PatternTest) -> Option<u16> {
        for offset in self.sweep(test) {
            memory.write(self.region.addr(offset), test.expected(offset));
        }
        self.sweep(test)
            .find(|&offset| memory.read(self.region.addr(offset)) != test.expected(offset))
    }

    /// Run all seven tests against whatever bank is currently mapped
    ///
    /// Stops at the first mismatch. The caller must keep the same bank mapped
    /// for the whole call.
    pub fn run_pattern_tests<M: AddressSpace + ?Sized>(&self, memory: &mut M) -> SelfTestResult {
        for test in PatternTest::SEQUENCE {
            if let Some(offset) = self.run_pass(memory, test) {
                return SelfTestResult::Failed { test, offset };
            }
        }
        SelfTestResult::Passed
    }

    /// Map `bank`, test it and record the verdict
    pub fn run_bank<M: MemoryBus + ?Sized>(
        &self,
        memory: &mut M,
        bank: Bank,
        results: &mut BankResults,
    ) -> SelfTestResult {
        memory.select_bank(bank);
        let result = self.run_pattern_tests(memory);
        results.record(bank, result);
        result
    }

    /// Test every bank in order, then leave bank 0 mapped
    pub fn run_all_banks<M: MemoryBus + ?Sized>(&self, memory: &mut M, results: &mut BankResults) {
        for bank in Bank::ALL {
            self.run_bank(memory, bank, results);
        }
        memory.select_bank(Bank::Zero);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBus;
    use proptest::prelude::*;

    fn small_region() -> RegionConfig {
        RegionConfig {
            start: 0x2000,
            end: 0x2200,
        }
    }

    #[test]
    fn test_sequence_ids() {
        for (i, test) in PatternTest::SEQUENCE.iter().enumerate() {
            assert_eq!(test.id() as usize, i + 1);
            assert_eq!(PatternTest::from_id(test.id()), Some(*test));
        }
        assert_eq!(PatternTest::from_id(0), None);
        assert_eq!(PatternTest::from_id(8), None);
    }

    #[test]
    fn test_fault_free_memory_passes() {
        let region = RegionConfig::default();
        let mut bus = SimBus::new(region);
        let result = MemoryTester::new(region).run_pattern_tests(&mut bus);
        assert_eq!(result, SelfTestResult::Passed);
        assert_eq!(result.test_id(), 0);
        assert_eq!(result.failing_offset(), None);
    }

    #[test]
    fn test_final_contents_are_ascending_count() {
        let region = small_region();
        let mut bus = SimBus::new(region);
        MemoryTester::new(region).run_pattern_tests(&mut bus);
        for offset in 0..region.size() {
            assert_eq!(bus.read(region.addr(offset)), offset as u8);
        }
    }

    #[test]
    fn test_reference_sweep_touches_end_cell() {
        let region = small_region();
        let mut bus = SimBus::new(region);
        // end cell stuck at a value only the count tests can produce there
        bus.stick(region.end, 0x12);
        let result = MemoryTester::new(region).run_pattern_tests(&mut bus);
        assert_eq!(
            result,
            SelfTestResult::Failed {
                test: PatternTest::DescendingCount,
                offset: region.size(),
            }
        );
    }

    #[test]
    fn test_window_sweep_skips_end_cell() {
        let region = small_region();
        let mut bus = SimBus::new(region);
        bus.stick(region.end, 0x12);
        let result = MemoryTester::new(region)
            .with_descending_sweep(DescendingSweep::Window)
            .run_pattern_tests(&mut bus);
        assert_eq!(result, SelfTestResult::Passed);
    }

    #[test]
    fn test_stuck_low_cell_fails_first_test() {
        let region = small_region();
        let mut bus = SimBus::new(region);
        bus.stick(region.addr(5), 0x00);
        let result = MemoryTester::new(region).run_pattern_tests(&mut bus);
        assert_eq!(
            result,
            SelfTestResult::Failed {
                test: PatternTest::AscendingCount,
                offset: 5,
            }
        );
    }

    #[test]
    fn test_stuck_cell_matching_count_fails_at_ones() {
        let region = small_region();
        let mut bus = SimBus::new(region);
        bus.stick(region.addr(5), 5);
        let result = MemoryTester::new(region).run_pattern_tests(&mut bus);
        assert_eq!(result.test_id(), 3);
        assert_eq!(result.failing_offset(), Some(5));
    }

    #[test]
    fn test_stuck_ones_at_offset_255_fails_at_zeros() {
        let region = small_region();
        let mut bus = SimBus::new(region);
        bus.stick(region.addr(255), 0xFF);
        let result = MemoryTester::new(region).run_pattern_tests(&mut bus);
        assert_eq!(result.test_id(), 4);
        assert_eq!(result.failing_offset(), Some(255));
    }

    #[test]
    fn test_first_failing_offset_is_reported() {
        let region = small_region();
        let mut bus = SimBus::new(region);
        bus.stick(region.addr(40), 0x00);
        bus.stick(region.addr(30), 0x00);
        let result = MemoryTester::new(region).run_pattern_tests(&mut bus);
        assert_eq!(result.failing_offset(), Some(30));
    }

    #[test]
    fn test_run_all_banks_records_each_bank() {
        let region = small_region();
        let mut bus = SimBus::new(region);
        bus.stick_in_bank(Bank::One, region.addr(7), 0xAA);
        let mut results = BankResults::new();
        assert_eq!(results.get(Bank::Zero), None);

        MemoryTester::new(region).run_all_banks(&mut bus, &mut results);

        assert_eq!(results.get(Bank::Zero), Some(SelfTestResult::Passed));
        assert_eq!(
            results.get(Bank::One),
            Some(SelfTestResult::Failed {
                test: PatternTest::AscendingCount,
                offset: 7,
            })
        );
        assert_eq!(bus.selected(), Bank::Zero);
        assert_eq!(bus.selections(), Bank::ALL.len() + 1);
    }

    #[test]
    fn test_rerun_replaces_only_that_bank() {
        let region = small_region();
        let mut bus = SimBus::new(region);
        let tester = MemoryTester::new(region);
        let mut results = BankResults::new();
        tester.run_all_banks(&mut bus, &mut results);

        bus.stick_in_bank(Bank::Zero, region.addr(1), 0x00);
        tester.run_bank(&mut bus, Bank::Zero, &mut results);

        assert_eq!(results.get(Bank::Zero).map(|r| r.test_id()), Some(1));
        assert_eq!(results.get(Bank::One), Some(SelfTestResult::Passed));
    }

    /// First test in execution order that visits `offset` and expects
    /// something other than `stuck` there
    fn first_detecting_test(size: u16, offset: u16, stuck: u8) -> Option<PatternTest> {
        PatternTest::SEQUENCE.iter().copied().find(|&test| {
            let visited = match test {
                PatternTest::DescendingCount => offset >= 1 && offset <= size,
                _ => offset < size,
            };
            visited && test.expected(offset) != stuck
        })
    }

    proptest! {
        #[test]
        fn prop_single_stuck_cell_is_located(offset in 0u16..=0x200, stuck in any::<u8>()) {
            let region = small_region();
            let mut bus = SimBus::new(region);
            bus.stick(region.addr(offset), stuck);

            let result = MemoryTester::new(region).run_pattern_tests(&mut bus);

            match first_detecting_test(region.size(), offset, stuck) {
                Some(test) => prop_assert_eq!(result, SelfTestResult::Failed { test, offset }),
                None => prop_assert_eq!(result, SelfTestResult::Passed),
            }
        }
    }
}
