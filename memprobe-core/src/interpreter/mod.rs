//! Single-character command interpreter
//!
//! Consumes command bytes from the inbound queue, executes them against the
//! memory bus and the stored self-test verdicts, and formats the responses
//! into the outbound queue.
//!
//! A pass runs until the inbound queue is empty, except that
//! - a command whose argument bytes have not all arrived stays queued, and
//! - no command starts while the outbound queue lacks room for the longest
//!   response.
//!
//! Both leave the remaining bytes for the next pass.
//!
//! Numeric arguments are used as given. Window offsets are added to the
//! window start and wrap in the 16-bit address space; nothing is clamped to
//! the window size.

pub mod command;
pub mod help;
pub mod session;

use core::fmt::{self, Write};

use crate::config::RegionConfig;
use crate::memtest::{BankResults, SelfTestResult};
use crate::queue::ByteQueue;
use crate::traits::MemoryBus;

pub use command::{Command, Request};
pub use help::{HelpPager, HELP_PAGES};
pub use session::InterpreterSession;

/// Response to an unrecognized command byte
pub const ERROR_RESPONSE: &str = "102-ERROR\r\n";

/// Outbound space required before a command is started
pub const MAX_RESPONSE_LEN: usize = if help::LONGEST_PAGE > 64 {
    help::LONGEST_PAGE
} else {
    64
};

/// Why a pass returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopReason {
    /// Inbound queue is empty
    #[default]
    Drained,
    /// Leading command is waiting for argument bytes
    AwaitingArguments,
    /// Outbound queue is too full to start another command
    OutputFull,
}

/// What one interpreter pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PassSummary {
    /// Commands executed, including unrecognized ones
    pub executed: usize,
    /// Unrecognized command bytes answered with the error response
    pub unrecognized: usize,
    /// Responses cut short by a full outbound queue
    pub truncated: usize,
    pub stop: StopReason,
}

/// Command interpreter with its persistent session
#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    session: InterpreterSession,
    region: RegionConfig,
    results: BankResults,
}

impl CommandInterpreter {
    /// Create an interpreter for `region`
    ///
    /// The session starts on bank 0, so bank 0 must be mapped when the
    /// first command runs.
    pub fn new(region: RegionConfig, results: BankResults) -> Self {
        Self {
            session: InterpreterSession::new(),
            region,
            results,
        }
    }

    pub fn session(&self) -> &InterpreterSession {
        &self.session
    }

    pub fn results(&self) -> &BankResults {
        &self.results
    }

    pub fn region(&self) -> RegionConfig {
        self.region
    }

    /// Execute every complete command currently buffered
    pub fn process<M, const IN: usize, const OUT: usize>(
        &mut self,
        memory: &mut M,
        inbound: &mut ByteQueue<IN>,
        outbound: &mut ByteQueue<OUT>,
    ) -> PassSummary
    where
        M: MemoryBus + ?Sized,
    {
        let mut summary = PassSummary::default();
        let reserve = MAX_RESPONSE_LEN.min(outbound.capacity());

        loop {
            let Some(byte) = inbound.peek() else {
                summary.stop = StopReason::Drained;
                break;
            };

            let command = Command::from_byte(byte);
            let arity = command.arity();
            if inbound.count() < 1 + arity {
                summary.stop = StopReason::AwaitingArguments;
                break;
            }
            if outbound.free() < reserve {
                summary.stop = StopReason::OutputFull;
                break;
            }

            inbound.remove();
            let mut args = [0u8; Command::MAX_ARITY];
            for arg in args.iter_mut().take(arity) {
                *arg = inbound.remove().unwrap_or(0);
            }

            let request = command.with_args(&args[..arity]);
            if matches!(request, Request::Unknown(_)) {
                summary.unrecognized += 1;
            }
            if self.execute(request, memory, outbound).is_err() {
                summary.truncated += 1;
            }
            summary.executed += 1;
        }

        summary
    }

    /// Run one framed request and write its response
    pub fn execute<M, W>(&mut self, request: Request, memory: &mut M, out: &mut W) -> fmt::Result
    where
        M: MemoryBus + ?Sized,
        W: Write,
    {
        let region = self.region;

        match request {
            Request::Next => {
                let value = memory.read(region.addr(self.session.index()));
                self.session.advance();
                write!(out, "{:>3}\r\n", value)
            }
            Request::Help => out.write_str(self.session.next_help_page()),
            Request::Info => write!(
                out,
                "SRAM StartAddr = {:>5}, EndAddr = {:>5}, Size = {:>5} bytes\r\n",
                region.start,
                region.end,
                region.size()
            ),
            Request::TestStatus => match self.results.get(self.session.bank()) {
                Some(SelfTestResult::Passed) => out.write_str("External_SRAM_Passed_Pattern_Tests\r\n"),
                Some(SelfTestResult::Failed { test, offset }) => write!(
                    out,
                    "SRAM_Fail_Addr = {:>5}, Failed_Test {}\r\n",
                    region.addr(offset),
                    test.id()
                ),
                None => out.write_str("External_SRAM_Not_Tested\r\n"),
            },
            Request::Size => write!(out, "{:>5}\r\n", region.size()),
            Request::Fill {
                offset,
                value,
                echo,
            } => {
                let addr = region.addr(offset);
                memory.write(addr, value);
                if echo {
                    write!(out, "Filled EMA[{:>5}] with {:>3}\r\n", offset, memory.read(addr))
                } else {
                    Ok(())
                }
            }
            Request::ReportBank => write!(out, "SRAM_Bank = {}\r\n", self.session.bank().id()),
            Request::SelectBank(bank) => {
                memory.select_bank(bank);
                self.session.set_bank(bank);
                Ok(())
            }
            Request::ReadAbsolute { addr } => {
                write!(out, "Addr: {:>5}: = {:>3}\r\n", addr, memory.read(addr))
            }
            Request::SetIndex { index } => {
                self.session.set_index(index);
                let addr = region.addr(index);
                write!(out, "EMA[{:>5}] = Addr:{:>5} = {:>3}\r\n", index, addr, memory.read(addr))
            }
            Request::Unknown(_) => out.write_str(ERROR_RESPONSE),
        }
    }
}
