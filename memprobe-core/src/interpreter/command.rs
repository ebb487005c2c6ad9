//! Command table
//!
//! Every command is one ASCII byte, optionally followed by a fixed number of
//! raw argument bytes. Addresses are two bytes, high byte first.

use crate::bank::Bank;

/// Command selected by the leading byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `n` - read the cell at the session index, then advance it
    Next,
    /// `h` or `?` - print the next help page
    Help,
    /// `o` - window start, end and size
    Info,
    /// `t` - self-test verdict of the active bank
    TestStatus,
    /// `s` - window size
    Size,
    /// `f` - write a cell and echo it
    Fill,
    /// `g` - write a cell silently
    FillQuiet,
    /// `b` - active bank id
    ReportBank,
    /// `0` / `1` - map a bank
    SelectBank(Bank),
    /// `a` - read an absolute address
    ReadAbsolute,
    /// `i` - set the session index and read there
    SetIndex,
    /// Anything else
    Unknown(u8),
}

impl Command {
    /// Largest number of argument bytes any command takes
    pub const MAX_ARITY: usize = 3;

    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'n' => Command::Next,
            b'h' | b'?' => Command::Help,
            b'o' => Command::Info,
            b't' => Command::TestStatus,
            b's' => Command::Size,
            b'f' => Command::Fill,
            b'g' => Command::FillQuiet,
            b'b' => Command::ReportBank,
            b'0' => Command::SelectBank(Bank::Zero),
            b'1' => Command::SelectBank(Bank::One),
            b'a' => Command::ReadAbsolute,
            b'i' => Command::SetIndex,
            other => Command::Unknown(other),
        }
    }

    /// Number of argument bytes following the command byte
    pub const fn arity(self) -> usize {
        match self {
            Command::Fill | Command::FillQuiet => 3,
            Command::ReadAbsolute | Command::SetIndex => 2,
            _ => 0,
        }
    }

    /// Combine the command with its argument bytes
    ///
    /// `args` holds exactly `arity()` bytes; missing bytes read as zero.
    pub fn with_args(self, args: &[u8]) -> Request {
        let arg = |i: usize| args.get(i).copied().unwrap_or(0);
        let word = u16::from_be_bytes([arg(0), arg(1)]);

        match self {
            Command::Next => Request::Next,
            Command::Help => Request::Help,
            Command::Info => Request::Info,
            Command::TestStatus => Request::TestStatus,
            Command::Size => Request::Size,
            Command::Fill => Request::Fill {
                offset: word,
                value: arg(2),
                echo: true,
            },
            Command::FillQuiet => Request::Fill {
                offset: word,
                value: arg(2),
                echo: false,
            },
            Command::ReportBank => Request::ReportBank,
            Command::SelectBank(bank) => Request::SelectBank(bank),
            Command::ReadAbsolute => Request::ReadAbsolute { addr: word },
            Command::SetIndex => Request::SetIndex { index: word },
            Command::Unknown(byte) => Request::Unknown(byte),
        }
    }
}

/// Fully framed command ready to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    Next,
    Help,
    Info,
    TestStatus,
    Size,
    Fill { offset: u16, value: u8, echo: bool },
    ReportBank,
    SelectBank(Bank),
    ReadAbsolute { addr: u16 },
    SetIndex { index: u16 },
    Unknown(u8),
}
