//! Memory bank identifiers

/// Number of selectable banks behind the memory window
pub const BANK_COUNT: usize = 2;

/// One of the two mutually exclusive banks mapped into the same window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bank {
    #[default]
    Zero,
    One,
}

impl Bank {
    /// All banks in test order
    pub const ALL: [Bank; BANK_COUNT] = [Bank::Zero, Bank::One];

    /// Numeric bank id as reported over the protocol
    pub const fn id(self) -> u8 {
        match self {
            Bank::Zero => 0,
            Bank::One => 1,
        }
    }

    /// Create a bank from its numeric id
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Bank::Zero),
            1 => Some(Bank::One),
            _ => None,
        }
    }

    /// Index into per-bank tables
    pub const fn index(self) -> usize {
        self.id() as usize
    }
}
