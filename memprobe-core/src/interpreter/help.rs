//! Paged help text
//!
//! `h` (or `?`) prints one page per press so a slow terminal never gets
//! more than a few lines at once. After the last page it starts over.

/// Static help pages in display order
pub const HELP_PAGES: [&str; 6] = [
    "\r\nAvailable Commands\r\n\
     o - print info\r\n\
     \tPress h again for next page\r\n",
    "t - SRAM test status\r\n\
     s - size of SRAM\r\n\
     \tPress h again for next page\r\n",
    "b - current bank\r\n\
     0 - select bank 0\r\n\
     \tPress h again for next page\r\n",
    "1 - select bank 1\r\n\
     f??? - fill array at index ?? with data byte ? and return status\r\n\
     \tPress h again for next page\r\n",
    "g??? - fill array at index ?? with data byte ? but no status msg\r\n\
     a?? - data at address ?? \r\n\
     \tPress h again for next page\r\n",
    "i?? - data at SRAM array index ?? \r\n\
     n - data at next SRAM array index - set start index with i?? \r\n\
     \tThis is the end of the help page.\r\n\r\n",
];

/// Length of the longest help page in bytes
pub const LONGEST_PAGE: usize = {
    let mut longest = 0;
    let mut i = 0;
    while i < HELP_PAGES.len() {
        if HELP_PAGES[i].len() > longest {
            longest = HELP_PAGES[i].len();
        }
        i += 1;
    }
    longest
};

/// Cyclic help page cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HelpPager {
    page: u8,
}

impl HelpPager {
    pub const fn new() -> Self {
        Self { page: 0 }
    }

    /// Page that the next press will print
    pub fn page(&self) -> usize {
        self.page as usize
    }

    /// Return the current page and move to the following one
    pub fn next_page(&mut self) -> &'static str {
        let text = HELP_PAGES[self.page()];
        self.page = ((self.page() + 1) % HELP_PAGES.len()) as u8;
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_cycle() {
        let mut pager = HelpPager::new();
        let first = pager.next_page();
        for expected in &HELP_PAGES[1..] {
            assert_eq!(pager.next_page(), *expected);
        }
        assert_eq!(pager.page(), 0);
        assert_eq!(pager.next_page(), first);
    }

    #[test]
    fn test_pages_are_distinct() {
        for (i, a) in HELP_PAGES.iter().enumerate() {
            for b in &HELP_PAGES[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_longest_page() {
        assert!(HELP_PAGES.iter().all(|page| page.len() <= LONGEST_PAGE));
        assert!(HELP_PAGES.iter().any(|page| page.len() == LONGEST_PAGE));
    }
}
