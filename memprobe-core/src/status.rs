//! Device status shown on the indicator LED

/// Overall device state, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceStatus {
    /// A bank failed its boot self-test
    Error,
    /// USB not configured by a host yet
    NotReady,
    /// Configured, serial port not opened
    Ready,
    /// Host has the serial port open
    Connected,
}

/// LED ticks per blink cycle
pub const TICKS_PER_CYCLE: u32 = 10;

impl DeviceStatus {
    /// Derive the status from its inputs
    ///
    /// A self-test failure overrides every USB state.
    pub fn from_state(self_test_ok: bool, configured: bool, connected: bool) -> Self {
        match (self_test_ok, configured, connected) {
            (false, _, _) => DeviceStatus::Error,
            (true, false, _) => DeviceStatus::NotReady,
            (true, true, false) => DeviceStatus::Ready,
            (true, true, true) => DeviceStatus::Connected,
        }
    }

    /// LED level at `tick`
    ///
    /// - `Error`: toggles every tick
    /// - `NotReady`: one lit tick per cycle
    /// - `Ready`: lit for half of each cycle
    /// - `Connected`: steady on
    pub fn is_lit(self, tick: u32) -> bool {
        let phase = tick % TICKS_PER_CYCLE;
        match self {
            DeviceStatus::Error => tick % 2 == 0,
            DeviceStatus::NotReady => phase == 0,
            DeviceStatus::Ready => phase < TICKS_PER_CYCLE / 2,
            DeviceStatus::Connected => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_ticks(status: DeviceStatus) -> usize {
        (0..TICKS_PER_CYCLE).filter(|&t| status.is_lit(t)).count()
    }

    #[test]
    fn test_self_test_failure_wins() {
        assert_eq!(DeviceStatus::from_state(false, true, true), DeviceStatus::Error);
        assert_eq!(DeviceStatus::from_state(false, false, false), DeviceStatus::Error);
    }

    #[test]
    fn test_usb_states() {
        assert_eq!(DeviceStatus::from_state(true, false, false), DeviceStatus::NotReady);
        // a stale connected flag does not count while unconfigured
        assert_eq!(DeviceStatus::from_state(true, false, true), DeviceStatus::NotReady);
        assert_eq!(DeviceStatus::from_state(true, true, false), DeviceStatus::Ready);
        assert_eq!(DeviceStatus::from_state(true, true, true), DeviceStatus::Connected);
    }

    #[test]
    fn test_blink_patterns_are_distinct() {
        assert_eq!(lit_ticks(DeviceStatus::Error), 5);
        assert_eq!(lit_ticks(DeviceStatus::NotReady), 1);
        assert_eq!(lit_ticks(DeviceStatus::Ready), 5);
        assert_eq!(lit_ticks(DeviceStatus::Connected), 10);

        // Error and Ready light as often, but Error alternates every tick
        assert!(DeviceStatus::Error.is_lit(0) && !DeviceStatus::Error.is_lit(1));
        assert!(DeviceStatus::Ready.is_lit(0) && DeviceStatus::Ready.is_lit(1));
    }
}
