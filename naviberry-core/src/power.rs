//! Power rail and watchdog control
//!
//! Two independent fail-safes guard the companion computer's power rail:
//!
//! - A consecutive-failure counter, driven by the main loop: dispatch cycles
//!   that produce no usable exchange accumulate until a graceful shutdown is
//!   ordered (notices first, rail off last).
//! - An inactivity watchdog, driven by a periodic tick context: if the main
//!   loop stops feeding it for the full timeout, power is cut and the
//!   handshake is forced back to its initial state unconditionally.
//!
//! The watchdog counter and the re-handshake flag are shared between the
//! tick context and the main loop, so both live in lock-free atomic cells.
//! Every read-modify-write goes through the atomic; a tick landing in the
//! middle of a main-loop feed can neither corrupt the counter nor produce a
//! duplicated power transition.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use naviberry_protocol::NaviEvent;

/// Companion power rail state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    Off,
    On,
}

/// Decision returned by the failure counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerAction {
    /// Within budget, keep going
    None,
    /// Failure budget exceeded: emit the shutdown notices, then cut power
    GracefulShutdown,
}

/// Owner of the power-rail state and the consecutive-failure counter
///
/// The controller decides; the caller performs the timed notice cadence and
/// drives the actual pin.
#[derive(Debug, Clone)]
pub struct PowerController {
    state: PowerState,
    silent_cycles: u8,
    max_silent_cycles: u8,
}

impl PowerController {
    pub fn new(max_silent_cycles: u8) -> Self {
        Self {
            state: PowerState::Off,
            silent_cycles: 0,
            max_silent_cycles,
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == PowerState::On
    }

    /// The handshake completed: power up and forget accumulated failures
    pub fn handshake_complete(&mut self) {
        self.state = PowerState::On;
        self.silent_cycles = 0;
    }

    /// Rail is being cut (end of a shutdown sequence or watchdog expiry)
    pub fn power_off(&mut self) {
        self.state = PowerState::Off;
    }

    /// A dispatch cycle produced a usable exchange
    pub fn record_exchange(&mut self) {
        self.silent_cycles = 0;
    }

    /// A dispatch cycle produced no usable exchange
    ///
    /// Returns [`PowerAction::GracefulShutdown`] exactly once when the
    /// budget is exceeded; the counter is cleared at that point so the
    /// sequence does not re-trigger until failures accumulate again.
    pub fn record_silence(&mut self) -> PowerAction {
        self.silent_cycles = self.silent_cycles.saturating_add(1);
        if self.silent_cycles > self.max_silent_cycles {
            self.silent_cycles = 0;
            PowerAction::GracefulShutdown
        } else {
            PowerAction::None
        }
    }

    /// Current failure count (for diagnostics)
    pub fn silent_cycles(&self) -> u8 {
        self.silent_cycles
    }
}

/// Emitter for the graceful shutdown notice window
///
/// Yields the fixed number of power-down notices, one per cadence slot. The
/// caller owns the timing between notices and cuts the rail once the
/// sequence is exhausted.
#[derive(Debug, Clone)]
pub struct ShutdownSequence {
    remaining: u8,
}

impl ShutdownSequence {
    pub fn new(notice_count: u8) -> Self {
        Self {
            remaining: notice_count,
        }
    }

    /// Next notice to send, or `None` once the window is over
    pub fn next_notice(&mut self) -> Option<NaviEvent> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(NaviEvent::PowerDownNotice)
    }
}

/// Inactivity watchdog counter shared with the periodic tick context
///
/// `const fn new` so it can live in a `static`; the tick context calls
/// [`tick`](Self::tick), the main loop calls [`feed`](Self::feed) on every
/// iteration that observes bus liveness.
#[derive(Debug)]
pub struct WatchdogCell {
    ticks: AtomicU32,
}

impl WatchdogCell {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
        }
    }

    /// One periodic tick; returns true exactly once when the timeout is
    /// reached, clearing the counter in the same step
    pub fn tick(&self, timeout_ticks: u32) -> bool {
        let ticks = self.ticks.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        if ticks >= timeout_ticks {
            self.ticks.store(0, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// Liveness reset from the main loop
    pub fn feed(&self) {
        self.ticks.store(0, Ordering::Release);
    }

    /// Ticks accumulated since the last reset (for diagnostics)
    pub fn elapsed_ticks(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }
}

impl Default for WatchdogCell {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot flag from the watchdog context ordering a re-handshake
#[derive(Debug)]
pub struct ResetFlag {
    requested: AtomicBool,
}

impl ResetFlag {
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
        }
    }

    /// Order a re-handshake (watchdog context)
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Consume the request, if any (main loop)
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::AcqRel)
    }
}

impl Default for ResetFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_powers_on() {
        let mut power = PowerController::new(3);
        assert_eq!(power.state(), PowerState::Off);

        power.handshake_complete();
        assert_eq!(power.state(), PowerState::On);
        assert_eq!(power.silent_cycles(), 0);
    }

    #[test]
    fn test_shutdown_after_budget_exceeded() {
        let mut power = PowerController::new(3);
        power.handshake_complete();

        assert_eq!(power.record_silence(), PowerAction::None);
        assert_eq!(power.record_silence(), PowerAction::None);
        assert_eq!(power.record_silence(), PowerAction::None);
        // Fourth consecutive silent cycle exceeds the budget of 3
        assert_eq!(power.record_silence(), PowerAction::GracefulShutdown);
        // Counter cleared: no immediate re-trigger
        assert_eq!(power.silent_cycles(), 0);
        assert_eq!(power.record_silence(), PowerAction::None);
    }

    #[test]
    fn test_exchange_resets_budget() {
        let mut power = PowerController::new(3);
        power.handshake_complete();

        power.record_silence();
        power.record_silence();
        power.record_silence();
        power.record_exchange();

        // Full budget available again
        assert_eq!(power.record_silence(), PowerAction::None);
        assert_eq!(power.record_silence(), PowerAction::None);
        assert_eq!(power.record_silence(), PowerAction::None);
        assert_eq!(power.record_silence(), PowerAction::GracefulShutdown);
    }

    #[test]
    fn test_shutdown_sequence_emits_exact_notice_count() {
        let mut sequence = ShutdownSequence::new(20);

        let mut notices = 0;
        while let Some(event) = sequence.next_notice() {
            assert_eq!(event, NaviEvent::PowerDownNotice);
            notices += 1;
        }
        assert_eq!(notices, 20);

        // Exhausted for good; the rail cut follows
        assert!(sequence.next_notice().is_none());
    }

    #[test]
    fn test_watchdog_fires_once_at_timeout() {
        let watchdog = WatchdogCell::new();

        for _ in 0..9 {
            assert!(!watchdog.tick(10));
        }
        assert!(watchdog.tick(10));

        // Cleared: does not refire until ticks accumulate again
        assert_eq!(watchdog.elapsed_ticks(), 0);
        for _ in 0..9 {
            assert!(!watchdog.tick(10));
        }
        assert!(watchdog.tick(10));
    }

    #[test]
    fn test_feed_prevents_expiry() {
        let watchdog = WatchdogCell::new();

        for _ in 0..9 {
            assert!(!watchdog.tick(10));
        }
        watchdog.feed();
        assert_eq!(watchdog.elapsed_ticks(), 0);
        assert!(!watchdog.tick(10));
    }

    #[test]
    fn test_reset_flag_consumed_once() {
        let flag = ResetFlag::new();
        assert!(!flag.take());

        flag.request();
        assert!(flag.take());
        assert!(!flag.take());
    }
}
