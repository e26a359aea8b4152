//! Gateway timing configuration
//!
//! All thresholds the gateway runs on, as one struct with production
//! defaults. Tests substitute shortened values; the semantics never change.

/// Timing and threshold configuration
#[derive(Debug, Clone, Copy)]
pub struct GatewayConfig {
    /// Bound on a single frame receive, in milliseconds
    pub receive_timeout_ms: u32,
    /// Poll interval while waiting for a frame, in milliseconds
    pub receive_poll_ms: u32,
    /// Cooldown after a failed handshake attempt, in milliseconds
    pub handshake_retry_ms: u32,
    /// Watchdog tick period, in milliseconds
    pub watchdog_tick_ms: u32,
    /// Watchdog expiry, in ticks (18750 x 32 ms = 10 minutes)
    pub watchdog_timeout_ticks: u32,
    /// Consecutive silent cycles tolerated before the graceful shutdown
    pub max_silent_cycles: u8,
    /// Number of `NAVI_TURN_OFF` notices in the shutdown window
    pub shutdown_notice_count: u8,
    /// Spacing between shutdown notices, in milliseconds
    pub shutdown_notice_ms: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            receive_timeout_ms: 20_000,
            receive_poll_ms: 5,
            handshake_retry_ms: 3_000,
            watchdog_tick_ms: 32,
            watchdog_timeout_ticks: 18_750,
            max_silent_cycles: 3,
            shutdown_notice_count: 20,
            shutdown_notice_ms: 6_000,
        }
    }
}
