//! Tuner handshake exchange table
//!
//! The head unit establishes a tuner source through a fixed sequence of
//! request/response pairs. Each step is keyed on an exact payload from the
//! navigation unit and answered with one or two literal reply payloads under
//! the tuner identifier. The table is data, not code, so every step can be
//! tested in isolation and the engine stays a thin cursor over it.

/// Announcement payload that opens every handshake attempt
pub const ANNOUNCE: &[u8] = &[0xA1, 0x01];

/// Terminal acknowledgment from the head unit; observing it means the
/// emulated tuner is the active source
pub const TERMINAL_ACK: &[u8] = &[0xB6];

/// Session-end notification; the head unit dropped the tuner source and the
/// handshake must be run again
pub const SESSION_END: &[u8] = &[0xE0, 0x01, 0x00];

/// One request/response pair of the exchange
#[derive(Debug, Clone, Copy)]
pub struct ExchangeStep {
    /// Exact payload expected from the navigation unit
    pub expect: &'static [u8],
    /// Literal reply payloads, sent in order under the tuner identifier
    pub replies: &'static [&'static [u8]],
}

/// The ordered exchange, minus the two-phase feature probe (see below)
///
/// Step 0 repeats the announcement before the capability block because the
/// head unit treats the session-end payload as "start over".
pub const EXCHANGE: &[ExchangeStep] = &[
    // Capability query
    ExchangeStep {
        expect: &[0xE0, 0x01, 0x00],
        replies: &[&[0xA1, 0x01], &[0x10, 0x15, 0x01, 0x00, 0x01, 0x00, 0x00]],
    },
    // Ready acknowledgment
    ExchangeStep {
        expect: &[0x10, 0x00, 0x01],
        replies: &[&[0xB1], &[0x11, 0x01, 0x01]],
    },
    // Feature block 1
    ExchangeStep {
        expect: &[0x11, 0x08],
        replies: &[&[0xB2], &[0x12, 0x09, 0x01, 0x42, 0x50, 0x63, 0x1E]],
    },
    // Feature block 2
    ExchangeStep {
        expect: &[0x12, 0x22],
        replies: &[&[0xB3], &[0x13, 0x23, 0x00]],
    },
    // Feature block 3
    ExchangeStep {
        expect: &[0x13, 0x26, 0xFF],
        replies: &[&[0xB4]],
    },
];

/// Payload of the two-phase feature probe (step 4 of the exchange)
pub const PROBE_REQUEST: &[u8] = &[0x14, 0x50, 0x00];

/// Reply to the first probe occurrence
pub const PROBE_FIRST_REPLY: &[u8] = &[0x14, 0x0B, 0x01, 0x26];

/// Replies to the second probe occurrence
pub const PROBE_SECOND_REPLIES: &[&[u8]] = &[&[0xB5], &[0x15, 0x0B, 0x01, 0x50]];

/// Fixed renegotiate reply sent when the head unit requests a session reset
/// mid-stream (length-3 frame with the high nibble of byte 0 set and a
/// `00 02` trailer)
pub const RENEGOTIATE: &[u8] = &[0x16, 0x01, 0x02];

/// Steady-state status query from the head unit
pub const STATUS_QUERY: &[u8] = &[0xA3, 0x00];

/// Look up the exchange step matching a received payload
pub fn find_step(payload: &[u8]) -> Option<&'static ExchangeStep> {
    EXCHANGE.iter().find(|step| step.expect == payload)
}
