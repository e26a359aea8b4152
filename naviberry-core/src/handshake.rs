//! Tuner handshake engine
//!
//! Drives the fixed exchange that establishes the gateway as the active
//! tuner source. The engine is a cursor over the exchange table in
//! `naviberry-protocol`: it consumes one received frame at a time and hands
//! back the replies owed for it. It never blocks and never touches the bus;
//! the bounded receive loop around it lives in the firmware.
//!
//! Re-entry after a failed attempt is always safe: `reset()` returns to the
//! initial state and the head unit keeps no partial session state across
//! attempts.

use heapless::Vec;

use naviberry_protocol::frame::CanFrame;
use naviberry_protocol::handshake as table;
use naviberry_protocol::ids::{NAVI_ID, TUNER_ID};

/// Replies owed for one consumed frame (at most two per exchange step)
pub type Replies = Vec<CanFrame, 2>;

/// Ordered steps of the exchange, named for what the engine waits on next
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeState {
    AwaitingCapabilityQuery,
    AwaitingReadyAck,
    AwaitingFeatureAck1,
    AwaitingFeatureAck2,
    AwaitingFeatureAck3,
    /// Two-phase: the feature probe arrives twice with different replies
    AwaitingFeatureAck4,
    Complete,
}

/// State machine for the tuner handshake
#[derive(Debug, Clone)]
pub struct HandshakeEngine {
    state: HandshakeState,
    /// First occurrence of the feature probe already answered
    probed: bool,
}

impl Default for HandshakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HandshakeEngine {
    /// Create an engine in the initial state
    pub fn new() -> Self {
        Self {
            state: HandshakeState::AwaitingCapabilityQuery,
            probed: false,
        }
    }

    /// Return to the initial state with no residue
    pub fn reset(&mut self) {
        self.state = HandshakeState::AwaitingCapabilityQuery;
        self.probed = false;
    }

    /// Current step
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Whether the terminal acknowledgment has been observed
    pub fn is_complete(&self) -> bool {
        self.state == HandshakeState::Complete
    }

    /// Announcement frame that opens every attempt
    pub fn announcement() -> Option<CanFrame> {
        tuner_reply(table::ANNOUNCE)
    }

    /// Consume one received frame
    ///
    /// Frames under other identifiers and payloads matching no predicate are
    /// ignored (empty reply set, no state change). The head unit repeats
    /// steps it considers unanswered, so out-of-order matches are answered
    /// from the table rather than rejected.
    pub fn feed(&mut self, frame: &CanFrame) -> Replies {
        let mut replies = Replies::new();

        if self.is_complete() || frame.id != NAVI_ID {
            return replies;
        }

        let payload = frame.data.as_slice();

        if payload == table::TERMINAL_ACK {
            self.state = HandshakeState::Complete;
            return replies;
        }

        if payload == table::PROBE_REQUEST {
            self.state = HandshakeState::AwaitingFeatureAck4;
            if self.probed {
                replies.extend(reply_frames(table::PROBE_SECOND_REPLIES));
            } else {
                self.probed = true;
                replies.extend(tuner_reply(table::PROBE_FIRST_REPLY));
            }
            return replies;
        }

        if let Some(index) = table::EXCHANGE.iter().position(|s| s.expect == payload) {
            replies.extend(reply_frames(table::EXCHANGE[index].replies));
            self.state = state_after_step(index);
        }

        replies
    }
}

/// State reached once the exchange step at `index` has been answered
fn state_after_step(index: usize) -> HandshakeState {
    match index {
        0 => HandshakeState::AwaitingReadyAck,
        1 => HandshakeState::AwaitingFeatureAck1,
        2 => HandshakeState::AwaitingFeatureAck2,
        3 => HandshakeState::AwaitingFeatureAck3,
        _ => HandshakeState::AwaitingFeatureAck4,
    }
}

/// Build a reply frame under the tuner identifier
///
/// Table payloads are static and within bounds, so this only ever returns
/// `None` if the table itself is malformed (covered by protocol tests).
fn tuner_reply(payload: &[u8]) -> Option<CanFrame> {
    CanFrame::standard(TUNER_ID, payload).ok()
}

fn reply_frames<'a>(payloads: &'a [&'a [u8]]) -> impl Iterator<Item = CanFrame> + 'a {
    payloads.iter().filter_map(|p| tuner_reply(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn navi(payload: &[u8]) -> CanFrame {
        CanFrame::standard(NAVI_ID, payload).unwrap()
    }

    fn payloads(replies: &Replies) -> heapless::Vec<&[u8], 2> {
        replies.iter().map(|f| f.data.as_slice()).collect()
    }

    #[test]
    fn test_full_exchange() {
        let mut engine = HandshakeEngine::new();
        assert_eq!(engine.state(), HandshakeState::AwaitingCapabilityQuery);

        // Capability query
        let replies = engine.feed(&navi(&[0xE0, 0x01, 0x00]));
        assert_eq!(
            payloads(&replies).as_slice(),
            &[
                &[0xA1, 0x01][..],
                &[0x10, 0x15, 0x01, 0x00, 0x01, 0x00, 0x00][..]
            ]
        );
        assert_eq!(engine.state(), HandshakeState::AwaitingReadyAck);

        // Ready acknowledgment
        let replies = engine.feed(&navi(&[0x10, 0x00, 0x01]));
        assert_eq!(
            payloads(&replies).as_slice(),
            &[&[0xB1][..], &[0x11, 0x01, 0x01][..]]
        );
        assert_eq!(engine.state(), HandshakeState::AwaitingFeatureAck1);

        // Feature blocks
        let replies = engine.feed(&navi(&[0x11, 0x08]));
        assert_eq!(
            payloads(&replies).as_slice(),
            &[
                &[0xB2][..],
                &[0x12, 0x09, 0x01, 0x42, 0x50, 0x63, 0x1E][..]
            ]
        );

        let replies = engine.feed(&navi(&[0x12, 0x22]));
        assert_eq!(
            payloads(&replies).as_slice(),
            &[&[0xB3][..], &[0x13, 0x23, 0x00][..]]
        );

        let replies = engine.feed(&navi(&[0x13, 0x26, 0xFF]));
        assert_eq!(payloads(&replies).as_slice(), &[&[0xB4][..]]);

        // Two-phase feature probe
        let replies = engine.feed(&navi(&[0x14, 0x50, 0x00]));
        assert_eq!(
            payloads(&replies).as_slice(),
            &[&[0x14, 0x0B, 0x01, 0x26][..]]
        );
        assert_eq!(engine.state(), HandshakeState::AwaitingFeatureAck4);

        let replies = engine.feed(&navi(&[0x14, 0x50, 0x00]));
        assert_eq!(
            payloads(&replies).as_slice(),
            &[&[0xB5][..], &[0x15, 0x0B, 0x01, 0x50][..]]
        );

        // Terminal acknowledgment
        let replies = engine.feed(&navi(&[0xB6]));
        assert!(replies.is_empty());
        assert!(engine.is_complete());
    }

    #[test]
    fn test_unmatched_frames_ignored() {
        let mut engine = HandshakeEngine::new();

        let replies = engine.feed(&navi(&[0x42, 0x42]));
        assert!(replies.is_empty());
        assert_eq!(engine.state(), HandshakeState::AwaitingCapabilityQuery);

        // Wrong identifier, even with a matching payload
        let other = CanFrame::standard(0x123, &[0xE0, 0x01, 0x00]).unwrap();
        let replies = engine.feed(&other);
        assert!(replies.is_empty());
        assert_eq!(engine.state(), HandshakeState::AwaitingCapabilityQuery);
    }

    #[test]
    fn test_reset_clears_probe_phase() {
        let mut engine = HandshakeEngine::new();

        // Answer the first probe occurrence, then abandon the attempt
        engine.feed(&navi(&[0x14, 0x50, 0x00]));
        engine.reset();
        assert_eq!(engine.state(), HandshakeState::AwaitingCapabilityQuery);

        // A fresh attempt must answer the probe with the first-phase reply
        let replies = engine.feed(&navi(&[0x14, 0x50, 0x00]));
        assert_eq!(
            payloads(&replies).as_slice(),
            &[&[0x14, 0x0B, 0x01, 0x26][..]]
        );
    }

    #[test]
    fn test_complete_engine_ignores_frames() {
        let mut engine = HandshakeEngine::new();
        engine.feed(&navi(&[0xB6]));
        assert!(engine.is_complete());

        let replies = engine.feed(&navi(&[0xE0, 0x01, 0x00]));
        assert!(replies.is_empty());
        assert!(engine.is_complete());
    }

    #[test]
    fn test_announcement() {
        let frame = HandshakeEngine::announcement().unwrap();
        assert_eq!(frame.id, TUNER_ID);
        assert_eq!(frame.data.as_slice(), &[0xA1, 0x01]);
    }
}
