//! Steady-state message dispatcher
//!
//! Once the handshake is complete, every received frame is processed exactly
//! once and produces zero or more reply frames plus at most one application
//! event. The dispatch key is the frame identifier; payload shape selects
//! the behaviour within an identifier. Frames outside the fixed identifier
//! set are ignored.

use heapless::Vec;

use naviberry_protocol::buttons::{ack_byte, is_pressed, NaviButton, ACK_BASE};
use naviberry_protocol::frame::CanFrame;
use naviberry_protocol::handshake::{ANNOUNCE, RENEGOTIATE, SESSION_END, STATUS_QUERY};
use naviberry_protocol::ids::{LCD_A_ID, LCD_B_ID, MODE_ID, NAVI_ID, TUNER_ID};
use naviberry_protocol::{DisplayField, NaviEvent, SourceMode};

use crate::overlay::DisplayOverlay;

/// Mode-select command prefix (bytes 0-2 of the 4-byte payload)
const MODE_PREFIX: [u8; 3] = [0x01, 0x01, 0x12];

/// What the main loop should do after a dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    /// Normal exchange; counts as bus liveness
    Continue,
    /// The head unit ended the session; run the handshake again
    Reinitialize,
    /// The head unit requested a renegotiation mid-stream. A reply was sent,
    /// but the cycle still counts against the failure budget (both effects
    /// are deliberate, matching the head unit's observed behaviour).
    Renegotiated,
}

/// Result of dispatching one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Frames to send back, in order
    pub replies: Vec<CanFrame, 2>,
    /// Application event to forward to the companion
    pub event: Option<NaviEvent>,
    /// Main-loop directive
    pub verdict: Verdict,
}

impl DispatchOutcome {
    fn empty() -> Self {
        Self {
            replies: Vec::new(),
            event: None,
            verdict: Verdict::Continue,
        }
    }
}

/// Steady-state frame dispatcher
///
/// Owns the current source mode; everything else it needs is passed in per
/// call.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    mode: SourceMode,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active source as last reported by the head unit
    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    /// Forget the source mode (called when a fresh handshake completes)
    pub fn reset(&mut self) {
        self.mode = SourceMode::None;
    }

    /// Process one received frame
    pub fn dispatch(&mut self, frame: &CanFrame, overlay: &DisplayOverlay) -> DispatchOutcome {
        match frame.id {
            NAVI_ID => self.dispatch_navi(frame),
            LCD_A_ID => self.dispatch_lcd(frame, overlay, DisplayField::A),
            LCD_B_ID => self.dispatch_lcd(frame, overlay, DisplayField::B),
            MODE_ID => self.dispatch_mode(frame),
            _ => DispatchOutcome::empty(),
        }
    }

    /// Frames from the navigation unit: buttons, status query, session
    /// control
    fn dispatch_navi(&mut self, frame: &CanFrame) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::empty();
        let payload = frame.data.as_slice();

        match payload.len() {
            // Button press/release, acknowledged unconditionally
            5 => {
                outcome.event = NaviButton::from_payload(payload).map(|button| {
                    NaviEvent::Button {
                        button,
                        pressed: is_pressed(payload),
                    }
                });
                push_reply(&mut outcome.replies, TUNER_ID, &[ack_byte(payload[0])]);
            }
            // Status query, answered with the ready announcement
            2 if payload == STATUS_QUERY => {
                push_reply(&mut outcome.replies, TUNER_ID, ANNOUNCE);
            }
            // Session end: the tuner source was dropped
            3 if payload == SESSION_END => {
                outcome.verdict = Verdict::Reinitialize;
            }
            // Renegotiation request: acknowledge, send the fixed renegotiate
            // frame, and report the cycle as unusable
            3 if payload[0] & 0x10 != 0 && payload[1] == 0x00 && payload[2] == 0x02 => {
                push_reply(
                    &mut outcome.replies,
                    TUNER_ID,
                    &[ACK_BASE + (payload[0] & 0x0F)],
                );
                push_reply(&mut outcome.replies, TUNER_ID, RENEGOTIATE);
                outcome.verdict = Verdict::Renegotiated;
            }
            _ => {}
        }

        outcome
    }

    /// Display text frames: overwritten and echoed while the TV source is
    /// active, passed through untouched otherwise
    fn dispatch_lcd(
        &self,
        frame: &CanFrame,
        overlay: &DisplayOverlay,
        field: DisplayField,
    ) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::empty();

        if frame.dlc() == 8 && self.mode == SourceMode::Tv {
            push_reply(&mut outcome.replies, frame.id, overlay.field(field));
        }

        outcome
    }

    /// Source mode-change command
    fn dispatch_mode(&mut self, frame: &CanFrame) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::empty();
        let payload = frame.data.as_slice();

        if payload.len() == 4 && payload[..3] == MODE_PREFIX {
            if let Some(mode) = SourceMode::from_code(payload[3]) {
                // Only an actual transition is observable
                if mode != self.mode {
                    self.mode = mode;
                    outcome.event = Some(NaviEvent::ModeChanged(mode));
                }
            }
        }

        outcome
    }
}

fn push_reply(replies: &mut Vec<CanFrame, 2>, id: u32, payload: &[u8]) {
    if let Ok(frame) = CanFrame::standard(id, payload) {
        let _ = replies.push(frame);
    }
}
