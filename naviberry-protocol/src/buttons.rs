//! Navigation button patterns and acknowledgments
//!
//! Button events arrive as 5-byte frames under the navigation identifier.
//! The low nibble of byte 0 carries a rolling sequence number, byte 2 the
//! press state; the button itself is identified by bytes 3 and 4 once the
//! leading bytes are normalised to `00 00 01`.
//!
//! Every 5-byte frame is acknowledged with a single byte derived from the
//! sequence nibble, recognised button or not - the head unit stops sending
//! events if acknowledgments go missing.

/// Base of the acknowledgment code range
pub const ACK_BASE: u8 = 0xB0;

/// Top of the acknowledgment code range; codes wrap back to [`ACK_BASE`]
pub const ACK_MAX: u8 = 0xBF;

/// Named navigation buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NaviButton {
    Left,
    Up,
    Right,
    Down,
    /// Map zoom in ("+")
    ZoomIn,
    /// Map zoom out ("-")
    ZoomOut,
    Mode,
    Return,
    ScrollRight,
    ScrollLeft,
    ScrollPress,
    /// Auxiliary "AS" (autosound) button
    Autosound,
}

/// Button discriminants: (byte 3, byte 4) of the normalised payload
const PATTERNS: &[(u8, u8, NaviButton)] = &[
    (0x01, 0x00, NaviButton::Left),
    (0x02, 0x00, NaviButton::Up),
    (0x03, 0x00, NaviButton::Right),
    (0x20, 0x00, NaviButton::Down),
    (0x00, 0x20, NaviButton::ZoomIn),
    (0x00, 0x01, NaviButton::ZoomOut),
    (0x00, 0x03, NaviButton::Mode),
    (0x00, 0x50, NaviButton::Return),
    (0x01, 0xFF, NaviButton::ScrollRight),
    (0x00, 0xFF, NaviButton::ScrollLeft),
    (0x00, 0x05, NaviButton::ScrollPress),
    (0x04, 0x00, NaviButton::Autosound),
];

impl NaviButton {
    /// Decode a button from a 5-byte navigation payload
    ///
    /// Returns `None` for payloads of the wrong length or with unknown
    /// trailing bytes. The acknowledgment is owed either way; see
    /// [`ack_byte`].
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        if payload.len() != 5 {
            return None;
        }
        PATTERNS
            .iter()
            .find(|(b3, b4, _)| *b3 == payload[3] && *b4 == payload[4])
            .map(|(_, _, button)| *button)
    }

    /// Whether the companion line carries a press/release state
    ///
    /// The scroll ring detents are edge events with no release, so their
    /// lines have no state suffix.
    pub fn reports_press_state(&self) -> bool {
        !matches!(self, NaviButton::ScrollRight | NaviButton::ScrollLeft)
    }

    /// Console tag for the companion line protocol, e.g. `NAVI_LEFT`
    pub fn tag(&self) -> &'static str {
        match self {
            NaviButton::Left => "NAVI_LEFT",
            NaviButton::Up => "NAVI_UP",
            NaviButton::Right => "NAVI_RIGHT",
            NaviButton::Down => "NAVI_DOWN",
            NaviButton::ZoomIn => "NAVI_PLUS",
            NaviButton::ZoomOut => "NAVI_MINUS",
            NaviButton::Mode => "NAVI_MODE",
            NaviButton::Return => "NAVI_RETURN",
            NaviButton::ScrollRight => "NAVI_SCROLL_RIGHT",
            NaviButton::ScrollLeft => "NAVI_SCROLL_LEFT",
            NaviButton::ScrollPress => "NAVI_SCROLL_PRESS",
            NaviButton::Autosound => "NAVI_AS",
        }
    }
}

/// Compute the acknowledgment byte for a button frame
///
/// `0xB0 + sequence nibble + 1`, wrapping back to `0xB0` past `0xBF`.
pub fn ack_byte(first_byte: u8) -> u8 {
    let code = ACK_BASE + (first_byte & 0x0F) + 1;
    if code > ACK_MAX {
        ACK_BASE
    } else {
        code
    }
}

/// Whether a 5-byte payload reports a press (as opposed to a release)
pub fn is_pressed(payload: &[u8]) -> bool {
    payload.get(2) == Some(&1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_all_patterns_decode() {
        let cases = [
            ([0x00, 0x00, 0x01, 0x01, 0x00], NaviButton::Left),
            ([0x00, 0x00, 0x01, 0x02, 0x00], NaviButton::Up),
            ([0x00, 0x00, 0x01, 0x03, 0x00], NaviButton::Right),
            ([0x00, 0x00, 0x01, 0x20, 0x00], NaviButton::Down),
            ([0x00, 0x00, 0x01, 0x00, 0x20], NaviButton::ZoomIn),
            ([0x00, 0x00, 0x01, 0x00, 0x01], NaviButton::ZoomOut),
            ([0x00, 0x00, 0x01, 0x00, 0x03], NaviButton::Mode),
            ([0x00, 0x00, 0x01, 0x00, 0x50], NaviButton::Return),
            ([0x00, 0x00, 0x01, 0x01, 0xFF], NaviButton::ScrollRight),
            ([0x00, 0x00, 0x01, 0x00, 0xFF], NaviButton::ScrollLeft),
            ([0x00, 0x00, 0x01, 0x00, 0x05], NaviButton::ScrollPress),
            ([0x00, 0x00, 0x01, 0x04, 0x00], NaviButton::Autosound),
        ];

        for (payload, expected) in cases {
            assert_eq!(NaviButton::from_payload(&payload), Some(expected));
        }
    }

    #[test]
    fn test_sequence_nibble_does_not_affect_decode() {
        // The rolling sequence lives in the low nibble of byte 0
        assert_eq!(
            NaviButton::from_payload(&[0x07, 0x00, 0x01, 0x02, 0x00]),
            Some(NaviButton::Up)
        );
    }

    #[test]
    fn test_unknown_pattern() {
        assert_eq!(NaviButton::from_payload(&[0x00, 0x00, 0x01, 0x77, 0x77]), None);
        assert_eq!(NaviButton::from_payload(&[0x00, 0x00, 0x01]), None);
    }

    #[test]
    fn test_ack_byte_values() {
        assert_eq!(ack_byte(0x00), 0xB1);
        assert_eq!(ack_byte(0x05), 0xB6);
        assert_eq!(ack_byte(0x0E), 0xBF);
        // Nibble 0xF computes 0xC0 and wraps to the base
        assert_eq!(ack_byte(0x0F), 0xB0);
        // High nibble is masked off
        assert_eq!(ack_byte(0xA3), 0xB4);
    }

    #[test]
    fn test_scroll_ring_has_no_press_state() {
        assert!(!NaviButton::ScrollRight.reports_press_state());
        assert!(!NaviButton::ScrollLeft.reports_press_state());
        // The ring's push button is a regular press/release button
        assert!(NaviButton::ScrollPress.reports_press_state());
        assert!(NaviButton::Left.reports_press_state());
    }

    #[test]
    fn test_is_pressed() {
        assert!(is_pressed(&[0x00, 0x00, 0x01, 0x02, 0x00]));
        assert!(!is_pressed(&[0x00, 0x00, 0x00, 0x02, 0x00]));
    }

    proptest! {
        #[test]
        fn ack_byte_stays_in_range(byte in any::<u8>()) {
            let code = ack_byte(byte);
            prop_assert!((ACK_BASE..=ACK_MAX).contains(&code));
        }

        #[test]
        fn ack_byte_ignores_high_nibble(byte in any::<u8>()) {
            prop_assert_eq!(ack_byte(byte), ack_byte(byte & 0x0F));
        }
    }
}
