//! Application events forwarded to the companion computer
//!
//! Events are rendered as newline-terminated ASCII lines over the console
//! UART; the companion's input daemon pattern-matches on the `NAVI_` tags.

use heapless::String;

use crate::buttons::NaviButton;

/// Maximum rendered line length (longest tag + state + newline)
pub const MAX_EVENT_LINE: usize = 24;

/// Active source selected on the head unit
///
/// Mutated only by the dispatcher on recognized mode-change frames; the
/// display overlay is applied only while the TV source is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceMode {
    #[default]
    None,
    Tv,
    Cd,
    Radio,
}

// Wire codes from the mode-select command's trailing byte
const MODE_CODE_TV: u8 = 0x37;
const MODE_CODE_CD: u8 = 0x38;
const MODE_CODE_RADIO: u8 = 0xA0;

impl SourceMode {
    /// Map a mode-select trailing byte to a source
    ///
    /// Unrecognized codes return `None` and leave the mode unchanged.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            MODE_CODE_TV => Some(SourceMode::Tv),
            MODE_CODE_CD => Some(SourceMode::Cd),
            MODE_CODE_RADIO => Some(SourceMode::Radio),
            _ => None,
        }
    }

    /// Console tag, e.g. `NAVI_TV`
    pub fn tag(&self) -> &'static str {
        match self {
            SourceMode::None => "NAVI_NONE",
            SourceMode::Tv => "NAVI_TV",
            SourceMode::Cd => "NAVI_CD",
            SourceMode::Radio => "NAVI_RADIO",
        }
    }
}

/// An application-level event produced by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NaviEvent {
    /// Navigation button press or release
    Button { button: NaviButton, pressed: bool },
    /// The head unit switched sources
    ModeChanged(SourceMode),
    /// Shutdown warning for the companion; repeated during the graceful
    /// power-down window
    PowerDownNotice,
}

impl NaviEvent {
    /// Render the event as a console line
    pub fn render(&self) -> String<MAX_EVENT_LINE> {
        let mut line = String::new();
        // The tags and states all fit MAX_EVENT_LINE; pushes cannot fail
        match self {
            NaviEvent::Button { button, pressed } => {
                let _ = line.push_str(button.tag());
                if button.reports_press_state() {
                    let _ = line.push_str(if *pressed { " 1" } else { " 0" });
                }
            }
            NaviEvent::ModeChanged(mode) => {
                let _ = line.push_str(mode.tag());
            }
            NaviEvent::PowerDownNotice => {
                let _ = line.push_str("NAVI_TURN_OFF");
            }
        }
        let _ = line.push('\n');
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_codes() {
        assert_eq!(SourceMode::from_code(0x37), Some(SourceMode::Tv));
        assert_eq!(SourceMode::from_code(0x38), Some(SourceMode::Cd));
        assert_eq!(SourceMode::from_code(0xA0), Some(SourceMode::Radio));
        assert_eq!(SourceMode::from_code(0x00), None);
        assert_eq!(SourceMode::from_code(0xFF), None);
    }

    #[test]
    fn test_button_line() {
        let event = NaviEvent::Button {
            button: NaviButton::Left,
            pressed: true,
        };
        assert_eq!(event.render().as_str(), "NAVI_LEFT 1\n");

        let event = NaviEvent::Button {
            button: NaviButton::ScrollPress,
            pressed: false,
        };
        assert_eq!(event.render().as_str(), "NAVI_SCROLL_PRESS 0\n");
    }

    #[test]
    fn test_scroll_ring_line_has_no_state() {
        // Detent events carry no press/release state on the wire
        let event = NaviEvent::Button {
            button: NaviButton::ScrollRight,
            pressed: true,
        };
        assert_eq!(event.render().as_str(), "NAVI_SCROLL_RIGHT\n");

        let event = NaviEvent::Button {
            button: NaviButton::ScrollLeft,
            pressed: false,
        };
        assert_eq!(event.render().as_str(), "NAVI_SCROLL_LEFT\n");
    }

    #[test]
    fn test_mode_line() {
        assert_eq!(
            NaviEvent::ModeChanged(SourceMode::Tv).render().as_str(),
            "NAVI_TV\n"
        );
    }

    #[test]
    fn test_power_down_line() {
        assert_eq!(NaviEvent::PowerDownNotice.render().as_str(), "NAVI_TURN_OFF\n");
    }

    #[test]
    fn test_longest_line_fits() {
        let event = NaviEvent::Button {
            button: NaviButton::ScrollPress,
            pressed: true,
        };
        assert!(event.render().len() <= MAX_EVENT_LINE);
    }
}
