//! Bus identifiers used by the tuner-emulation protocol
//!
//! The gateway only ever speaks under the tuner identifier and only acts on
//! the four incoming identifiers below. Everything else on the bus is
//! filtered out or ignored.

/// Outgoing replies, sent while impersonating the factory tuner
pub const TUNER_ID: u32 = 0x264;

/// Incoming requests and button events from the navigation head unit
pub const NAVI_ID: u32 = 0x464;

/// Display text field A (8 ASCII characters)
pub const LCD_A_ID: u32 = 0x341;

/// Display text field B (8 ASCII characters)
pub const LCD_B_ID: u32 = 0x342;

/// Source mode-change command from the head unit
pub const MODE_ID: u32 = 0x35E;
