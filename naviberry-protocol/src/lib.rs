//! Head Unit Tuner-Emulation Protocol
//!
//! This crate defines the CAN-level protocol between the navigation head
//! unit and the emulated radio/TV tuner, plus the UART line protocol spoken
//! with the Raspberry Pi companion. Everything here is pure data: frame
//! shapes, identifiers, exchange tables and event formatting. No hardware,
//! no timing.
//!
//! # Bus message catalog
//!
//! | Identifier | Role |
//! |---|---|
//! | `0x264` | Outgoing replies, sent while impersonating the tuner |
//! | `0x464` | Incoming requests/events from the navigation unit |
//! | `0x341` | Display text field A, overwritten and echoed in TV mode |
//! | `0x342` | Display text field B, overwritten and echoed in TV mode |
//! | `0x35E` | Incoming source mode-change command |

#![no_std]
#![deny(unsafe_code)]

pub mod buttons;
pub mod console;
pub mod events;
pub mod frame;
pub mod handshake;
pub mod ids;

pub use buttons::{ack_byte, NaviButton, ACK_BASE, ACK_MAX};
pub use console::{parse_line, DisplayField, FIELD_LEN, MAX_LINE_LEN, MIN_LINE_LEN};
pub use events::{NaviEvent, SourceMode};
pub use frame::{CanFrame, FrameError, MAX_DATA_LEN};
