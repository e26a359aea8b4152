//! Board-agnostic core logic for the Naviberry gateway
//!
//! This crate contains all gateway logic that does not depend on specific
//! hardware:
//!
//! - Tuner handshake engine (state machine over the exchange table)
//! - Steady-state message dispatcher
//! - Power and failure controller
//! - Watchdog cell shared with the periodic tick context
//! - Display text overlay
//! - Timing constants
//!
//! All of it runs on the host for testing; the firmware crate supplies the
//! bus, the clock and the pins.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod handshake;
pub mod overlay;
pub mod power;

pub use config::GatewayConfig;
pub use dispatch::{DispatchOutcome, Dispatcher, Verdict};
pub use handshake::{HandshakeEngine, HandshakeState};
pub use overlay::DisplayOverlay;
pub use power::{
    PowerAction, PowerController, PowerState, ResetFlag, ShutdownSequence, WatchdogCell,
};
