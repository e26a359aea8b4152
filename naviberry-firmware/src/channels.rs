//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication; the watchdog
//! counter and re-handshake flag are lock-free atomics shared with the
//! periodic tick task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use naviberry_core::{PowerState, ResetFlag, WatchdogCell};
use naviberry_protocol::{DisplayField, NaviEvent};

/// Channel capacity for events bound for the companion console
const EVENT_CHANNEL_SIZE: usize = 8;

/// Channel capacity for display text updates from the companion
const OVERLAY_CHANNEL_SIZE: usize = 2;

/// Application events to be rendered on the console UART
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, NaviEvent, EVENT_CHANNEL_SIZE> =
    Channel::new();

/// Display overlay text updates parsed from the console UART
pub static OVERLAY_CHANNEL: Channel<
    CriticalSectionRawMutex,
    (DisplayField, [u8; 8]),
    OVERLAY_CHANNEL_SIZE,
> = Channel::new();

/// Companion power rail command (latest state wins)
pub static POWER_CMD: Signal<CriticalSectionRawMutex, PowerState> = Signal::new();

/// Inactivity watchdog, ticked by the tick task and fed by the gateway
pub static WATCHDOG: WatchdogCell = WatchdogCell::new();

/// Watchdog-ordered re-handshake, consumed by the gateway loop
pub static REHANDSHAKE: ResetFlag = ResetFlag::new();
