//! Watchdog tick task
//!
//! Advances the inactivity watchdog on a fixed period. The gateway task
//! feeds the counter whenever the bus shows life; if it stops for the full
//! timeout, companion power is cut and a re-handshake is ordered.

use defmt::*;
use embassy_time::{Duration, Ticker};

use naviberry_core::{GatewayConfig, PowerState};

use crate::channels::{POWER_CMD, REHANDSHAKE, WATCHDOG};

/// Tick task - advances the watchdog and acts on expiry
#[embassy_executor::task]
pub async fn tick_task(config: GatewayConfig) {
    info!("Tick task started");

    let mut ticker = Ticker::every(Duration::from_millis(config.watchdog_tick_ms as u64));

    loop {
        ticker.next().await;

        if WATCHDOG.tick(config.watchdog_timeout_ticks) {
            warn!("Inactivity watchdog expired, cutting companion power");
            POWER_CMD.signal(PowerState::Off);
            REHANDSHAKE.request();
        }
    }
}
