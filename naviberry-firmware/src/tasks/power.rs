//! Companion power rail task
//!
//! Sole owner of the rail control pin. Both the gateway task and the
//! watchdog tick task order transitions through the [`POWER_CMD`] signal;
//! only the latest command matters.

use defmt::*;
use embassy_rp::gpio::Output;

use naviberry_core::PowerState;

use crate::channels::POWER_CMD;

/// Power task - drives the companion power rail pin
#[embassy_executor::task]
pub async fn power_task(mut rail: Output<'static>) {
    info!("Power task started");

    loop {
        match POWER_CMD.wait().await {
            PowerState::On => {
                info!("Companion power rail on");
                rail.set_high();
            }
            PowerState::Off => {
                info!("Companion power rail off");
                rail.set_low();
            }
        }
    }
}
