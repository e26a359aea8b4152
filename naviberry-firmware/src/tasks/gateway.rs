//! Gateway task
//!
//! The heart of the firmware: drives the tuner handshake, dispatches
//! steady-state traffic, and runs both fail-safes (the consecutive-failure
//! budget here, the inactivity watchdog via the tick task).

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::{Duration, Timer};
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};

use naviberry_core::{
    Dispatcher, DisplayOverlay, GatewayConfig, HandshakeEngine, PowerAction, PowerController,
    PowerState, ShutdownSequence, Verdict,
};
use naviberry_drivers::can::{receive_with_timeout, Bitrate, Mcp2515, StaticFilters};
use naviberry_protocol::NaviEvent;

use crate::channels::{EVENT_CHANNEL, OVERLAY_CHANNEL, POWER_CMD, REHANDSHAKE, WATCHDOG};

/// CAN controller on SPI0 behind an exclusive-device wrapper
pub type CanBus = Mcp2515<ExclusiveDevice<Spi<'static, SPI0, Blocking>, Output<'static>, NoDelay>>;

/// Gateway task - handshake, dispatch, and power decisions
#[embassy_executor::task]
pub async fn gateway_task(mut can: CanBus, config: GatewayConfig) {
    info!("Gateway task started");

    // Bring the controller up; filters are set once and never touched again
    let filters = StaticFilters::default();
    while let Err(e) = can.init(Bitrate::Kbps100, &filters) {
        error!("CAN controller init failed: {:?}", e);
        Timer::after_secs(1).await;
    }
    info!("CAN controller up at 100 kbps");

    let mut engine = HandshakeEngine::new();
    let mut dispatcher = Dispatcher::new();
    let mut power = PowerController::new(config.max_silent_cycles);
    let mut overlay = DisplayOverlay::default();

    let receive_timeout = Duration::from_millis(config.receive_timeout_ms as u64);
    let poll_interval = Duration::from_millis(config.receive_poll_ms as u64);

    loop {
        if REHANDSHAKE.take() {
            warn!("Watchdog ordered a re-handshake");
            engine.reset();
            power.power_off();
        }

        // Apply any display text the companion pushed since last cycle
        while let Ok((field, text)) = OVERLAY_CHANNEL.try_receive() {
            overlay.set(field, text);
        }

        if !engine.is_complete() {
            if run_handshake(&mut can, &mut engine, receive_timeout, poll_interval).await {
                info!("Handshake complete, powering companion");
                dispatcher.reset();
                power.handshake_complete();
                WATCHDOG.feed();
                POWER_CMD.signal(PowerState::On);
            } else {
                engine.reset();
                // Attempts while the companion is running count against its
                // failure budget; attempts before first power-up do not
                if power.is_on()
                    && power.record_silence() == PowerAction::GracefulShutdown
                {
                    shutdown_companion(&mut power, &config).await;
                }
                Timer::after(Duration::from_millis(config.handshake_retry_ms as u64)).await;
            }
            continue;
        }

        match receive_with_timeout(&mut can, receive_timeout, poll_interval).await {
            Some(frame) => {
                // Any frame at all proves the bus is alive
                WATCHDOG.feed();

                let outcome = dispatcher.dispatch(&frame, &overlay);

                for reply in &outcome.replies {
                    if let Err(e) = can.send(reply) {
                        warn!("CAN send failed: {:?}", e);
                    }
                }

                if let Some(event) = outcome.event {
                    forward_event(event);
                }

                match outcome.verdict {
                    Verdict::Continue => {
                        power.record_exchange();
                    }
                    Verdict::Reinitialize => {
                        info!("Session ended by head unit, restarting handshake");
                        engine.reset();
                        power.record_exchange();
                    }
                    Verdict::Renegotiated => {
                        warn!("Head unit requested renegotiation");
                        if power.record_silence() == PowerAction::GracefulShutdown {
                            shutdown_companion(&mut power, &config).await;
                            engine.reset();
                        }
                    }
                }
            }
            None => {
                warn!(
                    "Bus silent for the full receive window ({} consecutive)",
                    power.silent_cycles() + 1
                );
                if power.record_silence() == PowerAction::GracefulShutdown {
                    shutdown_companion(&mut power, &config).await;
                    engine.reset();
                }
            }
        }
    }
}

/// Run one handshake attempt to completion
///
/// Opens with the announcement, then answers the head unit frame by frame
/// until the terminal acknowledgment lands. Returns false if any single
/// receive exceeds its bound.
async fn run_handshake(
    can: &mut CanBus,
    engine: &mut HandshakeEngine,
    receive_timeout: Duration,
    poll_interval: Duration,
) -> bool {
    if let Some(frame) = HandshakeEngine::announcement() {
        if let Err(e) = can.send(&frame) {
            warn!("Announcement send failed: {:?}", e);
            return false;
        }
    }

    while !engine.is_complete() {
        let Some(frame) = receive_with_timeout(can, receive_timeout, poll_interval).await else {
            warn!("Handshake timed out waiting in {:?}", engine.state());
            return false;
        };

        for reply in engine.feed(&frame) {
            if let Err(e) = can.send(&reply) {
                warn!("Handshake reply send failed: {:?}", e);
            }
        }
    }

    true
}

/// Emit the shutdown notice cadence, then order the rail off
async fn shutdown_companion(power: &mut PowerController, config: &GatewayConfig) {
    warn!("Failure budget exceeded, shutting companion down");

    let mut notices = ShutdownSequence::new(config.shutdown_notice_count);
    while let Some(event) = notices.next_notice() {
        forward_event(event);
        Timer::after(Duration::from_millis(config.shutdown_notice_ms as u64)).await;
    }

    power.power_off();
    POWER_CMD.signal(PowerState::Off);
}

fn forward_event(event: NaviEvent) {
    if EVENT_CHANNEL.try_send(event).is_err() {
        warn!("Event channel full, dropping event");
    }
}
