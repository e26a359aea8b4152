//! Bounded-poll receive on top of the controller
//!
//! The MCP2515 interrupt line is not wired on this board, so reception is
//! polled. `receive_with_timeout` keeps the poll cadence gentle enough that
//! other tasks run between attempts while still bounding how long a caller
//! waits for the bus to produce a frame.

use embassy_time::{Duration, Instant, Timer};
use embedded_hal::spi::SpiDevice;

use naviberry_protocol::frame::CanFrame;

use super::mcp2515::Mcp2515;

/// Poll for one frame, checking every `poll_interval` up to `timeout`
///
/// Returns `None` when the bound expires without a frame. SPI transfer
/// errors are treated as "nothing received yet"; a persistently broken bus
/// therefore surfaces as a timeout rather than a hard error, which is what
/// the handshake retry logic wants.
pub async fn receive_with_timeout<SPI: SpiDevice<u8>>(
    can: &mut Mcp2515<SPI>,
    timeout: Duration,
    poll_interval: Duration,
) -> Option<CanFrame> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(Some(frame)) = can.try_receive() {
            return Some(frame);
        }
        if Instant::now() >= deadline {
            return None;
        }
        Timer::after(poll_interval).await;
    }
}
