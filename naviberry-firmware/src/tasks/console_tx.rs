//! Console UART transmit task
//!
//! Renders application events as newline-terminated ASCII lines for the
//! companion's input daemon.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::EVENT_CHANNEL;

/// Console TX task - forwards events to the companion
#[embassy_executor::task]
pub async fn console_tx_task(mut tx: BufferedUartTx) {
    info!("Console TX task started");

    loop {
        let event = EVENT_CHANNEL.receive().await;
        let line = event.render();

        if let Err(e) = tx.write_all(line.as_bytes()).await {
            warn!("Console write error: {:?}", e);
        }
    }
}
