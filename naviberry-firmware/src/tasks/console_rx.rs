//! Console UART receive task
//!
//! Accumulates NUL-terminated lines from the companion and turns well-formed
//! `LCD_A:`/`LCD_B:` lines into overlay updates for the gateway.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;
use heapless::Vec;

use naviberry_protocol::{parse_line, MAX_LINE_LEN};

use crate::channels::OVERLAY_CHANNEL;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

/// Console RX task - parses display field updates from the companion
#[embassy_executor::task]
pub async fn console_rx_task(mut rx: BufferedUartRx) {
    info!("Console RX task started");

    let mut line: Vec<u8, MAX_LINE_LEN> = Vec::new();
    let mut overflowed = false;
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                for &byte in &buf[..n] {
                    if byte == 0 {
                        handle_line(&line, overflowed);
                        line.clear();
                        overflowed = false;
                    } else if line.push(byte).is_err() {
                        // Longer than any valid command: drop the rest of
                        // the line, resync on the next NUL
                        overflowed = true;
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("Console read error: {:?}", e);
            }
        }
    }
}

/// Handle one complete line (terminating NUL already stripped)
fn handle_line(line: &[u8], overflowed: bool) {
    if overflowed {
        warn!("Console line too long, discarded");
        return;
    }
    if line.is_empty() {
        return;
    }

    match parse_line(line) {
        Some((field, text)) => {
            debug!("Display field {:?} update", field);
            if OVERLAY_CHANNEL.try_send((field, text)).is_err() {
                warn!("Overlay channel full, dropping update");
            }
        }
        None => {
            warn!("Unrecognized console line ({} bytes)", line.len());
        }
    }
}
