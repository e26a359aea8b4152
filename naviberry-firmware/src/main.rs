//! Naviberry - CAN tuner-emulation gateway firmware
//!
//! Main firmware binary for RP2040-based gateway boards. Impersonates the
//! factory radio/TV tuner on the vehicle CAN bus so the navigation head
//! unit completes its handshake, forwards button and mode events to a
//! Raspberry Pi companion over UART, and manages the companion's power
//! rail with a graceful-shutdown window.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::{Config as SpiConfig, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embedded_hal_bus::spi::ExclusiveDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use naviberry_core::GatewayConfig;
use naviberry_drivers::can::Mcp2515;

mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Console baud rate expected by the companion's input daemon
const CONSOLE_BAUD: u32 = 19_200;

/// MCP2515 SPI clock; the chip tops out at 10 MHz
const CAN_SPI_HZ: u32 = 8_000_000;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Naviberry firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = GatewayConfig::default();

    // Setup SPI0 to the MCP2515 CAN controller
    // Pin assignments are board-specific (CLK=GPIO18, MOSI=GPIO19,
    // MISO=GPIO16, CS=GPIO17)
    let mut spi_config = SpiConfig::default();
    spi_config.frequency = CAN_SPI_HZ;
    let spi = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let spi_device = ExclusiveDevice::new_no_delay(spi, cs).unwrap();
    let can = Mcp2515::new(spi_device);

    info!("SPI initialized for CAN controller");

    // Setup UART for companion communication (TX=GPIO0, RX=GPIO1)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = CONSOLE_BAUD;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("Console UART initialized at {} baud", CONSOLE_BAUD);

    // Companion power rail (GPIO22), held off until the handshake completes
    let rail = Output::new(p.PIN_22, Level::Low);

    // Spawn tasks
    spawner.spawn(tasks::tick_task(config)).unwrap();
    spawner.spawn(tasks::power_task(rail)).unwrap();
    spawner.spawn(tasks::console_rx_task(rx)).unwrap();
    spawner.spawn(tasks::console_tx_task(tx)).unwrap();
    spawner.spawn(tasks::gateway_task(can, config)).unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
