//! MCP2515 standalone CAN controller (SPI)
//!
//! Register-level driver for the MCP2515 with a 16 MHz crystal. The chip
//! holds two receive buffers fed through two acceptance filter groups and
//! three transmit buffers.
//!
//! # SPI protocol
//!
//! Every access is one chip-select transaction starting with an instruction
//! byte: RESET, READ/WRITE (register address follows), READ STATUS (polled
//! flags), READ RX BUFFER (13-byte burst, clears the receive flag on
//! deselect) and RTS (request-to-send for one transmit buffer).

use embedded_hal::spi::{Operation, SpiDevice};

use naviberry_protocol::frame::{CanFrame, MAX_DATA_LEN};

/// SPI instruction set
mod cmd {
    pub const RESET: u8 = 0xC0;
    pub const READ: u8 = 0x03;
    pub const WRITE: u8 = 0x02;
    pub const READ_STATUS: u8 = 0xA0;
    pub const BIT_MODIFY: u8 = 0x05;
    /// Base of the request-to-send instructions; OR the TX buffer bit in
    pub const RTS: u8 = 0x80;
    /// Burst-read RXB0 starting at RXB0SIDH
    pub const READ_RX0: u8 = 0x90;
    /// Burst-read RXB1 starting at RXB1SIDH
    pub const READ_RX1: u8 = 0x94;
}

/// Register addresses
mod reg {
    /// Acceptance filters, group 0 (RXB0)
    pub const RXF0SIDH: u8 = 0x00;
    pub const RXF1SIDH: u8 = 0x04;
    /// Acceptance filters, group 1 (RXB1)
    pub const RXF2SIDH: u8 = 0x08;
    pub const RXF3SIDH: u8 = 0x10;
    pub const RXF4SIDH: u8 = 0x14;
    pub const RXF5SIDH: u8 = 0x18;
    /// Acceptance masks
    pub const RXM0SIDH: u8 = 0x20;
    pub const RXM1SIDH: u8 = 0x24;
    /// Bit timing, descending addresses
    pub const CNF3: u8 = 0x28;
    /// Interrupt enables
    pub const CANINTE: u8 = 0x2B;
    /// Mode control and status
    pub const CANSTAT: u8 = 0x0E;
    pub const CANCTRL: u8 = 0x0F;
    /// Buffer control; SIDH follows at +1
    pub const TXB_CTRL: [u8; 3] = [0x30, 0x40, 0x50];
    pub const RXB0CTRL: u8 = 0x60;
    pub const RXB1CTRL: u8 = 0x70;
}

/// CANCTRL request-mode values (bits 7-5)
const MODE_NORMAL: u8 = 0x00;
const MODE_CONFIG: u8 = 0x80;
const MODE_MASK: u8 = 0xE0;

/// SIDL flag bits
const SIDL_EXIDE: u8 = 0x08;
const SIDL_SRR: u8 = 0x10;

/// DLC register RTR flag
const DLC_RTR: u8 = 0x40;

/// READ STATUS flag bits
const STAT_RX0IF: u8 = 0x01;
const STAT_RX1IF: u8 = 0x02;
/// TXREQ bits for the three transmit buffers
const STAT_TXREQ: [u8; 3] = [0x04, 0x10, 0x40];

/// CANINTE: enable both receive interrupts
const INT_RX: u8 = 0x03;

/// RXB0CTRL: roll received frames over into RXB1 when RXB0 is full
const RXB0_BUKT: u8 = 0x04;

/// Attempts to observe a requested mode change before giving up
const MODE_POLL_LIMIT: u8 = 10;

/// Supported bit rates (16 MHz crystal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bitrate {
    Kbps100,
    Kbps125,
    Kbps250,
    Kbps500,
}

impl Bitrate {
    /// (CNF1, CNF2, CNF3) for a 16 MHz crystal
    fn cnf(&self) -> (u8, u8, u8) {
        match self {
            Bitrate::Kbps100 => (0x03, 0xFA, 0x87),
            Bitrate::Kbps125 => (0x03, 0xF0, 0x86),
            Bitrate::Kbps250 => (0x41, 0xF1, 0x85),
            Bitrate::Kbps500 => (0x00, 0xF0, 0x86),
        }
    }
}

/// One acceptance filter group: N filters sharing one mask
///
/// A mask of zero accepts every identifier in the group.
#[derive(Debug, Clone, Copy)]
pub struct FilterGroup<const N: usize> {
    pub ids: [u32; N],
    pub mask: u32,
}

impl<const N: usize> Default for FilterGroup<N> {
    fn default() -> Self {
        Self {
            ids: [0; N],
            mask: 0,
        }
    }
}

/// Static acceptance filter layout, installed once at startup
///
/// Group 0 (two filters, mask 0) matches standard 11-bit identifiers;
/// group 1 (four filters, mask 1) matches extended 29-bit identifiers.
/// The default accepts all traffic in both groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticFilters {
    pub standard: FilterGroup<2>,
    pub extended: FilterGroup<4>,
}

/// Driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mcp2515Error<E> {
    /// SPI transfer failed
    Spi(E),
    /// The controller did not confirm a requested mode change
    ModeChange,
    /// All three transmit buffers are pending; not retried at this layer
    TxBusy,
}

/// MCP2515 driver over an `embedded-hal` SPI device
pub struct Mcp2515<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice<u8>> Mcp2515<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Reset the controller, program bit timing and acceptance filters,
    /// and enter normal mode
    pub fn init(
        &mut self,
        bitrate: Bitrate,
        filters: &StaticFilters,
    ) -> Result<(), Mcp2515Error<SPI::Error>> {
        self.spi
            .write(&[cmd::RESET])
            .map_err(Mcp2515Error::Spi)?;

        // Reset lands in configuration mode; wait for it to be reported
        self.wait_for_mode(MODE_CONFIG)?;

        let (cnf1, cnf2, cnf3) = bitrate.cnf();
        // CNF3..CNF1 occupy ascending addresses
        self.write_registers(reg::CNF3, &[cnf3, cnf2, cnf1])?;

        self.write_register(reg::CANINTE, INT_RX)?;
        self.write_register(reg::RXB0CTRL, RXB0_BUKT)?;
        self.write_register(reg::RXB1CTRL, 0x00)?;

        self.load_filters(filters)?;

        // Only touch the mode bits; leave clock-out configuration alone
        self.bit_modify(reg::CANCTRL, MODE_MASK, MODE_NORMAL)?;
        self.wait_for_mode(MODE_NORMAL)
    }

    /// Fetch one pending frame, if any; never blocks
    pub fn try_receive(&mut self) -> Result<Option<CanFrame>, Mcp2515Error<SPI::Error>> {
        let status = self.read_status()?;

        let read_cmd = if status & STAT_RX0IF != 0 {
            cmd::READ_RX0
        } else if status & STAT_RX1IF != 0 {
            cmd::READ_RX1
        } else {
            return Ok(None);
        };

        let mut buf = [0u8; 13];
        self.spi
            .transaction(&mut [Operation::Write(&[read_cmd]), Operation::Read(&mut buf)])
            .map_err(Mcp2515Error::Spi)?;

        Ok(decode_rx_buffer(&buf))
    }

    /// Load one frame into a free transmit buffer and request transmission
    ///
    /// Fails with [`Mcp2515Error::TxBusy`] when all three buffers are
    /// pending; the caller decides whether the frame is worth retrying.
    pub fn send(&mut self, frame: &CanFrame) -> Result<(), Mcp2515Error<SPI::Error>> {
        let status = self.read_status()?;
        let index = STAT_TXREQ
            .iter()
            .position(|bit| status & bit == 0)
            .ok_or(Mcp2515Error::TxBusy)?;

        let mut buf = [0u8; 13];
        let id = encode_id(frame.id, frame.extended);
        buf[..4].copy_from_slice(&id);
        buf[4] = frame.dlc() as u8 | if frame.rtr { DLC_RTR } else { 0 };
        buf[5..5 + frame.dlc()].copy_from_slice(&frame.data);

        // TXBnSIDH sits one past the buffer control register
        self.write_registers(reg::TXB_CTRL[index] + 1, &buf[..5 + frame.dlc()])?;
        self.spi
            .write(&[cmd::RTS | (1 << index)])
            .map_err(Mcp2515Error::Spi)
    }

    fn load_filters(&mut self, filters: &StaticFilters) -> Result<(), Mcp2515Error<SPI::Error>> {
        // Group 0: standard identifiers into RXB0
        self.write_registers(reg::RXF0SIDH, &encode_id(filters.standard.ids[0], false))?;
        self.write_registers(reg::RXF1SIDH, &encode_id(filters.standard.ids[1], false))?;
        self.write_registers(reg::RXM0SIDH, &encode_id(filters.standard.mask, false))?;

        // Group 1: extended identifiers into RXB1
        let ext = &filters.extended;
        for (addr, id) in [
            (reg::RXF2SIDH, ext.ids[0]),
            (reg::RXF3SIDH, ext.ids[1]),
            (reg::RXF4SIDH, ext.ids[2]),
            (reg::RXF5SIDH, ext.ids[3]),
        ] {
            self.write_registers(addr, &encode_id(id, true))?;
        }
        self.write_registers(reg::RXM1SIDH, &encode_id(ext.mask, true))
    }

    fn wait_for_mode(&mut self, mode: u8) -> Result<(), Mcp2515Error<SPI::Error>> {
        for _ in 0..MODE_POLL_LIMIT {
            if self.read_register(reg::CANSTAT)? & MODE_MASK == mode {
                return Ok(());
            }
        }
        Err(Mcp2515Error::ModeChange)
    }

    fn read_status(&mut self) -> Result<u8, Mcp2515Error<SPI::Error>> {
        let mut buf = [0u8; 1];
        self.spi
            .transaction(&mut [
                Operation::Write(&[cmd::READ_STATUS]),
                Operation::Read(&mut buf),
            ])
            .map_err(Mcp2515Error::Spi)?;
        Ok(buf[0])
    }

    fn read_register(&mut self, addr: u8) -> Result<u8, Mcp2515Error<SPI::Error>> {
        let mut buf = [0u8; 1];
        self.spi
            .transaction(&mut [
                Operation::Write(&[cmd::READ, addr]),
                Operation::Read(&mut buf),
            ])
            .map_err(Mcp2515Error::Spi)?;
        Ok(buf[0])
    }

    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Mcp2515Error<SPI::Error>> {
        self.spi
            .write(&[cmd::WRITE, addr, value])
            .map_err(Mcp2515Error::Spi)
    }

    /// Sequential write starting at `addr` (the chip auto-increments)
    fn write_registers(&mut self, addr: u8, values: &[u8]) -> Result<(), Mcp2515Error<SPI::Error>> {
        self.spi
            .transaction(&mut [
                Operation::Write(&[cmd::WRITE, addr]),
                Operation::Write(values),
            ])
            .map_err(Mcp2515Error::Spi)
    }

    /// Read-modify-write of masked register bits in one instruction
    fn bit_modify(&mut self, addr: u8, mask: u8, value: u8) -> Result<(), Mcp2515Error<SPI::Error>> {
        self.spi
            .write(&[cmd::BIT_MODIFY, addr, mask, value])
            .map_err(Mcp2515Error::Spi)
    }
}

/// Encode an identifier into the SIDH/SIDL/EID8/EID0 register layout
fn encode_id(id: u32, extended: bool) -> [u8; 4] {
    if extended {
        [
            (id >> 21) as u8,
            ((((id >> 18) & 0x07) << 5) as u8) | SIDL_EXIDE | ((id >> 16) & 0x03) as u8,
            (id >> 8) as u8,
            id as u8,
        ]
    } else {
        [(id >> 3) as u8, ((id & 0x07) << 5) as u8, 0, 0]
    }
}

/// Decode an identifier from the SIDH/SIDL/EID8/EID0 register layout
fn decode_id(buf: &[u8]) -> (u32, bool) {
    if buf[1] & SIDL_EXIDE != 0 {
        let id = ((buf[0] as u32) << 21)
            | ((((buf[1] >> 5) & 0x07) as u32) << 18)
            | (((buf[1] & 0x03) as u32) << 16)
            | ((buf[2] as u32) << 8)
            | buf[3] as u32;
        (id, true)
    } else {
        (((buf[0] as u32) << 3) | ((buf[1] >> 5) as u32), false)
    }
}

/// Decode a 13-byte RX buffer burst into a frame
fn decode_rx_buffer(buf: &[u8; 13]) -> Option<CanFrame> {
    let (id, extended) = decode_id(&buf[..4]);
    let rtr = if extended {
        buf[4] & DLC_RTR != 0
    } else {
        buf[1] & SIDL_SRR != 0
    };
    let dlc = (buf[4] & 0x0F) as usize;
    let len = dlc.min(MAX_DATA_LEN);

    let mut frame = CanFrame::new(id, extended, &buf[5..5 + len]).ok()?;
    frame.rtr = rtr;
    Some(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_id_roundtrip() {
        for id in [0x000, 0x264, 0x464, 0x341, 0x35E, 0x7FF] {
            let encoded = encode_id(id, false);
            assert_eq!(decode_id(&encoded), (id, false));
        }
    }

    #[test]
    fn test_extended_id_roundtrip() {
        for id in [0x0000_0000, 0x0001_2345, 0x1FFF_FFFF] {
            let encoded = encode_id(id, true);
            assert!(encoded[1] & SIDL_EXIDE != 0);
            assert_eq!(decode_id(&encoded), (id, true));
        }
    }

    #[test]
    fn test_navi_id_register_layout() {
        // 0x464 = 0b100_0110_0100: SIDH carries bits 10-3, SIDL bits 2-0
        assert_eq!(encode_id(0x464, false), [0x8C, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn test_decode_rx_data_frame() {
        let mut buf = [0u8; 13];
        buf[..4].copy_from_slice(&encode_id(0x464, false));
        buf[4] = 5;
        buf[5..10].copy_from_slice(&[0x00, 0x00, 0x01, 0x02, 0x00]);

        let frame = decode_rx_buffer(&buf).unwrap();
        assert_eq!(frame.id, 0x464);
        assert!(!frame.extended);
        assert!(!frame.rtr);
        assert_eq!(frame.data.as_slice(), &[0x00, 0x00, 0x01, 0x02, 0x00]);
    }

    #[test]
    fn test_decode_rx_clamps_bad_dlc() {
        let mut buf = [0u8; 13];
        buf[..4].copy_from_slice(&encode_id(0x100, false));
        buf[4] = 0x0F; // Malformed sender: DLC > 8

        let frame = decode_rx_buffer(&buf).unwrap();
        assert_eq!(frame.dlc(), 8);
    }

    #[test]
    fn test_bitrate_tables() {
        // 100 kbps is what the vehicle bus runs at
        assert_eq!(Bitrate::Kbps100.cnf(), (0x03, 0xFA, 0x87));
    }

    #[test]
    fn test_default_filters_accept_all() {
        let filters = StaticFilters::default();
        assert_eq!(filters.standard.mask, 0);
        assert_eq!(filters.extended.mask, 0);
    }
}
