//! CAN frame representation
//!
//! One bus message unit: identifier, flags, and up to 8 payload bytes.
//! Frames are constructed fresh per send/receive call and never mutated
//! after that.

use heapless::Vec;

/// Maximum CAN payload size in bytes
pub const MAX_DATA_LEN: usize = 8;

/// Largest valid 11-bit (standard) identifier
pub const MAX_STANDARD_ID: u32 = 0x7FF;

/// Largest valid 29-bit (extended) identifier
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

/// Errors that can occur when constructing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds 8 bytes
    PayloadTooLong,
    /// Identifier does not fit the addressing mode
    InvalidId,
}

/// A received or outgoing CAN frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanFrame {
    /// 11-bit or 29-bit identifier
    pub id: u32,
    /// Extended (29-bit) addressing
    pub extended: bool,
    /// Remote transmission request
    pub rtr: bool,
    /// Payload, only the first `dlc()` bytes are meaningful
    pub data: Vec<u8, MAX_DATA_LEN>,
}

impl CanFrame {
    /// Create a frame with explicit addressing mode
    pub fn new(id: u32, extended: bool, data: &[u8]) -> Result<Self, FrameError> {
        let max_id = if extended { MAX_EXTENDED_ID } else { MAX_STANDARD_ID };
        if id > max_id {
            return Err(FrameError::InvalidId);
        }

        let mut payload = Vec::new();
        payload
            .extend_from_slice(data)
            .map_err(|_| FrameError::PayloadTooLong)?;

        Ok(Self {
            id,
            extended,
            rtr: false,
            data: payload,
        })
    }

    /// Create a standard-id data frame
    ///
    /// All frames in the tuner protocol use 11-bit identifiers and payloads
    /// from fixed tables, so this is the constructor used throughout.
    pub fn standard(id: u32, data: &[u8]) -> Result<Self, FrameError> {
        Self::new(id, false, data)
    }

    /// Data length code (0-8)
    pub fn dlc(&self) -> usize {
        self.data.len()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CanFrame {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "CanFrame {{ id: {=u32:#x}, ext: {}, rtr: {}, data: {=[u8]:#04x} }}",
            self.id,
            self.extended,
            self.rtr,
            self.data.as_slice()
        );
    }
}
