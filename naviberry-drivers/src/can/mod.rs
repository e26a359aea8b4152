//! CAN controller drivers

pub mod mcp2515;
pub mod transport;

pub use mcp2515::{Bitrate, FilterGroup, Mcp2515, Mcp2515Error, StaticFilters};
pub use transport::receive_with_timeout;
