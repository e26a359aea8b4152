//! Hardware driver implementations
//!
//! This crate provides the bus-facing pieces of the gateway:
//!
//! - MCP2515 standalone CAN controller (SPI, register level)
//! - Static acceptance filter layout (two groups, set once at startup)
//! - Bounded-poll receive on top of the controller
//!
//! Everything is generic over `embedded-hal` 1.0 traits so the register
//! plumbing and datagram encoding test on the host.

#![no_std]
#![deny(unsafe_code)]

pub mod can;
