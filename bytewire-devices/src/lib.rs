//! Peripheral driver implementations
//!
//! This crate provides the concrete peripheral drivers behind the
//! byte-stream contract defined in bytewire-core:
//!
//! - Parallel-bus character LCD (HD44780-style strobe protocol)
//! - Push-button/LED panel and its edge-event dispatcher
//! - I2C transaction engine plus 24LC256 EEPROM and MCP9801 sensor
//! - Gate-guarded in-memory devices (mailbox, doorbell)

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod display;
pub mod doorbell;
pub mod i2c;
pub mod mailbox;
pub mod panel;

pub use display::DisplayDevice;
pub use doorbell::DoorbellDevice;
pub use i2c::{Eeprom24x, EepromDevice, Mcp9801, SlaveBus, TempDevice, TransferError};
pub use mailbox::MailboxDevice;
pub use panel::{EdgeToggle, LedDevice};
