//! Bytewire Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits implemented by
//! board-specific providers. The driver crates are written entirely
//! against these traits, which keeps them host-testable.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Peripheral drivers (bytewire-devices)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bytewire-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  Board provider (pin mux, I2C adapters) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputLine`], [`gpio::InputLine`] - Digital I/O levels
//! - [`line::LineProvider`] - Claiming and releasing digital lines
//! - [`i2c::I2cBus`], [`i2c::BusProvider`] - I2C bus operations

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod line;

// Re-export key traits at crate root for convenience
pub use gpio::{InputLine, Level, OutputLine};
pub use i2c::{BusProvider, I2cBus};
pub use line::{ClaimError, LineId, LineProvider, LineRole};
