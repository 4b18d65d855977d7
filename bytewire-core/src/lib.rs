//! Board-agnostic core logic for the bytewire driver stack
//!
//! This crate contains the pieces shared by every peripheral driver and
//! independent of any hardware trait:
//!
//! - Transfer buffer staging bytes between the byte-stream boundary and
//!   a protocol engine
//! - Session gates (mutual exclusion, readiness signalling) and the
//!   cancellation token that makes blocking waits interruptible
//! - The byte-stream device contract every driver exposes upward

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod buffer;
pub mod device;
pub mod gate;

pub use buffer::TransferBuffer;
pub use device::{ByteDevice, DeviceError};
pub use gate::{Cancellation, ExclusiveGate, Interrupted, ReadinessGate};
