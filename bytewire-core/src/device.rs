//! Byte-stream device contract
//!
//! The uniform front-end every peripheral driver exposes upward: open
//! and close session hooks plus read/write operations moving bytes
//! between a caller-supplied buffer and the protocol engine below.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::gate::{Cancellation, Interrupted};

/// Errors surfaced across the byte-stream boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// A blocking open or read was cancelled externally
    Interrupted,
    /// The protocol engine below failed to move the bytes
    Transfer,
}

impl From<Interrupted> for DeviceError {
    fn from(_: Interrupted) -> Self {
        DeviceError::Interrupted
    }
}

/// Byte-stream device front-end
///
/// Every operation takes `&self`: a device is shared by plain reference
/// between concurrent sessions, and implementations guard their state
/// with interior mutability. A session parked in `open` or `read` must
/// not stop another session from reaching `write` on the same device.
///
/// Contract:
/// - `open` acquires whatever session gate the device requires and may
///   block (interruptibly) doing so; `close` releases it.
/// - `read` copies at most `buf.len()` bytes of the device's current
///   readable state and returns the count actually copied. A short copy
///   is a short count, not an error.
/// - `write` consumes at most the device's transfer-buffer capacity,
///   triggers the protocol engine, and returns the count consumed.
///   Malformed bytes are ignored; the accepted count is still reported.
#[allow(async_fn_in_trait)]
pub trait ByteDevice<M: RawMutex> {
    /// Start a session
    async fn open(&self, cancel: &Cancellation<M>) -> Result<(), DeviceError>;

    /// End the session
    async fn close(&self) -> Result<(), DeviceError>;

    /// Copy the device's readable state into `buf`
    async fn read(&self, buf: &mut [u8], cancel: &Cancellation<M>) -> Result<usize, DeviceError>;

    /// Feed bytes to the device
    async fn write(&self, buf: &[u8]) -> Result<usize, DeviceError>;
}
