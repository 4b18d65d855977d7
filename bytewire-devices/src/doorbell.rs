//! Sleep/wake doorbell device
//!
//! Readers park until somebody writes. A write rings the bell; the
//! woken reader consumes the ring and returns empty, so the next read
//! parks again. Data never crosses the device, only the wakeup does.

use bytewire_core::device::{ByteDevice, DeviceError};
use bytewire_core::gate::{Cancellation, ReadinessGate};
use embassy_sync::blocking_mutex::raw::RawMutex;

/// Wakeup-only byte device
pub struct DoorbellDevice<M: RawMutex> {
    gate: ReadinessGate<M>,
}

impl<M: RawMutex> DoorbellDevice<M> {
    pub const fn new() -> Self {
        Self {
            gate: ReadinessGate::new(),
        }
    }

    /// Whether a ring is pending and would satisfy the next read
    pub fn is_rung(&self) -> bool {
        self.gate.is_ready()
    }
}

impl<M: RawMutex> Default for DoorbellDevice<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> ByteDevice<M> for DoorbellDevice<M> {
    async fn open(&self, _cancel: &Cancellation<M>) -> Result<(), DeviceError> {
        #[cfg(feature = "defmt")]
        defmt::info!("doorbell: session opened");
        Ok(())
    }

    async fn close(&self) -> Result<(), DeviceError> {
        #[cfg(feature = "defmt")]
        defmt::info!("doorbell: session closed");
        Ok(())
    }

    /// Park until the bell rings, then return empty
    async fn read(&self, _buf: &mut [u8], cancel: &Cancellation<M>) -> Result<usize, DeviceError> {
        self.gate.wait_until_ready(cancel).await?;
        Ok(0)
    }

    /// Ring the bell; the payload itself is discarded
    ///
    /// Never blocks, whether or not a reader is parked.
    async fn write(&self, buf: &[u8]) -> Result<usize, DeviceError> {
        self.gate.signal_ready();
        Ok(buf.len())
    }
}
