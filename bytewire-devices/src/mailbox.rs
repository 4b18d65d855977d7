//! Single-holder mailbox device
//!
//! One session at a time: `open` acquires an exclusive gate and a
//! second opener parks on it until the holder closes. The mailbox body
//! is a staging buffer; writes replace it, reads copy it out.

use core::cell::RefCell;

use bytewire_core::device::{ByteDevice, DeviceError};
use bytewire_core::gate::{Cancellation, ExclusiveGate};
use bytewire_core::TransferBuffer;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Largest message the mailbox holds
pub const MESSAGE_CAPACITY: usize = 255;

/// Exclusive-access byte mailbox
pub struct MailboxDevice<M: RawMutex> {
    gate: ExclusiveGate<M>,
    buffer: Mutex<M, RefCell<TransferBuffer<MESSAGE_CAPACITY>>>,
}

impl<M: RawMutex> MailboxDevice<M> {
    pub const fn new() -> Self {
        Self {
            gate: ExclusiveGate::new(),
            buffer: Mutex::new(RefCell::new(TransferBuffer::new())),
        }
    }

    /// Whether a session currently holds the mailbox
    pub fn is_held(&self) -> bool {
        self.gate.is_held()
    }
}

impl<M: RawMutex> Default for MailboxDevice<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> ByteDevice<M> for MailboxDevice<M> {
    /// Wait for exclusive access
    ///
    /// Cancellation while parked returns `Interrupted` and the session
    /// never holds the gate.
    async fn open(&self, cancel: &Cancellation<M>) -> Result<(), DeviceError> {
        self.gate.acquire(cancel).await?;
        #[cfg(feature = "defmt")]
        defmt::info!("mailbox: session opened");
        Ok(())
    }

    async fn close(&self) -> Result<(), DeviceError> {
        self.gate.release();
        #[cfg(feature = "defmt")]
        defmt::info!("mailbox: session closed");
        Ok(())
    }

    async fn read(&self, buf: &mut [u8], _cancel: &Cancellation<M>) -> Result<usize, DeviceError> {
        Ok(self.buffer.lock(|body| body.borrow().copy_to(buf)))
    }

    /// Replace the mailbox body, truncating to capacity
    async fn write(&self, buf: &[u8]) -> Result<usize, DeviceError> {
        Ok(self.buffer.lock(|body| body.borrow_mut().stage(buf)))
    }
}
