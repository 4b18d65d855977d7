//! MCP9801-style temperature sensor
//!
//! Register-addressed slave: one pointer byte selects a register, the
//! ambient register reads back two bytes with the signed whole degrees
//! in the first. Configuration is a single write to the resolution
//! field.

use core::fmt::Write as _;

use bytewire_core::device::{ByteDevice, DeviceError};
use bytewire_core::gate::Cancellation;
use bytewire_hal::i2c::{BusError, BusProvider, I2cBus};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::delay::DelayNs;

use super::{SlaveBus, TransferError};
use crate::config::TempSensorConfig;

/// Register pointer values
pub mod reg {
    /// Ambient temperature, two bytes, MSB first
    pub const AMBIENT: u8 = 0x00;
    /// Configuration register
    pub const CONFIG: u8 = 0x01;
}

/// Configuration value selecting 12-bit conversions
pub const RESOLUTION_12BIT: u8 = 0x60;

/// Settle bound for the sensor's register writes
///
/// The sensor acknowledges again within a bus clock or two; this bound
/// exists only so a dead part surfaces as an error.
const MAX_SETTLE_MS: u32 = 5;

/// Driver for an MCP9801-style sensor
pub struct Mcp9801<B: I2cBus, D: DelayNs> {
    bus: SlaveBus<B, D>,
}

impl<B: I2cBus, D: DelayNs> Mcp9801<B, D> {
    pub fn new(bus: SlaveBus<B, D>) -> Self {
        Self { bus }
    }

    /// Select 12-bit resolution
    pub async fn configure(&mut self) -> Result<(), TransferError<B::Error>> {
        self.bus.write_byte(reg::CONFIG, RESOLUTION_12BIT).await
    }

    /// Read the ambient temperature, truncated to whole degrees
    pub async fn read_celsius(&mut self) -> Result<i16, TransferError<B::Error>> {
        let mut raw = [0u8; 2];
        self.bus.read_block(reg::AMBIENT, &mut raw).await?;
        // MSB is the signed integer part; the fractional byte is
        // discarded
        Ok(i16::from(raw[0] as i8))
    }
}

/// Byte-stream front-end for the sensor
///
/// Reads render the current temperature as ASCII decimal with a
/// trailing newline. The sensor is read-only; writes are rejected with
/// a transfer error. The driver sits behind an async mutex so
/// concurrent sessions serialize whole register transactions.
pub struct TempDevice<M: RawMutex, B: I2cBus, D: DelayNs> {
    sensor: Mutex<M, Mcp9801<B, D>>,
}

impl<M: RawMutex, B: I2cBus, D: DelayNs> TempDevice<M, B, D> {
    pub fn new(sensor: Mcp9801<B, D>) -> Self {
        Self {
            sensor: Mutex::new(sensor),
        }
    }
}

/// Open the configured bus and bind the sensor on it
pub fn bind<'p, M, P, D>(
    adapters: &'p P,
    cfg: &TempSensorConfig,
    delay: D,
) -> Result<TempDevice<M, P::Bus<'p>, D>, BusError>
where
    M: RawMutex,
    P: BusProvider,
    D: DelayNs,
{
    let bus = super::attach(adapters, cfg.bus, cfg.address, delay, MAX_SETTLE_MS)?;
    Ok(TempDevice::new(Mcp9801::new(bus)))
}

impl<M, B, D> ByteDevice<M> for TempDevice<M, B, D>
where
    M: RawMutex,
    B: I2cBus,
    D: DelayNs,
{
    async fn open(&self, _cancel: &Cancellation<M>) -> Result<(), DeviceError> {
        self.sensor
            .lock()
            .await
            .configure()
            .await
            .map_err(|_| DeviceError::Transfer)?;
        #[cfg(feature = "defmt")]
        defmt::info!("temp: session opened, 12-bit resolution");
        Ok(())
    }

    async fn close(&self) -> Result<(), DeviceError> {
        #[cfg(feature = "defmt")]
        defmt::info!("temp: session closed");
        Ok(())
    }

    async fn read(&self, buf: &mut [u8], _cancel: &Cancellation<M>) -> Result<usize, DeviceError> {
        let celsius = self
            .sensor
            .lock()
            .await
            .read_celsius()
            .await
            .map_err(|_| DeviceError::Transfer)?;

        // Worst case is "-128\n"
        let mut text = heapless::String::<8>::new();
        writeln!(text, "{celsius}").map_err(|_| DeviceError::Transfer)?;

        let take = text.len().min(buf.len());
        buf[..take].copy_from_slice(&text.as_bytes()[..take]);
        Ok(take)
    }

    async fn write(&self, _buf: &[u8]) -> Result<usize, DeviceError> {
        Err(DeviceError::Transfer)
    }
}
