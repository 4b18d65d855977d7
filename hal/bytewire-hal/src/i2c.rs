//! I2C bus abstractions
//!
//! Provides traits for I2C master operations and for opening numbered
//! buses, implemented by board-specific providers.

/// I2C bus master
///
/// Each call is one bus transaction: a start condition, the addressed
/// transfer, and a stop condition. Slaves with internal write cycles see
/// a stop as the end of the message, so callers that need an address and
/// a payload delivered together must pass them in a single `write`.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data,
    /// without a stop condition in between.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

/// Errors raised while opening a bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// No adapter exists for the requested bus number
    NoSuchBus(u8),
}

/// Provider of numbered I2C buses
///
/// A bus handle is acquired once when a driver binds and held for the
/// binding's lifetime. Acquisition failure is fatal to that binding;
/// resources acquired earlier are released by their guards.
pub trait BusProvider {
    /// Opened bus handle
    type Bus<'a>: I2cBus
    where
        Self: 'a;

    /// Open the bus with the given number
    fn open_bus(&self, bus_number: u8) -> Result<Self::Bus<'_>, BusError>;
}
