//! Digital line abstractions
//!
//! Provides traits for single digital I/O lines. Level changes on an
//! output line must reach the physical pin synchronously: there is no
//! queuing between `write_level` and the wire.

/// Logic level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Level carried by one bit of a byte (bit 0 = least significant)
    pub const fn from_bit(byte: u8, bit: u8) -> Self {
        if byte & (1 << bit) != 0 {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        matches!(level, Level::High)
    }
}

/// Line configured as an output
///
/// Implementations drive the physical pin; each write takes effect
/// immediately.
pub trait OutputLine {
    /// Drive the line to the given level
    fn write_level(&mut self, level: Level);

    /// Drive the line high (logic 1)
    fn set_high(&mut self) {
        self.write_level(Level::High);
    }

    /// Drive the line low (logic 0)
    fn set_low(&mut self) {
        self.write_level(Level::Low);
    }

    /// Last level driven onto the line
    fn level(&self) -> Level;
}

/// Line configured as an input
pub trait InputLine {
    /// Sample the current level of the line
    fn read_level(&self) -> Level;

    /// Check if the line reads high
    fn is_high(&self) -> bool {
        matches!(self.read_level(), Level::High)
    }

    /// Set the debounce window for edge events on this line
    ///
    /// Edges closer together than `window_ms` are electrical bounce and
    /// must not be reported. Best-effort: providers without hardware
    /// debounce may ignore this, in which case the consumer filters.
    fn set_debounce(&mut self, window_ms: u32) {
        let _ = window_ms;
    }
}
