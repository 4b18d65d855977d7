//! Board configuration types
//!
//! Line identifiers per role, bus numbers, slave addresses and timing
//! constants. These are supplied at build or init time, never negotiated
//! at runtime; the defaults match the BeagleBone-style reference wiring.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Button/LED panel wiring
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelConfig {
    /// LED line identifier
    pub led_line: u16,
    /// Button line identifier
    pub button_line: u16,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            led_line: 49,     // P9_23
            button_line: 117, // P9_25
        }
    }
}

/// Edge-dispatcher wiring: a button edge toggles an LED
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeToggleConfig {
    /// Monitored input line
    pub button_line: u16,
    /// Toggled output line
    pub led_line: u16,
    /// Minimum spacing between accepted edges, in milliseconds
    pub debounce_ms: u32,
}

impl Default for EdgeToggleConfig {
    fn default() -> Self {
        Self {
            button_line: 115, // P9_27
            led_line: 49,     // P9_23
            debounce_ms: 100,
        }
    }
}

/// Character LCD wiring and timing
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Mode-select line (instruction/data)
    pub register_select_line: u16,
    /// Read/write-select line (held low: write-only)
    pub read_write_line: u16,
    /// Strobe line latching the data lines
    pub enable_line: u16,
    /// Data lines, least-significant bit first
    pub data_lines: [u16; 8],
    /// Settle/latch hold time per strobe step, in milliseconds
    ///
    /// Must be at least 1; the reference wiring holds 5.
    pub settle_ms: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            register_select_line: 33,
            read_write_line: 62,
            enable_line: 63,
            data_lines: [27, 46, 23, 44, 69, 67, 34, 39],
            settle_ms: 5,
        }
    }
}

/// 24LC256 EEPROM bus binding
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EepromConfig {
    /// I2C bus number
    pub bus: u8,
    /// 7-bit slave address
    pub address: u8,
    /// Upper bound on the slave's internal write cycle, in milliseconds
    pub max_settle_ms: u32,
}

impl Default for EepromConfig {
    fn default() -> Self {
        Self {
            bus: 2,
            address: 0x50,
            max_settle_ms: 25,
        }
    }
}

/// MCP9801 temperature sensor bus binding
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TempSensorConfig {
    /// I2C bus number
    pub bus: u8,
    /// 7-bit slave address
    pub address: u8,
}

impl Default for TempSensorConfig {
    fn default() -> Self {
        Self {
            bus: 2,
            address: 0x4E,
        }
    }
}
