//! HD44780-style parallel strobe engine
//!
//! Drives a character LCD over a mode-select line, a read/write-select
//! line, a strobe (enable) line and eight data lines. One byte travels
//! per strobe cycle:
//!
//! 1. select mode (instruction or data),
//! 2. drive the data lines from the byte, bit 0 on the first line,
//! 3. strobe high, hold the settle delay, strobe low,
//! 4. hold the settle delay again before the next byte.
//!
//! Every transfer is synchronous and blocking; the call returns only
//! after the last byte's settle delay has elapsed.

use bytewire_hal::gpio::{Level, OutputLine};
use embedded_hal::delay::DelayNs;

/// Instruction bytes understood by the controller
pub mod cmd {
    /// Clear the display and reset the entry position
    pub const CLEAR: u8 = 0x01;
    /// Select the 8-bit parallel interface
    pub const FUNCTION_SET_8BIT: u8 = 0x30;
    /// Display on, cursor on, cursor blinking
    pub const DISPLAY_ON_CURSOR_BLINK: u8 = 0x0F;
}

/// Number of parallel data lines
pub const DATA_LINES: usize = 8;

/// Parallel strobe engine for a character LCD
///
/// Construction runs the one-time init sequence (bus-width select,
/// display on, clear), in order, so the engine is usable as soon as
/// `new` returns.
pub struct Hd44780<O: OutputLine, D: DelayNs> {
    register_select: O,
    read_write: O,
    enable: O,
    data: heapless::Vec<O, DATA_LINES>,
    delay: D,
    settle_ms: u32,
}

impl<O: OutputLine, D: DelayNs> Hd44780<O, D> {
    /// Take ownership of the claimed lines and initialize the display
    ///
    /// `settle_ms` below 1 is clamped to 1, the controller's documented
    /// minimum hold time.
    pub fn new(
        register_select: O,
        mut read_write: O,
        enable: O,
        data: heapless::Vec<O, DATA_LINES>,
        delay: D,
        settle_ms: u32,
    ) -> Self {
        // Low selects write mode; this driver never reads the display
        read_write.set_low();

        let mut lcd = Self {
            register_select,
            read_write,
            enable,
            data,
            delay,
            settle_ms: settle_ms.max(1),
        };
        lcd.instruction(cmd::FUNCTION_SET_8BIT);
        lcd.instruction(cmd::DISPLAY_ON_CURSOR_BLINK);
        lcd.instruction(cmd::CLEAR);
        lcd
    }

    /// Send one instruction byte
    pub fn instruction(&mut self, byte: u8) {
        self.register_select.set_low();
        self.send_byte(byte);
    }

    /// Send one character byte to display
    pub fn character(&mut self, byte: u8) {
        self.register_select.set_high();
        self.send_byte(byte);
    }

    /// Wipe the display
    pub fn clear(&mut self) {
        self.instruction(cmd::CLEAR);
    }

    fn send_byte(&mut self, byte: u8) {
        for (bit, line) in self.data.iter_mut().enumerate() {
            line.write_level(Level::from_bit(byte, bit as u8));
        }
        self.latch();
        self.delay.delay_ms(self.settle_ms);
    }

    /// Pulse the strobe line so the display samples its inputs
    fn latch(&mut self) {
        self.enable.set_high();
        self.delay.delay_ms(self.settle_ms);
        self.enable.set_low();
    }
}

impl<O: OutputLine, D: DelayNs> Drop for Hd44780<O, D> {
    fn drop(&mut self) {
        // Wipe the screen and park every line low before the guards
        // release them
        self.instruction(cmd::CLEAR);
        self.register_select.set_low();
        self.read_write.set_low();
        self.enable.set_low();
        for line in self.data.iter_mut() {
            line.set_low();
        }
    }
}
