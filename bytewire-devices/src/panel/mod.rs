//! Button/LED panel device
//!
//! Byte-stream front-end over one output line (LED) and one input line
//! (button). Writes interpret the single-byte command vocabulary
//! `'0'`/`'1'`; reads report the button level as an ASCII digit.

pub mod edge;

pub use edge::{EdgeOutcome, EdgeToggle};

use core::cell::RefCell;

use bytewire_core::device::{ByteDevice, DeviceError};
use bytewire_core::gate::Cancellation;
use bytewire_hal::gpio::{InputLine, Level, OutputLine};
use bytewire_hal::line::{ClaimError, LineId, LineProvider, LineRole};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::PanelConfig;

/// Byte-stream front-end for the button/LED pair
///
/// The LED line sits behind a blocking mutex so concurrent sessions can
/// drive it through shared references.
pub struct LedDevice<M: RawMutex, O: OutputLine, I: InputLine> {
    led: Mutex<M, RefCell<O>>,
    button: I,
}

impl<M: RawMutex, O: OutputLine, I: InputLine> LedDevice<M, O, I> {
    /// Build from already-claimed lines
    pub fn new(led: O, button: I) -> Self {
        Self {
            led: Mutex::new(RefCell::new(led)),
            button,
        }
    }

    /// Level currently driven on the LED line
    pub fn led_level(&self) -> Level {
        self.led.lock(|led| led.borrow().level())
    }
}

/// Claim the panel lines
///
/// The LED is driven high at bind, matching the reference board
/// bring-up. A button claim failure releases the LED line before the
/// error propagates.
pub fn bind<'p, M, P>(
    lines: &'p P,
    cfg: &PanelConfig,
) -> Result<LedDevice<M, P::Output<'p>, P::Input<'p>>, ClaimError>
where
    M: RawMutex,
    P: LineProvider,
{
    let led = lines.claim_output(LineRole::new(cfg.led_line, "PANEL_LED"), Level::High)?;
    let button = lines.claim_input(LineRole::new(cfg.button_line, "PANEL_BUTTON"))?;
    lines.export(LineId(cfg.led_line));
    lines.export(LineId(cfg.button_line));
    Ok(LedDevice::new(led, button))
}

impl<M, O, I> ByteDevice<M> for LedDevice<M, O, I>
where
    M: RawMutex,
    O: OutputLine,
    I: InputLine,
{
    async fn open(&self, _cancel: &Cancellation<M>) -> Result<(), DeviceError> {
        #[cfg(feature = "defmt")]
        defmt::info!("panel: session opened");
        Ok(())
    }

    async fn close(&self) -> Result<(), DeviceError> {
        #[cfg(feature = "defmt")]
        defmt::info!("panel: session closed");
        Ok(())
    }

    /// Report the button level as an ASCII digit plus newline
    async fn read(&self, buf: &mut [u8], _cancel: &Cancellation<M>) -> Result<usize, DeviceError> {
        let digit = match self.button.read_level() {
            Level::Low => b'0',
            Level::High => b'1',
        };
        let out = [digit, b'\n'];
        let take = out.len().min(buf.len());
        buf[..take].copy_from_slice(&out[..take]);
        Ok(take)
    }

    /// Interpret the first byte as an LED command
    ///
    /// `'0'` drives the line low, `'1'` drives it high; anything else
    /// is a no-op but still counts as accepted.
    async fn write(&self, buf: &[u8]) -> Result<usize, DeviceError> {
        let Some(&command) = buf.first() else {
            return Ok(0);
        };
        match command {
            b'0' => self.led.lock(|led| led.borrow_mut().set_low()),
            b'1' => self.led.lock(|led| led.borrow_mut().set_high()),
            _ => {
                #[cfg(feature = "defmt")]
                defmt::warn!("panel: ignoring invalid command byte {=u8}", command);
            }
        }
        Ok(1)
    }
}

impl<M: RawMutex, O: OutputLine, I: InputLine> Drop for LedDevice<M, O, I> {
    fn drop(&mut self) {
        // Park the LED low before the line guard releases it
        self.led.lock(|led| led.borrow_mut().set_low());
    }
}
