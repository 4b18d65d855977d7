//! Character LCD device
//!
//! Byte-stream front-end over the HD44780 strobe engine: a write wipes
//! the screen and renders the staged bytes, one strobe cycle per byte.

pub mod hd44780;

pub use hd44780::{Hd44780, DATA_LINES};

use core::cell::RefCell;

use bytewire_core::device::{ByteDevice, DeviceError};
use bytewire_core::gate::Cancellation;
use bytewire_core::TransferBuffer;
use bytewire_hal::gpio::Level;
use bytewire_hal::line::{claim_output_group, ClaimError, LineId, LineProvider, LineRole};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::delay::DelayNs;

use crate::config::DisplayConfig;

/// One line of a 1602-style display
pub const LINE_CAPACITY: usize = 16;

struct RenderState<O: bytewire_hal::OutputLine, D: DelayNs> {
    lcd: Hd44780<O, D>,
    buffer: TransferBuffer<LINE_CAPACITY>,
}

/// Byte-stream front-end for the character LCD
///
/// Engine and staging buffer live behind one blocking mutex; a render
/// holds it for the whole transfer, so writes from concurrent sessions
/// serialize rather than interleave strobe cycles.
pub struct DisplayDevice<M: RawMutex, O: bytewire_hal::OutputLine, D: DelayNs> {
    state: Mutex<M, RefCell<RenderState<O, D>>>,
}

impl<M: RawMutex, O: bytewire_hal::OutputLine, D: DelayNs> core::fmt::Debug
    for DisplayDevice<M, O, D>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DisplayDevice").finish_non_exhaustive()
    }
}

impl<M: RawMutex, O: bytewire_hal::OutputLine, D: DelayNs> DisplayDevice<M, O, D> {
    /// Wrap an initialized engine
    pub fn new(lcd: Hd44780<O, D>) -> Self {
        Self {
            state: Mutex::new(RefCell::new(RenderState {
                lcd,
                buffer: TransferBuffer::new(),
            })),
        }
    }
}

/// Claim the display's line group and initialize the engine
///
/// The eleven lines are claimed as one ordered role table; a claim
/// failure anywhere releases exactly the lines claimed before it and
/// nothing is left half-configured.
pub fn bind<'p, M, P, D>(
    lines: &'p P,
    cfg: &DisplayConfig,
    delay: D,
) -> Result<DisplayDevice<M, P::Output<'p>, D>, ClaimError>
where
    M: RawMutex,
    P: LineProvider,
    D: DelayNs,
{
    const DATA_LABELS: [&str; DATA_LINES] = [
        "DATA_PIN0",
        "DATA_PIN1",
        "DATA_PIN2",
        "DATA_PIN3",
        "DATA_PIN4",
        "DATA_PIN5",
        "DATA_PIN6",
        "DATA_PIN7",
    ];

    let register_select =
        lines.claim_output(LineRole::new(cfg.register_select_line, "REGISTER_SELECT"), Level::Low)?;
    let read_write =
        lines.claim_output(LineRole::new(cfg.read_write_line, "READ_WRITE_PIN"), Level::Low)?;
    let enable = lines.claim_output(LineRole::new(cfg.enable_line, "ENABLE_PIN"), Level::Low)?;

    let mut roles = [LineRole::new(0, ""); DATA_LINES];
    for (i, role) in roles.iter_mut().enumerate() {
        *role = LineRole::new(cfg.data_lines[i], DATA_LABELS[i]);
    }
    let data = claim_output_group(lines, roles, Level::Low)?;

    lines.export(LineId(cfg.register_select_line));
    lines.export(LineId(cfg.read_write_line));
    lines.export(LineId(cfg.enable_line));
    for role in roles {
        lines.export(role.id);
    }

    let lcd = Hd44780::new(register_select, read_write, enable, data, delay, cfg.settle_ms);
    Ok(DisplayDevice::new(lcd))
}

impl<M, O, D> ByteDevice<M> for DisplayDevice<M, O, D>
where
    M: RawMutex,
    O: bytewire_hal::OutputLine,
    D: DelayNs,
{
    async fn open(&self, _cancel: &Cancellation<M>) -> Result<(), DeviceError> {
        #[cfg(feature = "defmt")]
        defmt::info!("lcd: session opened");
        Ok(())
    }

    async fn close(&self) -> Result<(), DeviceError> {
        #[cfg(feature = "defmt")]
        defmt::info!("lcd: session closed");
        Ok(())
    }

    async fn read(&self, _buf: &mut [u8], _cancel: &Cancellation<M>) -> Result<usize, DeviceError> {
        // The display is write-only
        Ok(0)
    }

    /// Render the bytes, truncated to one display line
    ///
    /// Blocks for the whole transfer: one clear instruction plus one
    /// strobe cycle per staged byte.
    async fn write(&self, buf: &[u8]) -> Result<usize, DeviceError> {
        let staged = self.state.lock(|state| {
            let state = &mut *state.borrow_mut();
            let staged = state.buffer.stage(buf);
            state.lcd.clear();
            for &byte in state.buffer.bytes() {
                state.lcd.character(byte);
            }
            staged
        });
        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::future::Future;
    use core::pin::pin;
    use core::task::{Context, Poll, Waker};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    fn run<F: Future>(fut: F) -> F::Output {
        let mut fut = pin!(fut);
        let mut cx = Context::from_waker(Waker::noop());
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(out) => out,
            Poll::Pending => panic!("future stalled"),
        }
    }

    #[derive(Default)]
    struct Claims {
        held: RefCell<heapless::Vec<u16, 16>>,
        refuse: Option<u16>,
    }

    struct Line<'a> {
        host: &'a Claims,
        id: u16,
        level: Level,
    }

    impl bytewire_hal::OutputLine for Line<'_> {
        fn write_level(&mut self, level: Level) {
            self.level = level;
        }

        fn level(&self) -> Level {
            self.level
        }
    }

    impl Drop for Line<'_> {
        fn drop(&mut self) {
            self.host.held.borrow_mut().retain(|id| *id != self.id);
        }
    }

    impl LineProvider for Claims {
        type Output<'a> = Line<'a>;
        type Input<'a> = DeadInput;

        fn claim_output(
            &self,
            role: LineRole,
            initial: Level,
        ) -> Result<Self::Output<'_>, ClaimError> {
            let mut held = self.held.borrow_mut();
            if self.refuse == Some(role.id.0) || held.contains(&role.id.0) {
                return Err(ClaimError::Busy(role.id));
            }
            held.push(role.id.0).unwrap();
            Ok(Line {
                host: self,
                id: role.id.0,
                level: initial,
            })
        }

        fn claim_input(&self, role: LineRole) -> Result<Self::Input<'_>, ClaimError> {
            Err(ClaimError::Direction(role.id))
        }
    }

    pub struct DeadInput;
    impl bytewire_hal::InputLine for DeadInput {
        fn read_level(&self) -> Level {
            Level::Low
        }
    }

    struct CountingDelay;
    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn twenty_byte_write_consumes_one_line() {
        let lines = Claims::default();
        let device =
            bind::<NoopRawMutex, _, _>(&lines, &DisplayConfig::default(), CountingDelay).unwrap();

        let consumed = run(device.write(b"this line is too long!"));
        assert_eq!(consumed, Ok(16));
    }

    #[test]
    fn bind_claims_all_eleven_lines_and_unbinds() {
        let lines = Claims::default();
        let device =
            bind::<NoopRawMutex, _, _>(&lines, &DisplayConfig::default(), CountingDelay).unwrap();
        assert_eq!(lines.held.borrow().len(), 11);

        drop(device);
        assert!(lines.held.borrow().is_empty());
    }

    #[test]
    fn bind_failure_releases_earlier_claims() {
        let lines = Claims {
            refuse: Some(44), // fourth data line
            ..Claims::default()
        };
        let err = bind::<NoopRawMutex, _, _>(&lines, &DisplayConfig::default(), CountingDelay)
            .unwrap_err();
        assert_eq!(err, ClaimError::Busy(bytewire_hal::LineId(44)));
        assert!(lines.held.borrow().is_empty());
    }

    #[test]
    fn read_is_empty() {
        let lines = Claims::default();
        let device =
            bind::<NoopRawMutex, _, _>(&lines, &DisplayConfig::default(), CountingDelay).unwrap();
        let cancel = Cancellation::new();

        let mut buf = [0u8; 4];
        assert_eq!(run(device.read(&mut buf, &cancel)), Ok(0));
    }
}
