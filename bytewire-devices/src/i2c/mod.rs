//! I2C transaction engine
//!
//! Wraps a bus handle and a bound 7-bit slave address, and keeps the
//! inter-transaction timing honest: a memory-addressed slave runs an
//! internal write cycle after every write and treats a premature second
//! write as a fresh address, so the engine never lets two transactions
//! race the cycle. Address bytes and payload always travel in a single
//! transaction; anything that must follow a write first waits for the
//! slave to acknowledge again.

pub mod eeprom24;
pub mod mcp9801;

pub use eeprom24::{Eeprom24x, EepromDevice};
pub use mcp9801::{Mcp9801, TempDevice};

use bytewire_hal::i2c::{BusError, BusProvider, I2cBus};
use embedded_hal_async::delay::DelayNs;

/// Errors raised by slave transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferError<E> {
    /// The bus reported a failure
    Bus(E),
    /// The slave kept rejecting its address past the settle bound
    SlaveBusy,
}

/// Interval between acknowledge polls while a slave settles
const POLL_INTERVAL_MS: u32 = 1;

/// Transaction engine bound to one slave address
pub struct SlaveBus<B: I2cBus, D: DelayNs> {
    bus: B,
    delay: D,
    address: u8,
    max_settle_ms: u32,
    /// A write cycle may still be running in the slave
    settling: bool,
}

impl<B: I2cBus, D: DelayNs> SlaveBus<B, D> {
    /// Bind the engine to a slave
    ///
    /// `max_settle_ms` bounds how long the slave's internal write cycle
    /// may take before the engine gives up on it.
    pub fn new(bus: B, delay: D, address: u8, max_settle_ms: u32) -> Self {
        debug_assert!(address <= 0x7F, "7-bit slave address");
        Self {
            bus,
            delay,
            address,
            max_settle_ms,
            settling: false,
        }
    }

    /// Bound slave address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Send a raw ordered byte sequence in one bus transaction
    pub async fn write_sequence(&mut self, bytes: &[u8]) -> Result<(), TransferError<B::Error>> {
        self.settle().await?;
        self.bus
            .write(self.address, bytes)
            .map_err(TransferError::Bus)?;
        self.settling = true;
        Ok(())
    }

    /// Receive `buf.len()` bytes in one transaction
    ///
    /// Waits out any pending write cycle first.
    pub async fn read_sequence(&mut self, buf: &mut [u8]) -> Result<(), TransferError<B::Error>> {
        self.settle().await?;
        self.bus
            .read(self.address, buf)
            .map_err(TransferError::Bus)
    }

    /// Write then read without a stop in between (repeated start)
    ///
    /// This is the only safe way to combine an address write with a
    /// read: splitting them into two transactions would let the slave
    /// reinterpret the second one.
    pub async fn write_then_read(
        &mut self,
        tx: &[u8],
        rx: &mut [u8],
    ) -> Result<(), TransferError<B::Error>> {
        self.settle().await?;
        self.bus
            .write_read(self.address, tx, rx)
            .map_err(TransferError::Bus)
    }

    /// Write one register byte
    pub async fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), TransferError<B::Error>> {
        self.write_sequence(&[reg, value]).await
    }

    /// Read one register byte
    pub async fn read_byte(&mut self, reg: u8) -> Result<u8, TransferError<B::Error>> {
        let mut byte = [0u8; 1];
        self.write_then_read(&[reg], &mut byte).await?;
        Ok(byte[0])
    }

    /// Read a block of register bytes
    pub async fn read_block(
        &mut self,
        reg: u8,
        buf: &mut [u8],
    ) -> Result<(), TransferError<B::Error>> {
        self.write_then_read(&[reg], buf).await
    }

    /// Wait for a pending write cycle to finish
    ///
    /// Acknowledge polling: the slave stays mute while its internal
    /// cycle runs, so an empty write succeeding means it is ready. The
    /// poll is bounded by `max_settle_ms` rather than guessed with a
    /// fixed sleep.
    async fn settle(&mut self) -> Result<(), TransferError<B::Error>> {
        if !self.settling {
            return Ok(());
        }
        let mut waited_ms = 0;
        loop {
            if self.bus.write(self.address, &[]).is_ok() {
                self.settling = false;
                return Ok(());
            }
            if waited_ms >= self.max_settle_ms {
                return Err(TransferError::SlaveBusy);
            }
            self.delay.delay_ms(POLL_INTERVAL_MS).await;
            waited_ms += POLL_INTERVAL_MS;
        }
    }
}

/// Open a numbered bus and bind a slave on it
///
/// The bus handle is held for the engine's lifetime and released with
/// it; an open failure leaves nothing acquired.
pub fn attach<'p, P, D>(
    adapters: &'p P,
    bus_number: u8,
    address: u8,
    delay: D,
    max_settle_ms: u32,
) -> Result<SlaveBus<P::Bus<'p>, D>, BusError>
where
    P: BusProvider,
    D: DelayNs,
{
    let bus = adapters.open_bus(bus_number)?;
    Ok(SlaveBus::new(bus, delay, address, max_settle_ms))
}


#[cfg(test)]
mod tests {
    use super::testbus::*;
    use super::*;
    use core::future::Future;
    use core::pin::pin;
    use core::task::{Context, Poll, Waker};

    fn run<F: Future>(fut: F) -> F::Output {
        let mut fut = pin!(fut);
        let mut cx = Context::from_waker(Waker::noop());
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(out) => out,
            Poll::Pending => panic!("future stalled"),
        }
    }

    fn engine(slave: &SlowSlave, max_settle_ms: u32) -> SlaveBus<SlaveHandle<'_>, TickingDelay<'_>> {
        SlaveBus::new(
            SlaveHandle(slave),
            TickingDelay {
                clock_ms: &slave.clock_ms,
            },
            0x50,
            max_settle_ms,
        )
    }

    #[test]
    fn raw_bus_rejects_a_second_write_inside_the_cycle() {
        let slave = SlowSlave::new(0x50, 5);
        let mut bus = SlaveHandle(&slave);

        bus.write(0x50, &[0x00, 0x00, 0xAA]).unwrap();
        // No time has passed: the slave is mid-cycle and treats the
        // next transaction as noise
        assert_eq!(bus.write(0x50, &[0x00, 0x02, 0xBB]), Err(Nack));
    }

    #[test]
    fn engine_waits_out_the_write_cycle_between_writes() {
        let slave = SlowSlave::new(0x50, 5);
        let mut eng = engine(&slave, 25);

        run(eng.write_sequence(&[0x00, 0x00, 0x50, 0x51])).unwrap();
        run(eng.write_sequence(&[0x00, 0x10, 0x52])).unwrap();

        let accepted = slave.accepted.borrow();
        assert_eq!(accepted.len(), 2);
        assert_eq!(accepted[0].as_slice(), &[0x00, 0x00, 0x50, 0x51]);
        assert_eq!(accepted[1].as_slice(), &[0x00, 0x10, 0x52]);
        // The second transaction went out only after the cycle elapsed
        assert!(slave.clock_ms.get() >= 5);
    }

    #[test]
    fn plain_read_polls_out_the_write_cycle_first() {
        let slave = SlowSlave::new(0x50, 5);
        let mut eng = engine(&slave, 25);

        run(eng.write_sequence(&[0x00, 0x00, 0xAA])).unwrap();

        // Sequential read from the slave's current position; it must
        // not go out before the cycle has elapsed
        let mut next = [0u8; 1];
        run(eng.read_sequence(&mut next)).unwrap();
        assert!(slave.clock_ms.get() >= 5);
        assert_eq!(next[0], 0x00);

        // Reposition to the start and stream the written byte back
        run(eng.write_sequence(&[0x00, 0x00])).unwrap();
        let mut back = [0u8; 1];
        run(eng.read_sequence(&mut back)).unwrap();
        assert_eq!(back[0], 0xAA);
    }

    #[test]
    fn read_after_write_waits_for_completion() {
        let slave = SlowSlave::new(0x50, 5);
        let mut eng = engine(&slave, 25);

        run(eng.write_sequence(&[0x00, 0x00, 0x50, 0x51])).unwrap();

        let mut byte = [0u8; 1];
        run(eng.write_then_read(&[0x00, 0x00], &mut byte)).unwrap();
        assert_eq!(byte[0], 0x50);
    }

    #[test]
    fn slow_slave_within_bound_corrupts_nothing() {
        let slave = SlowSlave::new(0x50, 20);
        let mut eng = engine(&slave, 25);

        run(eng.write_sequence(&[0x00, 0x00, 1, 2, 3])).unwrap();
        run(eng.write_sequence(&[0x00, 0x03, 4, 5])).unwrap();

        let mut back = [0u8; 5];
        run(eng.write_then_read(&[0x00, 0x00], &mut back)).unwrap();
        assert_eq!(back, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn slave_busy_past_the_bound_is_an_error() {
        let slave = SlowSlave::new(0x50, 40);
        let mut eng = engine(&slave, 25);

        run(eng.write_sequence(&[0x00, 0x00, 0xEE])).unwrap();
        assert_eq!(
            run(eng.write_sequence(&[0x00, 0x01, 0xFF])),
            Err(TransferError::SlaveBusy)
        );
        // The slave never saw a half-delivered frame
        assert_eq!(slave.accepted.borrow().len(), 1);
    }

    #[test]
    fn register_access_is_layered_on_single_transactions() {
        let slave = SlowSlave::new(0x12, 5);
        let mut eng = SlaveBus::new(
            SlaveHandle(&slave),
            TickingDelay {
                clock_ms: &slave.clock_ms,
            },
            0x12,
            25,
        );

        // write_byte sends register and value together
        run(eng.write_byte(0x00, 0x42)).unwrap();
        assert_eq!(slave.accepted.borrow()[0].as_slice(), &[0x00, 0x42]);
    }
}
