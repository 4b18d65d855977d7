//! 24LC256-style serial EEPROM
//!
//! 32 KiB array behind a two-byte big-endian memory address. Writes are
//! page-bound: a single transaction may not cross a 64-byte page edge,
//! so the driver caps each write to the remainder of its page and
//! reports how much it took. Reads set the address with a repeated
//! start and stream from there.

use bytewire_core::device::{ByteDevice, DeviceError};
use bytewire_core::gate::Cancellation;
use bytewire_hal::i2c::{BusError, BusProvider, I2cBus};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::delay::DelayNs;

use super::{SlaveBus, TransferError};
use crate::config::EepromConfig;

/// Write page size in bytes
pub const PAGE_SIZE: usize = 64;

/// Driver for a 24LC256-style EEPROM
pub struct Eeprom24x<B: I2cBus, D: DelayNs> {
    bus: SlaveBus<B, D>,
}

impl<B: I2cBus, D: DelayNs> Eeprom24x<B, D> {
    /// Wrap a bound transaction engine
    pub fn new(bus: SlaveBus<B, D>) -> Self {
        Self { bus }
    }

    /// Write `data` starting at `addr`, within one page
    ///
    /// The memory address and payload travel in one transaction; the
    /// payload is capped to the bytes left in the addressed page.
    /// Returns how many payload bytes were written.
    pub async fn write_at(
        &mut self,
        addr: u16,
        data: &[u8],
    ) -> Result<usize, TransferError<B::Error>> {
        let page_remainder = PAGE_SIZE - (usize::from(addr) % PAGE_SIZE);
        let take = data.len().min(page_remainder);

        let mut frame = heapless::Vec::<u8, { 2 + PAGE_SIZE }>::new();
        // Capacity covers a full address plus a full page, so these
        // cannot fail
        let _ = frame.extend_from_slice(&addr.to_be_bytes());
        let _ = frame.extend_from_slice(&data[..take]);

        self.bus.write_sequence(&frame).await?;
        Ok(take)
    }

    /// Read `buf.len()` bytes starting at `addr`
    pub async fn read_at(
        &mut self,
        addr: u16,
        buf: &mut [u8],
    ) -> Result<(), TransferError<B::Error>> {
        self.bus.write_then_read(&addr.to_be_bytes(), buf).await
    }
}

/// Byte-stream front-end over the first EEPROM page
///
/// Writes land at the start of the array; reads stream back from the
/// same place. The engine sits behind an async mutex so concurrent
/// sessions serialize whole transactions, settle polling included.
pub struct EepromDevice<M: RawMutex, B: I2cBus, D: DelayNs> {
    eeprom: Mutex<M, Eeprom24x<B, D>>,
}

impl<M: RawMutex, B: I2cBus, D: DelayNs> EepromDevice<M, B, D> {
    pub fn new(eeprom: Eeprom24x<B, D>) -> Self {
        Self {
            eeprom: Mutex::new(eeprom),
        }
    }
}

/// Open the configured bus and bind the EEPROM on it
pub fn bind<'p, M, P, D>(
    adapters: &'p P,
    cfg: &EepromConfig,
    delay: D,
) -> Result<EepromDevice<M, P::Bus<'p>, D>, BusError>
where
    M: RawMutex,
    P: BusProvider,
    D: DelayNs,
{
    let bus = super::attach(adapters, cfg.bus, cfg.address, delay, cfg.max_settle_ms)?;
    Ok(EepromDevice::new(Eeprom24x::new(bus)))
}

impl<M, B, D> ByteDevice<M> for EepromDevice<M, B, D>
where
    M: RawMutex,
    B: I2cBus,
    D: DelayNs,
{
    async fn open(&self, _cancel: &Cancellation<M>) -> Result<(), DeviceError> {
        #[cfg(feature = "defmt")]
        defmt::info!("eeprom: session opened");
        Ok(())
    }

    async fn close(&self) -> Result<(), DeviceError> {
        #[cfg(feature = "defmt")]
        defmt::info!("eeprom: session closed");
        Ok(())
    }

    async fn read(&self, buf: &mut [u8], _cancel: &Cancellation<M>) -> Result<usize, DeviceError> {
        let take = buf.len().min(PAGE_SIZE);
        self.eeprom
            .lock()
            .await
            .read_at(0, &mut buf[..take])
            .await
            .map_err(|_| DeviceError::Transfer)?;
        Ok(take)
    }

    async fn write(&self, buf: &[u8]) -> Result<usize, DeviceError> {
        self.eeprom
            .lock()
            .await
            .write_at(0, buf)
            .await
            .map_err(|_| DeviceError::Transfer)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testbus::{SlaveHandle, SlowSlave, TickingDelay};
    use super::*;
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

    fn eeprom(slave: &SlowSlave) -> Eeprom24x<SlaveHandle<'_>, TickingDelay<'_>> {
        Eeprom24x::new(SlaveBus::new(
            SlaveHandle(slave),
            TickingDelay {
                clock_ms: &slave.clock_ms,
            },
            0x50,
            25,
        ))
    }

    #[test]
    fn address_and_payload_share_one_frame() {
        let slave = SlowSlave::new(0x50, 5);
        let mut mem = eeprom(&slave);

        assert_eq!(run(mem.write_at(0x0010, b"hive")), Ok(4));
        let accepted = slave.accepted.borrow();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].as_slice(), &[0x00, 0x10, b'h', b'i', b'v', b'e']);
    }

    #[test]
    fn writes_are_capped_at_the_page_edge() {
        let slave = SlowSlave::new(0x50, 5);
        let mut mem = eeprom(&slave);

        // Ten bytes from offset 60 fit only four before the edge
        let taken = run(mem.write_at(60, &[0xAB; 10])).unwrap();
        assert_eq!(taken, 4);
        assert_eq!(slave.accepted.borrow()[0].len(), 2 + 4);
    }

    #[test]
    fn read_back_returns_what_was_written() {
        let slave = SlowSlave::new(0x50, 5);
        let mut mem = eeprom(&slave);

        run(mem.write_at(0, b"persistent")).unwrap();

        let mut back = [0u8; 10];
        run(mem.read_at(0, &mut back)).unwrap();
        assert_eq!(&back, b"persistent");
    }

    #[test]
    fn device_write_then_read_round_trips_page_zero() {
        let slave = SlowSlave::new(0x50, 5);
        let device: EepromDevice<NoopRawMutex, _, _> = EepromDevice::new(eeprom(&slave));
        let cancel = Cancellation::new();

        assert_eq!(run(device.write(b"bytewire")), Ok(8));

        let mut buf = [0u8; 8];
        assert_eq!(run(device.read(&mut buf, &cancel)), Ok(8));
        assert_eq!(&buf, b"bytewire");
    }

    struct OneBus<'s>(&'s SlowSlave);

    impl BusProvider for OneBus<'_> {
        type Bus<'a>
            = SlaveHandle<'a>
        where
            Self: 'a;

        fn open_bus(&self, bus_number: u8) -> Result<SlaveHandle<'_>, BusError> {
            if bus_number == 2 {
                Ok(SlaveHandle(self.0))
            } else {
                Err(BusError::NoSuchBus(bus_number))
            }
        }
    }

    #[test]
    fn bind_opens_the_configured_bus() {
        let slave = SlowSlave::new(0x50, 5);
        let adapters = OneBus(&slave);
        let cfg = crate::config::EepromConfig::default();

        assert!(bind::<NoopRawMutex, _, _>(
            &adapters,
            &cfg,
            TickingDelay {
                clock_ms: &slave.clock_ms
            }
        )
        .is_ok());

        let missing = crate::config::EepromConfig { bus: 7, ..cfg };
        let err = bind::<NoopRawMutex, _, _>(
            &adapters,
            &missing,
            TickingDelay {
                clock_ms: &slave.clock_ms
            },
        )
        .err();
        assert_eq!(err, Some(BusError::NoSuchBus(7)));
    }

    #[test]
    fn oversized_device_read_is_bounded_to_one_page() {
        let slave = SlowSlave::new(0x50, 5);
        let device: EepromDevice<NoopRawMutex, _, _> = EepromDevice::new(eeprom(&slave));
        let cancel = Cancellation::new();

        let mut buf = [0u8; 100];
        assert_eq!(run(device.read(&mut buf, &cancel)), Ok(PAGE_SIZE));
    }
}
