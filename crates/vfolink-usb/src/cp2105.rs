//! CP2105 transport: initialization, bring-up, and line-framed reads.
//!
//! [`Cp2105Link`] implements [`SerialLink`] on top of a [`UsbDevice`]. The
//! device trait keeps this module free of any concrete USB stack, so the
//! whole bring-up sequence and the delimiter read loop run unchanged
//! against `MockUsbDevice` in tests and [`NusbDevice`](crate::NusbDevice)
//! in production.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use vfolink_core::error::{Error, Result};
use vfolink_core::link::{SerialLink, READ_TIMEOUT};
use vfolink_core::types::BaudRate;
use vfolink_core::usb::UsbDevice;

use crate::nusb_device::NusbDevice;

// Vendor control requests, per Silicon Labs AN571.
const IFC_ENABLE: u8 = 0x00;
const SET_MHS: u8 = 0x07;
const SET_BAUDRATE: u8 = 0x1E;

/// IFC_ENABLE value: bit 0 enables the UART.
const IFC_ENABLE_ON: u16 = 0x0001;

/// SET_MHS value asserting DTR and RTS. The low byte is the write mask,
/// the next bits carry the line states.
const MHS_DTR_RTS_READY: u16 = 0b11_0000_0011;

/// Both bulk endpoints of the ECI port are endpoint 1.
const BULK_ENDPOINT: u8 = 1;

/// Bulk IN request size. The ECI port's max packet size is smaller, so a
/// single transfer never returns more than one packet's worth.
const READ_CHUNK: usize = 64;

/// A CP2105 USB-UART bridge as a [`SerialLink`].
pub struct Cp2105Link {
    device: Box<dyn UsbDevice>,
    baud_rate: BaudRate,
    read_timeout: Duration,
}

impl Cp2105Link {
    /// Wrap an already-discovered USB device.
    ///
    /// The link is unusable until [`initialize`](SerialLink::initialize)
    /// has run.
    pub fn new(device: Box<dyn UsbDevice>) -> Self {
        Cp2105Link {
            device,
            baud_rate: BaudRate::default(),
            read_timeout: READ_TIMEOUT,
        }
    }

    /// Open the first CP2105 found on the bus.
    pub async fn open_first() -> Result<Self> {
        let device = NusbDevice::find_first().await?;
        Ok(Self::new(Box::new(device)))
    }

    /// Set the symbol rate applied during bring-up (default 38400).
    pub fn with_baud_rate(mut self, rate: BaudRate) -> Self {
        self.baud_rate = rate;
        self
    }

    /// Override the read timeout (default [`READ_TIMEOUT`]).
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// The currently configured symbol rate.
    pub fn baud_rate(&self) -> BaudRate {
        self.baud_rate
    }

    /// The one-time bring-up sequence.
    ///
    /// Three blocking control exchanges, in order: enable the UART
    /// interface, assert the DTR/RTS handshake lines, apply the initial
    /// symbol rate. Any failure aborts initialization; no step is retried.
    async fn bring_up(&mut self) -> Result<()> {
        debug!("enabling UART interface");
        self.device.control_out(IFC_ENABLE, IFC_ENABLE_ON, &[]).await?;

        debug!("asserting DTR/RTS handshake lines");
        self.device.control_out(SET_MHS, MHS_DTR_RTS_READY, &[]).await?;

        let rate = self.baud_rate;
        debug!(baud = %rate, "applying initial symbol rate");
        self.apply_baud_rate(rate).await
    }

    async fn apply_baud_rate(&mut self, rate: BaudRate) -> Result<()> {
        // The rate rides in the data stage because it exceeds the 16-bit
        // wValue field.
        let payload = rate.as_u32().to_le_bytes();
        self.device.control_out(SET_BAUDRATE, 0, &payload).await?;
        self.baud_rate = rate;
        Ok(())
    }
}

#[async_trait]
impl SerialLink for Cp2105Link {
    async fn initialize(&mut self) -> Result<()> {
        if !self.device.is_open() {
            debug!("opening USB device");
            self.device.open().await?;
        }

        if !self.device.has_active_configuration() {
            debug!("selecting configuration 0");
            self.device.select_configuration(0).await?;
        }

        // The ECI port enumerates first and carries the small-packet bulk
        // endpoints; the SCI port is left untouched.
        let interface = self
            .device
            .interface_numbers()
            .first()
            .copied()
            .ok_or_else(|| Error::Transport("device exposes no interfaces".into()))?;
        debug!(interface, "claiming interface");
        self.device.claim_interface(interface).await?;

        self.bring_up().await
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        trace!(bytes = data.len(), data = ?data, "bulk write");
        self.device.bulk_out(BULK_ENDPOINT, data).await
    }

    async fn read_until(&mut self, delimiter: char) -> Result<Option<String>> {
        let deadline = Instant::now() + self.read_timeout;
        let mut result = String::new();

        loop {
            // Cooperative deadline: sampled between transfers only, so the
            // worst case is the timeout plus one more poll.
            if Instant::now() >= deadline {
                trace!(
                    partial_len = result.len(),
                    "read timed out, discarding partial data"
                );
                return Ok(None);
            }

            let chunk = self.device.bulk_in(BULK_ENDPOINT, READ_CHUNK).await?;
            if chunk.is_empty() {
                // No data yet; not a frame terminator, not an error.
                continue;
            }

            result.push_str(&String::from_utf8_lossy(&chunk));
            trace!(accumulated = %result, "received chunk");

            if result.ends_with(delimiter) {
                return Ok(Some(result));
            }
        }
    }

    async fn set_baud_rate(&mut self, rate: BaudRate) -> Result<()> {
        debug!(baud = %rate, "setting symbol rate");
        self.apply_baud_rate(rate).await
    }

    async fn close(&mut self) -> Result<()> {
        debug!("closing USB device");
        self.device.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vfolink_test_harness::{FailPoint, MockUsbDevice, UsbCall};

    fn make_link(handle: &MockUsbDevice) -> Cp2105Link {
        Cp2105Link::new(Box::new(handle.clone()))
    }

    // -----------------------------------------------------------------
    // initialize / bring-up
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn initialize_runs_full_sequence() {
        let handle = MockUsbDevice::new();
        let mut link = make_link(&handle);

        link.initialize().await.unwrap();

        assert_eq!(
            handle.calls(),
            vec![
                UsbCall::Open,
                UsbCall::SelectConfiguration(0),
                UsbCall::ClaimInterface(0),
                UsbCall::ControlOut {
                    request: IFC_ENABLE,
                    value: 0x0001,
                    data: vec![],
                },
                UsbCall::ControlOut {
                    request: SET_MHS,
                    value: 0x0303,
                    data: vec![],
                },
                UsbCall::ControlOut {
                    request: SET_BAUDRATE,
                    value: 0,
                    data: 38_400u32.to_le_bytes().to_vec(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn initialize_skips_open_and_configuration_when_already_done() {
        let handle = MockUsbDevice::new();
        handle.preopen();
        let mut link = make_link(&handle);

        link.initialize().await.unwrap();

        let calls = handle.calls();
        assert!(!calls.contains(&UsbCall::Open));
        assert!(!calls.contains(&UsbCall::SelectConfiguration(0)));
        assert_eq!(calls[0], UsbCall::ClaimInterface(0));
    }

    #[tokio::test]
    async fn initialize_applies_configured_baud_rate() {
        let handle = MockUsbDevice::new();
        let mut link = make_link(&handle).with_baud_rate(BaudRate::B4800);

        link.initialize().await.unwrap();

        assert!(handle.calls().contains(&UsbCall::ControlOut {
            request: SET_BAUDRATE,
            value: 0,
            data: 4_800u32.to_le_bytes().to_vec(),
        }));
    }

    #[tokio::test]
    async fn initialize_aborts_on_configuration_failure() {
        let handle = MockUsbDevice::new();
        handle.fail_on(FailPoint::SelectConfiguration);
        let mut link = make_link(&handle);

        let result = link.initialize().await;
        assert!(matches!(result.unwrap_err(), Error::Transport(_)));

        // No interface claimed, no bring-up control transfers attempted.
        assert!(handle.claimed_interfaces().is_empty());
        assert!(!handle
            .calls()
            .iter()
            .any(|c| matches!(c, UsbCall::ControlOut { .. })));
    }

    #[tokio::test]
    async fn initialize_aborts_on_bring_up_failure() {
        let handle = MockUsbDevice::new();
        let mut link = make_link(&handle);

        // Fail the first control transfer (IFC_ENABLE) after claim succeeds.
        handle.fail_on(FailPoint::ControlOut);

        let result = link.initialize().await;
        assert!(result.is_err());

        // The sequence stopped at the failed step: exactly one control
        // transfer was attempted.
        let controls = handle
            .calls()
            .iter()
            .filter(|c| matches!(c, UsbCall::ControlOut { .. }))
            .count();
        assert_eq!(controls, 1);
    }

    // -----------------------------------------------------------------
    // read_until
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn read_until_assembles_split_chunks() {
        let handle = MockUsbDevice::new();
        handle.preopen();
        let mut link = make_link(&handle);

        handle.push_inbound(b"FA0142");
        handle.push_inbound(b"50000;");

        let frame = link.read_until(';').await.unwrap();
        assert_eq!(frame.as_deref(), Some("FA014250000;"));
    }

    #[tokio::test]
    async fn read_until_skips_zero_length_chunks() {
        let handle = MockUsbDevice::new();
        handle.preopen();
        let mut link = make_link(&handle);

        handle.push_inbound(b"FA01425");
        handle.push_inbound(b"");
        handle.push_inbound(b"0000;");

        let frame = link.read_until(';').await.unwrap();
        assert_eq!(frame.as_deref(), Some("FA014250000;"));
    }

    #[tokio::test]
    async fn read_until_leading_zero_chunks_are_not_an_empty_frame() {
        let handle = MockUsbDevice::new();
        handle.preopen();
        let mut link = make_link(&handle);

        handle.push_inbound(b"");
        handle.push_inbound(b"");
        handle.push_inbound(b"FA000030000;");

        let frame = link.read_until(';').await.unwrap();
        assert_eq!(frame.as_deref(), Some("FA000030000;"));
    }

    #[tokio::test]
    async fn read_until_times_out_and_discards_partial_data() {
        let handle = MockUsbDevice::new();
        handle.preopen();
        // Emulate bus latency so the loop isn't a busy spin.
        handle.set_chunk_delay(Duration::from_millis(5));
        let mut link = make_link(&handle);

        // Data arrives, but the terminator never does.
        handle.push_inbound(b"FA0142");

        let started = Instant::now();
        let frame = link.read_until(';').await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(frame, None);
        assert!(
            elapsed >= READ_TIMEOUT,
            "returned before the timeout: {elapsed:?}"
        );
        assert!(
            elapsed < READ_TIMEOUT * 5,
            "returned far after the timeout: {elapsed:?}"
        );
    }

    // -----------------------------------------------------------------
    // write / set_baud_rate / close
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn write_adds_no_framing() {
        let handle = MockUsbDevice::new();
        handle.preopen();
        let mut link = make_link(&handle);

        link.write(b"FA;").await.unwrap();

        assert_eq!(
            handle.calls(),
            vec![UsbCall::BulkOut {
                endpoint: BULK_ENDPOINT,
                data: b"FA;".to_vec(),
            }]
        );
    }

    #[tokio::test]
    async fn set_baud_rate_sends_rate_as_payload() {
        let handle = MockUsbDevice::new();
        handle.preopen();
        let mut link = make_link(&handle);

        link.set_baud_rate(BaudRate::B19200).await.unwrap();

        assert_eq!(
            handle.calls(),
            vec![UsbCall::ControlOut {
                request: SET_BAUDRATE,
                value: 0,
                data: 19_200u32.to_le_bytes().to_vec(),
            }]
        );
        assert_eq!(link.baud_rate(), BaudRate::B19200);
    }

    #[tokio::test]
    async fn operations_after_close_fail_instead_of_hanging() {
        let handle = MockUsbDevice::new();
        handle.preopen();
        let mut link = make_link(&handle);

        link.close().await.unwrap();

        assert!(matches!(
            link.write(b"FA;").await.unwrap_err(),
            Error::NotConnected
        ));
        assert!(matches!(
            link.read_until(';').await.unwrap_err(),
            Error::NotConnected
        ));
    }
}
