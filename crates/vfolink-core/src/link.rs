//! The `SerialLink` trait -- line-framed byte transport to a radio.
//!
//! [`SerialLink`] abstracts over the physical link carrying CAT traffic.
//! The concrete implementation in `vfolink-usb` drives a CP2105 USB-UART
//! bridge; tests substitute `MockSerialLink` from `vfolink-test-harness`.
//!
//! Protocol drivers (e.g. the FT-891 driver in `vfolink-ft891`) operate on
//! a `SerialLink` rather than on a USB device directly, so the same driver
//! runs against real hardware and deterministic mocks.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;
use crate::types::BaudRate;

/// How long a [`read_until`](SerialLink::read_until) call waits for the
/// delimiter before giving up and reporting "no response".
///
/// The deadline is sampled cooperatively -- only between successive inbound
/// transfers -- so the effective maximum wait is this timeout plus the
/// latency of one more poll.
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Asynchronous line-framed transport to a radio.
///
/// Implementations handle device bring-up and byte-level I/O. Command
/// structure, range validation, and exchange serialization are handled one
/// layer up by the protocol driver -- `SerialLink` itself performs no
/// locking, and concurrent callers must not share one instance without
/// external exclusion.
#[async_trait]
pub trait SerialLink: Send + Sync {
    /// Open and prepare the underlying link.
    ///
    /// Idempotent with respect to an already-open device: opening and
    /// configuration selection are skipped when already done. Collaborator
    /// failures (open, configuration select, interface claim, bring-up
    /// control transfers) propagate to the caller and are not retried.
    async fn initialize(&mut self) -> Result<()>;

    /// Transmit raw bytes on the outbound endpoint.
    ///
    /// No framing is added; the caller supplies any terminator.
    async fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Accumulate inbound bytes until the decoded text ends with
    /// `delimiter`, or [`READ_TIMEOUT`] elapses.
    ///
    /// Returns `Ok(Some(frame))` with the full frame including the
    /// delimiter, or `Ok(None)` on timeout -- partial data is discarded,
    /// never returned. Zero-length inbound chunks mean "no data yet" and
    /// are retried without terminating the read.
    async fn read_until(&mut self, delimiter: char) -> Result<Option<String>>;

    /// Reconfigure the link's symbol rate.
    ///
    /// Fire-and-forget: the new rate is not read back from the hardware
    /// for confirmation.
    async fn set_baud_rate(&mut self, rate: BaudRate) -> Result<()>;

    /// Release the underlying link.
    ///
    /// Not guaranteed idempotent; callers track open state themselves.
    /// Subsequent operations return [`Error::NotConnected`](crate::Error::NotConnected)
    /// rather than hanging.
    async fn close(&mut self) -> Result<()>;
}
