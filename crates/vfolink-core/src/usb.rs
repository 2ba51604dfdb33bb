//! The `UsbDevice` trait -- collaborator boundary for USB bridge chips.
//!
//! This is the seam between the CP2105 transport logic and the host USB
//! stack. The method set mirrors what a USB-serial bring-up actually needs:
//! open, configuration select, interface claim, vendor control transfers,
//! and bulk in/out. `vfolink-usb` provides the real `nusb`-backed adapter;
//! `vfolink-test-harness` provides a scripted fake so the bring-up sequence
//! and read loop are unit-testable without hardware.

use async_trait::async_trait;

use crate::error::Result;

/// One physical USB device, addressed at the transfer level.
///
/// All transfer methods are blocking calls returning success or failure;
/// `bulk_in` additionally returns a byte buffer of variable length,
/// possibly zero when no data is pending.
#[async_trait]
pub trait UsbDevice: Send + Sync {
    /// Whether the device handle is currently open.
    fn is_open(&self) -> bool;

    /// Whether a configuration has already been selected.
    fn has_active_configuration(&self) -> bool;

    /// Open the device handle.
    async fn open(&mut self) -> Result<()>;

    /// Select the configuration at the given index.
    async fn select_configuration(&mut self, index: u8) -> Result<()>;

    /// Interface numbers of the active configuration, in enumeration order.
    fn interface_numbers(&self) -> Vec<u8>;

    /// Claim the interface with the given number.
    async fn claim_interface(&mut self, number: u8) -> Result<()>;

    /// Issue a vendor control OUT request to the device.
    ///
    /// `data` carries any payload too wide for the 16-bit `value` field
    /// (the CP2105 baud rate, for instance); it is empty for requests that
    /// fit entirely in `value`.
    async fn control_out(&mut self, request: u8, value: u16, data: &[u8]) -> Result<()>;

    /// Transmit bytes on a bulk OUT endpoint.
    async fn bulk_out(&mut self, endpoint: u8, data: &[u8]) -> Result<()>;

    /// Read up to `max_len` bytes from a bulk IN endpoint.
    ///
    /// Returns an empty buffer when the device has nothing to send right
    /// now; callers treat that as "no data yet", not end-of-stream.
    async fn bulk_in(&mut self, endpoint: u8, max_len: usize) -> Result<Vec<u8>>;

    /// Release the device handle.
    async fn close(&mut self) -> Result<()>;
}
