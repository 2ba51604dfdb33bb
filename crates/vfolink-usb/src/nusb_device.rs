//! `nusb`-backed [`UsbDevice`] adapter.
//!
//! Thin glue between the [`UsbDevice`] collaborator trait and the `nusb`
//! host stack: enumeration filtered to the Silicon Labs vendor id, vendor
//! control transfers for bring-up, and bulk transfers for the UART data
//! path. No protocol logic lives here.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, trace};

use nusb::transfer::{Bulk, ControlOut, ControlType, In, Out, Recipient};
use nusb::{Device, DeviceInfo, Endpoint, Interface};

use vfolink_core::error::{Error, Result};
use vfolink_core::usb::UsbDevice;

/// Silicon Labs vendor id; the CP2105 enumerates under it.
pub const CP2105_VID: u16 = 0x10C4;

/// Timeout for a single vendor control transfer.
const CONTROL_TIMEOUT: Duration = Duration::from_millis(1_000);

/// How long one bulk IN poll waits before reporting "no data yet".
///
/// Short relative to the link read timeout so the read loop's cooperative
/// deadline check stays responsive even against a silent device.
const BULK_IN_POLL: Duration = Duration::from_millis(20);

/// A physical USB device driven through `nusb`.
pub struct NusbDevice {
    info: DeviceInfo,
    device: Option<Device>,
    interface: Option<Interface>,
    ep_in: Option<Endpoint<Bulk, In>>,
    ep_out: Option<Endpoint<Bulk, Out>>,
    /// Whether a bulk IN transfer is already submitted and pending.
    in_flight: bool,
}

impl NusbDevice {
    /// Wrap an enumerated device without opening it.
    pub fn from_info(info: DeviceInfo) -> Self {
        NusbDevice {
            info,
            device: None,
            interface: None,
            ep_in: None,
            ep_out: None,
            in_flight: false,
        }
    }

    /// Find the first CP2105 on the bus.
    ///
    /// Picks by vendor id only; choosing among multiple attached bridges
    /// is the caller's problem.
    pub async fn find_first() -> Result<Self> {
        let info = nusb::list_devices()
            .await
            .map_err(|e| Error::Transport(format!("failed to list USB devices: {e}")))?
            .find(|dev| dev.vendor_id() == CP2105_VID)
            .ok_or_else(|| Error::Transport("no CP2105 device found".into()))?;

        debug!(
            vendor_id = format_args!("{:04x}", info.vendor_id()),
            product_id = format_args!("{:04x}", info.product_id()),
            "found CP2105"
        );
        Ok(Self::from_info(info))
    }

    fn device_ref(&self) -> Result<&Device> {
        self.device.as_ref().ok_or(Error::NotConnected)
    }
}

#[async_trait]
impl UsbDevice for NusbDevice {
    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn has_active_configuration(&self) -> bool {
        self.device
            .as_ref()
            .is_some_and(|d| d.active_configuration().is_ok())
    }

    async fn open(&mut self) -> Result<()> {
        let device = self
            .info
            .open()
            .await
            .map_err(|e| Error::Transport(format!("failed to open device: {e}")))?;
        self.device = Some(device);
        Ok(())
    }

    async fn select_configuration(&mut self, index: u8) -> Result<()> {
        let device = self.device_ref()?;
        let value = device
            .configurations()
            .nth(index as usize)
            .map(|c| c.configuration_value())
            .ok_or_else(|| {
                Error::Transport(format!("device has no configuration at index {index}"))
            })?;
        device
            .set_configuration(value)
            .await
            .map_err(|e| Error::Transport(format!("failed to select configuration: {e}")))
    }

    fn interface_numbers(&self) -> Vec<u8> {
        let Some(device) = self.device.as_ref() else {
            return Vec::new();
        };
        let Ok(config) = device.active_configuration() else {
            return Vec::new();
        };
        config.interfaces().map(|i| i.interface_number()).collect()
    }

    async fn claim_interface(&mut self, number: u8) -> Result<()> {
        let interface = self
            .device_ref()?
            .claim_interface(number)
            .await
            .map_err(|e| Error::Transport(format!("failed to claim interface {number}: {e}")))?;
        self.interface = Some(interface);
        Ok(())
    }

    async fn control_out(&mut self, request: u8, value: u16, data: &[u8]) -> Result<()> {
        let interface = self.interface.as_ref().ok_or(Error::NotConnected)?;
        interface
            .control_out(
                ControlOut {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index: 0,
                    data,
                },
                CONTROL_TIMEOUT,
            )
            .await
            .map_err(|e| Error::Transport(format!("control transfer 0x{request:02x} failed: {e}")))
    }

    async fn bulk_out(&mut self, endpoint: u8, data: &[u8]) -> Result<()> {
        if self.ep_out.is_none() {
            let interface = self.interface.as_ref().ok_or(Error::NotConnected)?;
            self.ep_out = Some(
                interface
                    .endpoint::<Bulk, Out>(endpoint)
                    .map_err(|e| Error::Transport(format!("bulk OUT endpoint: {e}")))?,
            );
        }
        let ep = self.ep_out.as_mut().ok_or(Error::NotConnected)?;

        let mut buffer = ep.allocate(data.len());
        buffer.extend_from_slice(data);
        ep.submit(buffer);

        let completion = ep.next_complete().await;
        completion
            .status
            .map_err(|e| Error::Transport(format!("bulk OUT transfer failed: {e:?}")))?;
        trace!(bytes = data.len(), "bulk OUT complete");
        Ok(())
    }

    async fn bulk_in(&mut self, endpoint: u8, max_len: usize) -> Result<Vec<u8>> {
        if self.ep_in.is_none() {
            let interface = self.interface.as_ref().ok_or(Error::NotConnected)?;
            self.ep_in = Some(
                interface
                    .endpoint::<Bulk, In>(0x80 | endpoint)
                    .map_err(|e| Error::Transport(format!("bulk IN endpoint: {e}")))?,
            );
        }
        let ep = self.ep_in.as_mut().ok_or(Error::NotConnected)?;

        // Keep at most one transfer pending; resubmitting every poll would
        // pile up requests against a silent device.
        if !self.in_flight {
            let buffer = ep.allocate(max_len);
            ep.submit(buffer);
            self.in_flight = true;
        }

        match tokio::time::timeout(BULK_IN_POLL, ep.next_complete()).await {
            Ok(completion) => {
                self.in_flight = false;
                completion
                    .status
                    .map_err(|e| Error::Transport(format!("bulk IN transfer failed: {e:?}")))?;
                let n = completion.actual_len;
                trace!(bytes = n, "bulk IN complete");
                Ok(completion.buffer[..n].to_vec())
            }
            // Transfer still pending; the caller sees "no data yet".
            Err(_) => Ok(Vec::new()),
        }
    }

    async fn close(&mut self) -> Result<()> {
        debug!("releasing USB device");
        self.ep_in = None;
        self.ep_out = None;
        self.interface = None;
        self.device = None;
        self.in_flight = false;
        Ok(())
    }
}
