//! Mock USB device for testing the CP2105 transport without hardware.
//!
//! [`MockUsbDevice`] records every collaborator call in order, serves
//! scripted inbound bulk chunks (including zero-length ones), and can be
//! told to fail at a specific call so initialization-abort paths are
//! testable.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vfolink_core::error::{Error, Result};
use vfolink_core::usb::UsbDevice;

/// One recorded collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsbCall {
    Open,
    SelectConfiguration(u8),
    ClaimInterface(u8),
    ControlOut { request: u8, value: u16, data: Vec<u8> },
    BulkOut { endpoint: u8, data: Vec<u8> },
    BulkIn { endpoint: u8 },
    Close,
}

/// The call at which the mock should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Open,
    SelectConfiguration,
    ClaimInterface,
    ControlOut,
    BulkOut,
    BulkIn,
}

#[derive(Debug, Default)]
struct UsbState {
    open: bool,
    configured: bool,
    claimed: Vec<u8>,
    interface_numbers: Vec<u8>,
    inbound: VecDeque<Vec<u8>>,
    chunk_delay: Option<Duration>,
    fail_on: Option<FailPoint>,
    call_log: Vec<UsbCall>,
}

/// A scripted [`UsbDevice`] standing in for a CP2105 on the bus.
///
/// Starts closed and unconfigured, like a freshly enumerated device. The
/// default configuration exposes interfaces `[0, 1]` (ECI then SCI, as the
/// CP2105 enumerates them). Cloneable; clones share state for post-hoc
/// inspection.
#[derive(Debug, Clone)]
pub struct MockUsbDevice {
    inner: Arc<Mutex<UsbState>>,
}

impl MockUsbDevice {
    pub fn new() -> Self {
        MockUsbDevice {
            inner: Arc::new(Mutex::new(UsbState {
                interface_numbers: vec![0, 1],
                ..Default::default()
            })),
        }
    }

    /// Queue a chunk to be returned by a future `bulk_in` call.
    ///
    /// An empty slice queues a zero-length chunk ("no data yet"). Once the
    /// queue is exhausted, `bulk_in` keeps returning zero-length chunks.
    pub fn push_inbound(&self, chunk: &[u8]) {
        self.inner.lock().unwrap().inbound.push_back(chunk.to_vec());
    }

    /// Delay applied inside every `bulk_in` call, emulating bus latency.
    pub fn set_chunk_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().chunk_delay = Some(delay);
    }

    /// Make the next matching call fail with a `Transport` error.
    pub fn fail_on(&self, point: FailPoint) {
        self.inner.lock().unwrap().fail_on = Some(point);
    }

    /// All collaborator calls made so far, in order.
    pub fn calls(&self) -> Vec<UsbCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    /// Interfaces claimed so far.
    pub fn claimed_interfaces(&self) -> Vec<u8> {
        self.inner.lock().unwrap().claimed.clone()
    }

    /// Mark the device as already open and configured, as if a previous
    /// initialization got that far.
    pub fn preopen(&self) {
        let mut state = self.inner.lock().unwrap();
        state.open = true;
        state.configured = true;
    }

    fn check_fail(state: &mut UsbState, point: FailPoint, what: &str) -> Result<()> {
        if state.fail_on == Some(point) {
            state.fail_on = None;
            return Err(Error::Transport(format!("{what} failed (injected)")));
        }
        Ok(())
    }
}

impl Default for MockUsbDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsbDevice for MockUsbDevice {
    fn is_open(&self) -> bool {
        self.inner.lock().unwrap().open
    }

    fn has_active_configuration(&self) -> bool {
        self.inner.lock().unwrap().configured
    }

    async fn open(&mut self) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.call_log.push(UsbCall::Open);
        Self::check_fail(&mut state, FailPoint::Open, "open")?;
        state.open = true;
        Ok(())
    }

    async fn select_configuration(&mut self, index: u8) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.call_log.push(UsbCall::SelectConfiguration(index));
        Self::check_fail(&mut state, FailPoint::SelectConfiguration, "select_configuration")?;
        state.configured = true;
        Ok(())
    }

    fn interface_numbers(&self) -> Vec<u8> {
        self.inner.lock().unwrap().interface_numbers.clone()
    }

    async fn claim_interface(&mut self, number: u8) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.call_log.push(UsbCall::ClaimInterface(number));
        Self::check_fail(&mut state, FailPoint::ClaimInterface, "claim_interface")?;
        state.claimed.push(number);
        Ok(())
    }

    async fn control_out(&mut self, request: u8, value: u16, data: &[u8]) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.call_log.push(UsbCall::ControlOut {
            request,
            value,
            data: data.to_vec(),
        });
        Self::check_fail(&mut state, FailPoint::ControlOut, "control_out")?;
        if !state.open {
            return Err(Error::NotConnected);
        }
        Ok(())
    }

    async fn bulk_out(&mut self, endpoint: u8, data: &[u8]) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.call_log.push(UsbCall::BulkOut {
            endpoint,
            data: data.to_vec(),
        });
        Self::check_fail(&mut state, FailPoint::BulkOut, "bulk_out")?;
        if !state.open {
            return Err(Error::NotConnected);
        }
        Ok(())
    }

    async fn bulk_in(&mut self, endpoint: u8, _max_len: usize) -> Result<Vec<u8>> {
        let (chunk, delay) = {
            let mut state = self.inner.lock().unwrap();
            state.call_log.push(UsbCall::BulkIn { endpoint });
            Self::check_fail(&mut state, FailPoint::BulkIn, "bulk_in")?;
            if !state.open {
                return Err(Error::NotConnected);
            }
            (state.inbound.pop_front().unwrap_or_default(), state.chunk_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(chunk)
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.call_log.push(UsbCall::Close);
        state.open = false;
        state.configured = false;
        state.claimed.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_order() {
        let handle = MockUsbDevice::new();
        let mut dev = handle.clone();

        dev.open().await.unwrap();
        dev.select_configuration(0).await.unwrap();
        dev.claim_interface(0).await.unwrap();

        assert_eq!(
            handle.calls(),
            vec![
                UsbCall::Open,
                UsbCall::SelectConfiguration(0),
                UsbCall::ClaimInterface(0),
            ]
        );
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let handle = MockUsbDevice::new();
        let mut dev = handle.clone();
        handle.fail_on(FailPoint::Open);

        assert!(dev.open().await.is_err());
        assert!(dev.open().await.is_ok());
    }

    #[tokio::test]
    async fn bulk_in_drains_then_returns_empty() {
        let handle = MockUsbDevice::new();
        let mut dev = handle.clone();
        dev.open().await.unwrap();
        handle.push_inbound(b"FA");

        assert_eq!(dev.bulk_in(1, 64).await.unwrap(), b"FA");
        assert_eq!(dev.bulk_in(1, 64).await.unwrap(), Vec::<u8>::new());
    }
}
