//! Mock serial links for deterministic testing of protocol drivers.
//!
//! [`MockSerialLink`] plays back pre-loaded request/reply pairs and records
//! everything written through it. [`EchoLink`] emulates a Yaesu rig's
//! read-back behavior: the last set command written is returned as the
//! reply to the next query.
//!
//! Both types are cheaply cloneable; clones share state, so a test can keep
//! a handle for inspection after moving the link into a driver.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vfolink_core::error::{Error, Result};
use vfolink_core::link::SerialLink;
use vfolink_core::types::BaudRate;

/// A pre-loaded request/reply pair.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be written.
    request: Vec<u8>,
    /// The frame to return from the next `read_until`, or `None` to
    /// simulate a read timeout.
    reply: Option<String>,
    /// Artificial latency before the reply is delivered.
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    pending_reply: Option<(Option<String>, Option<Duration>)>,
    connected: bool,
    initialized: bool,
    sent_log: Vec<Vec<u8>>,
    baud_log: Vec<BaudRate>,
}

/// A scripted [`SerialLink`] for testing drivers without hardware.
///
/// Expectations are consumed in order: `write()` matches the next
/// expectation and arms its reply for the following `read_until()` call.
/// Writes with no expectations queued succeed and are only recorded, which
/// keeps fire-and-forget tests (and "performed zero writes" assertions)
/// free of boilerplate.
#[derive(Debug, Clone)]
pub struct MockSerialLink {
    inner: Arc<Mutex<MockState>>,
}

impl MockSerialLink {
    /// Create a new mock link in the connected state.
    pub fn new() -> Self {
        MockSerialLink {
            inner: Arc::new(Mutex::new(MockState {
                connected: true,
                ..Default::default()
            })),
        }
    }

    /// Add an expected request/reply pair.
    ///
    /// Pass `None` as the reply to simulate a radio that never answers.
    pub fn expect(&self, request: &[u8], reply: Option<&str>) {
        self.inner.lock().unwrap().expectations.push_back(Expectation {
            request: request.to_vec(),
            reply: reply.map(str::to_string),
            delay: None,
        });
    }

    /// Like [`expect`](Self::expect), but the reply is delivered only after
    /// `delay` elapses. Useful for forcing overlap in concurrency tests.
    pub fn expect_with_delay(&self, request: &[u8], reply: Option<&str>, delay: Duration) {
        self.inner.lock().unwrap().expectations.push_back(Expectation {
            request: request.to_vec(),
            reply: reply.map(str::to_string),
            delay: Some(delay),
        });
    }

    /// All data written through this link, one element per `write()` call,
    /// in order.
    pub fn sent_data(&self) -> Vec<Vec<u8>> {
        self.inner.lock().unwrap().sent_log.clone()
    }

    /// Every rate passed to `set_baud_rate`, in order.
    pub fn baud_changes(&self) -> Vec<BaudRate> {
        self.inner.lock().unwrap().baud_log.clone()
    }

    /// Number of expectations not yet consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.inner.lock().unwrap().expectations.len()
    }

    /// Whether `initialize` has been called on this link.
    pub fn initialized(&self) -> bool {
        self.inner.lock().unwrap().initialized
    }

    /// Force the connected state (e.g. to test post-close behavior).
    pub fn set_connected(&self, connected: bool) {
        self.inner.lock().unwrap().connected = connected;
    }
}

impl Default for MockSerialLink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SerialLink for MockSerialLink {
    async fn initialize(&mut self) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        if !state.connected {
            return Err(Error::NotConnected);
        }
        state.initialized = true;
        Ok(())
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        if !state.connected {
            return Err(Error::NotConnected);
        }
        state.sent_log.push(data.to_vec());

        if let Some(expectation) = state.expectations.pop_front() {
            if data != expectation.request.as_slice() {
                return Err(Error::Protocol(format!(
                    "unexpected write: expected {:02X?}, got {:02X?}",
                    expectation.request, data
                )));
            }
            state.pending_reply = Some((expectation.reply, expectation.delay));
        }
        Ok(())
    }

    async fn read_until(&mut self, _delimiter: char) -> Result<Option<String>> {
        let pending = {
            let mut state = self.inner.lock().unwrap();
            if !state.connected {
                return Err(Error::NotConnected);
            }
            state.pending_reply.take()
        };

        match pending {
            Some((reply, delay)) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(reply)
            }
            // Nothing armed: behaves like a silent radio.
            None => Ok(None),
        }
    }

    async fn set_baud_rate(&mut self, rate: BaudRate) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        if !state.connected {
            return Err(Error::NotConnected);
        }
        state.baud_log.push(rate);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.connected = false;
        state.pending_reply = None;
        Ok(())
    }
}

/// A [`SerialLink`] that echoes the last set command back as the reply to
/// any subsequent read.
///
/// This matches how a Yaesu rig behaves for `FA` at the black-box level:
/// after `FA014250000;`, a `FA;` query yields `FA014250000;`.
#[derive(Debug, Clone)]
pub struct EchoLink {
    inner: Arc<Mutex<EchoState>>,
}

#[derive(Debug, Default)]
struct EchoState {
    last_set: Option<String>,
    connected: bool,
    sent_log: Vec<Vec<u8>>,
}

impl EchoLink {
    pub fn new() -> Self {
        EchoLink {
            inner: Arc::new(Mutex::new(EchoState {
                connected: true,
                ..Default::default()
            })),
        }
    }

    /// All data written through this link, in order.
    pub fn sent_data(&self) -> Vec<Vec<u8>> {
        self.inner.lock().unwrap().sent_log.clone()
    }
}

impl Default for EchoLink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SerialLink for EchoLink {
    async fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        if !state.connected {
            return Err(Error::NotConnected);
        }
        state.sent_log.push(data.to_vec());

        // A set command carries a payload between the prefix and the
        // terminator; a bare query like "FA;" does not.
        let text = String::from_utf8_lossy(data);
        if text.len() > 3 && text.ends_with(';') {
            state.last_set = Some(text.into_owned());
        }
        Ok(())
    }

    async fn read_until(&mut self, _delimiter: char) -> Result<Option<String>> {
        let state = self.inner.lock().unwrap();
        if !state.connected {
            return Err(Error::NotConnected);
        }
        Ok(state.last_set.clone())
    }

    async fn set_baud_rate(&mut self, _rate: BaudRate) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.inner.lock().unwrap().connected = false;
        Ok(())
    }
}
