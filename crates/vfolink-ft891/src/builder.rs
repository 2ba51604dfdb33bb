//! Ft891Builder -- fluent builder for constructing [`Ft891`] instances.
//!
//! Separates configuration from connection so that callers can choose the
//! symbol rate and read timeout before the USB device is touched.
//!
//! # Example
//!
//! ```no_run
//! use vfolink_core::BaudRate;
//! use vfolink_ft891::Ft891Builder;
//!
//! # async fn example() -> vfolink_core::Result<()> {
//! let rig = Ft891Builder::new()
//!     .baud_rate(BaudRate::B38400)
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use vfolink_core::error::Result;
use vfolink_core::link::{SerialLink, READ_TIMEOUT};
use vfolink_core::types::BaudRate;
use vfolink_usb::Cp2105Link;

use crate::rig::Ft891;

/// Fluent builder for [`Ft891`].
///
/// Every knob has a default matching the rig's factory CAT settings, so
/// the simplest usage is `Ft891Builder::new().build().await?`.
pub struct Ft891Builder {
    baud_rate: BaudRate,
    read_timeout: Duration,
}

impl Ft891Builder {
    pub fn new() -> Self {
        Ft891Builder {
            baud_rate: BaudRate::default(),
            read_timeout: READ_TIMEOUT,
        }
    }

    /// Set the symbol rate applied during link bring-up (default 38400).
    ///
    /// Must match the rig's menu setting `05-06 CAT RATE`.
    pub fn baud_rate(mut self, rate: BaudRate) -> Self {
        self.baud_rate = rate;
        self
    }

    /// Override the per-read timeout (default [`READ_TIMEOUT`]).
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Build an [`Ft891`] over the first CP2105 bridge found on the bus.
    ///
    /// Opens the device, runs bring-up, and hands the initialized link to
    /// the driver.
    pub async fn build(self) -> Result<Ft891> {
        let link = Cp2105Link::open_first()
            .await?
            .with_baud_rate(self.baud_rate)
            .with_read_timeout(self.read_timeout);
        self.build_with_link(Box::new(link)).await
    }

    /// Build an [`Ft891`] with a caller-provided link.
    ///
    /// This is the primary entry point for testing (pass a
    /// `MockSerialLink` from `vfolink-test-harness`) and for advanced use
    /// cases where the caller discovers the device itself. The link is
    /// initialized here; the builder's rate and timeout settings apply
    /// only to links built by [`build`](Self::build).
    pub async fn build_with_link(self, mut link: Box<dyn SerialLink>) -> Result<Ft891> {
        link.initialize().await?;
        Ok(Ft891::new(link))
    }
}

impl Default for Ft891Builder {
    fn default() -> Self {
        Self::new()
    }
}
