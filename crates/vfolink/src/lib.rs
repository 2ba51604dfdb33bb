//! # vfolink -- Async VFO Control over USB
//!
//! `vfolink` drives the VFO of a Yaesu transceiver through its CP2105
//! USB-UART bridge, with no serial-port device node or kernel driver in
//! between. It is designed for logging software and SDR companion displays
//! that need to read and steer the radio's dial frequency.
//!
//! ## Quick Start
//!
//! Add `vfolink` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! vfolink = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Connect to the first FT-891 on the bus and read its frequency:
//!
//! ```no_run
//! use vfolink::RadioDriver;
//! use vfolink::ft891::Ft891Builder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let rig = Ft891Builder::new().build().await?;
//!
//!     match rig.get_frequency().await? {
//!         Some(freq) => println!("VFO-A: {} Hz", freq),
//!         None => println!("radio did not answer"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                  | Purpose                                          |
//! |------------------------|--------------------------------------------------|
//! | `vfolink-core`         | Traits ([`RadioDriver`], [`SerialLink`]), types, errors |
//! | `vfolink-usb`          | CP2105 bring-up and bulk transfer plumbing (nusb) |
//! | `vfolink-ft891`        | Yaesu FT-891 CAT text protocol driver            |
//! | `vfolink-test-harness` | Mock links and USB devices for driver tests      |
//! | **`vfolink`**          | This facade crate -- re-exports everything       |
//!
//! The driver implements the [`RadioDriver`] trait, so application code can
//! work with `dyn RadioDriver` and stay model-agnostic.
//!
//! ## Feature Flags
//!
//! | Feature | Enables                                | Default |
//! |---------|----------------------------------------|---------|
//! | `usb`   | [`usb`] module (CP2105 over nusb)      | yes     |
//! | `ft891` | [`ft891`] module (FT-891 CAT driver)   | yes     |
//!
//! ## Polling
//!
//! The FT-891 sends no unsolicited frequency reports, so change detection
//! is polling-based. [`VfoMonitor`] owns that loop and publishes the latest
//! reading through a watch channel:
//!
//! ```no_run
//! use std::sync::Arc;
//! use vfolink::VfoMonitor;
//! use vfolink::ft891::Ft891Builder;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let rig = Arc::new(Ft891Builder::new().build().await?);
//! let monitor = VfoMonitor::start(rig);
//!
//! let mut freq = monitor.subscribe();
//! while freq.changed().await.is_ok() {
//!     println!("VFO-A: {:?}", *freq.borrow());
//! }
//! # Ok(())
//! # }
//! ```

pub use vfolink_core::*;

pub mod monitor;
pub use monitor::VfoMonitor;

/// CP2105 USB-UART transport backend.
///
/// Provides [`Cp2105Link`](usb::Cp2105Link), a [`SerialLink`] over the
/// bridge's ECI port, and [`NusbDevice`](usb::NusbDevice), its userspace
/// USB binding.
#[cfg(feature = "usb")]
pub mod usb {
    pub use vfolink_usb::*;
}

/// Yaesu FT-891 CAT protocol backend.
///
/// Provides [`Ft891`](ft891::Ft891) and [`Ft891Builder`](ft891::Ft891Builder)
/// for controlling the FT-891 over the semicolon-terminated CAT text
/// protocol.
#[cfg(feature = "ft891")]
pub mod ft891 {
    pub use vfolink_ft891::*;
}
