//! vfolink-core: Core traits, types, and error definitions for vfolink.
//!
//! This crate defines the device-agnostic abstractions the rest of the
//! workspace implements. Application code and protocol drivers depend on
//! these types without pulling in any concrete USB backend.
//!
//! # Key types
//!
//! - [`SerialLink`] -- line-framed byte transport to a radio
//! - [`RadioDriver`] -- capability interface for CAT-controlled radios
//! - [`UsbDevice`] -- collaborator boundary for USB bridge chips
//! - [`Error`] / [`Result`] -- error handling

pub mod driver;
pub mod error;
pub mod link;
pub mod types;
pub mod usb;

pub use driver::RadioDriver;
pub use error::{Error, Result};
pub use link::{SerialLink, READ_TIMEOUT};
pub use types::BaudRate;
pub use usb::UsbDevice;
