//! vfolink-test-harness: Mock transports and USB devices for vfolink.
//!
//! This crate provides [`MockSerialLink`] and [`EchoLink`] for deterministic
//! unit testing of protocol drivers, and [`MockUsbDevice`] for testing the
//! CP2105 bring-up sequence and read loop, all without real radio hardware.

pub mod mock_link;
pub mod mock_usb;

pub use mock_link::{EchoLink, MockSerialLink};
pub use mock_usb::{FailPoint, MockUsbDevice, UsbCall};
