//! vfolink-usb: CP2105 USB-UART bridge transport for vfolink.
//!
//! The CP2105 is the dual-port Silicon Labs bridge chip found in the Yaesu
//! FT-891 (and many other rigs). This crate provides:
//!
//! - [`Cp2105Link`] -- the [`SerialLink`](vfolink_core::SerialLink)
//!   implementation, including the vendor-request bring-up sequence
//! - [`NusbDevice`] -- the [`UsbDevice`](vfolink_core::UsbDevice) adapter
//!   over the `nusb` host stack
//!
//! The bring-up requests follow Silicon Labs AN571.

pub mod cp2105;
pub mod nusb_device;

pub use cp2105::Cp2105Link;
pub use nusb_device::NusbDevice;
