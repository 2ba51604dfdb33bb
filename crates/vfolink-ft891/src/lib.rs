//! vfolink-ft891: Yaesu FT-891 CAT protocol driver.
//!
//! The FT-891 speaks semicolon-terminated ASCII CAT over its USB-UART
//! bridge. This crate ties the CAT codec ([`protocol`], [`commands`]) to a
//! [`SerialLink`](vfolink_core::SerialLink) and guarantees that concurrent
//! callers never interleave their exchanges on the shared link.

pub mod builder;
pub mod commands;
pub mod protocol;
pub mod rig;

pub use builder::Ft891Builder;
pub use rig::Ft891;
