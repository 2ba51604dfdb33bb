//! FT-891 CAT command builders and reply parsers.
//!
//! All functions are pure: they produce or consume bytes and string slices
//! without performing I/O. The driver in [`rig`](crate::rig) sends the
//! bytes over a link and feeds received frames back into the parsers.
//!
//! Frequencies are always 9 ASCII digits in hertz, zero-padded on the left,
//! per the FT-891 CAT operation reference.

use vfolink_core::error::{Error, Result};

use crate::protocol::{decode_reply, encode_command};

/// Lowest frequency the FT-891's VFO tunes to (30 kHz).
pub const VFO_MIN: u64 = 30_000;

/// Highest frequency the FT-891's VFO tunes to (54 MHz).
pub const VFO_MAX: u64 = 54_000_000;

/// Whether `freq_hz` lies within the rig's tunable range.
pub fn vfo_in_range(freq_hz: u64) -> bool {
    (VFO_MIN..=VFO_MAX).contains(&freq_hz)
}

/// Build a "read VFO-A frequency" command (`FA;`).
pub fn cmd_read_vfo() -> Vec<u8> {
    encode_command("FA", "")
}

/// Build a "set VFO-A frequency" command (`FA{freq:09};`).
pub fn cmd_set_vfo(freq_hz: u64) -> Vec<u8> {
    encode_command("FA", &format!("{freq_hz:09}"))
}

/// Parse a `FA<digits>;` reply frame into a frequency in hertz.
pub fn parse_vfo_reply(frame: &str) -> Result<u64> {
    let reply = decode_reply(frame)?;
    if reply.prefix != "FA" {
        return Err(Error::Protocol(format!(
            "expected FA reply, got {:?}",
            reply.prefix
        )));
    }
    reply
        .data
        .parse::<u64>()
        .map_err(|_| Error::Protocol(format!("non-numeric frequency: {:?}", reply.data)))
}
