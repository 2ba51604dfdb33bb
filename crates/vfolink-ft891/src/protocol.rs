//! Yaesu CAT text-protocol encoder/decoder.
//!
//! CAT commands are two-letter uppercase prefixes followed by ASCII
//! parameters, terminated with `;`. There is no binary preamble and no
//! addressing:
//!
//! ```text
//! <prefix><params>;
//! ```
//!
//! Replies echo the command prefix, followed by data, terminated with `;`.
//! The rig answers unrecognised or invalid commands with `?;`.
//!
//! The transport layer already delivers whole frames (it reads until the
//! terminator), so decoding here works on one complete frame at a time.

use bytes::{BufMut, BytesMut};

use vfolink_core::error::{Error, Result};

/// CAT command/reply terminator.
pub const TERMINATOR: char = ';';

/// Error reply from the rig.
pub const ERROR_REPLY: &str = "?;";

/// One decoded CAT reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatReply {
    /// Command prefix echoed in the reply (e.g. `"FA"`).
    pub prefix: String,
    /// Everything between the prefix and the terminator.
    pub data: String,
}

/// Encode a CAT command into bytes ready for transmission.
///
/// # Example
///
/// ```
/// use vfolink_ft891::protocol::encode_command;
///
/// assert_eq!(encode_command("FA", ""), b"FA;");
/// assert_eq!(encode_command("FA", "014250000"), b"FA014250000;");
/// ```
pub fn encode_command(prefix: &str, params: &str) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(prefix.len() + params.len() + 1);
    buf.put_slice(prefix.as_bytes());
    buf.put_slice(params.as_bytes());
    buf.put_u8(TERMINATOR as u8);
    buf.to_vec()
}

/// Decode one complete CAT reply frame.
///
/// The prefix is the leading run of ASCII letters; the data is everything
/// after it up to the terminator. A frame without a terminator or the
/// error reply `?;` decodes to [`Error::Protocol`].
pub fn decode_reply(frame: &str) -> Result<CatReply> {
    let body = frame
        .strip_suffix(TERMINATOR)
        .ok_or_else(|| Error::Protocol(format!("frame missing terminator: {frame:?}")))?;

    if body == "?" {
        return Err(Error::Protocol("rig returned error reply (?;)".into()));
    }

    let prefix_end = body
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(body.len());

    Ok(CatReply {
        prefix: body[..prefix_end].to_string(),
        data: body[prefix_end..].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_query() {
        assert_eq!(encode_command("FA", ""), b"FA;");
    }

    #[test]
    fn encode_set() {
        assert_eq!(encode_command("FA", "014250000"), b"FA014250000;");
    }

    #[test]
    fn decode_frequency_reply() {
        let reply = decode_reply("FA014250000;").unwrap();
        assert_eq!(reply.prefix, "FA");
        assert_eq!(reply.data, "014250000");
    }

    #[test]
    fn decode_reply_with_empty_data() {
        let reply = decode_reply("FA;").unwrap();
        assert_eq!(reply.prefix, "FA");
        assert_eq!(reply.data, "");
    }

    #[test]
    fn decode_error_reply() {
        let err = decode_reply(ERROR_REPLY).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn decode_rejects_missing_terminator() {
        let err = decode_reply("FA014250000").unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn round_trip_set_frequency() {
        let cmd = encode_command("FA", "014250000");
        let text = String::from_utf8(cmd).unwrap();
        let reply = decode_reply(&text).unwrap();
        assert_eq!(reply.prefix, "FA");
        assert_eq!(reply.data, "014250000");
    }
}
