//! Error types for vfolink.
//!
//! All fallible operations across the workspace return [`Result<T>`], which
//! uses [`Error`] as the error type. Note that a read that simply sees no
//! response is *not* an error: those paths return `Ok(None)` and are handled
//! by the caller (a poller must keep polling through silent intervals).

/// The error type for all vfolink operations.
///
/// Variants cover the failure modes of a USB-serial CAT stack: collaborator
/// failures at the USB boundary, protocol decode errors, and misuse.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (device open, configuration select,
    /// interface claim, or a rejected transfer).
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol-level error (malformed CAT frame, `?;` error reply).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The requested operation is not supported by this driver.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// An invalid parameter was passed to an operation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The link has not been initialized, or has already been closed.
    #[error("not connected")]
    NotConnected,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_transport() {
        let e = Error::Transport("claim failed".into());
        assert_eq!(e.to_string(), "transport error: claim failed");
    }

    #[test]
    fn error_display_protocol() {
        let e = Error::Protocol("bad CAT frame".into());
        assert_eq!(e.to_string(), "protocol error: bad CAT frame");
    }

    #[test]
    fn error_display_not_connected() {
        assert_eq!(Error::NotConnected.to_string(), "not connected");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
