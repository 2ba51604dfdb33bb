//! The `RadioDriver` trait -- capability interface for CAT-controlled radios.
//!
//! UI layers and pollers program against `dyn RadioDriver` without knowing
//! which radio protocol is in use. Frequency operations are optional --
//! a protocol that cannot tune (a receiver-only scanner, say) implements
//! only `close()` -- so the defaults return `Unsupported`.

use async_trait::async_trait;

use crate::error::{Error, Result};

/// A radio reachable over some CAT protocol.
///
/// All methods serialize their transport exchanges internally: two
/// concurrent calls on the same driver never interleave their writes and
/// reads on the shared link.
#[async_trait]
pub trait RadioDriver: Send + Sync {
    /// Read the current VFO frequency in hertz.
    ///
    /// Returns `Ok(None)` when the radio did not answer within the read
    /// timeout -- an expected outcome (radio off, cable unplugged), not an
    /// error.
    async fn get_frequency(&self) -> Result<Option<u64>> {
        Err(Error::Unsupported("frequency query".into()))
    }

    /// Tune the VFO to the given frequency in hertz.
    ///
    /// Values outside the radio's tunable range are ignored without
    /// touching the transport.
    async fn set_frequency(&self, _freq_hz: u64) -> Result<()> {
        Err(Error::Unsupported("frequency set".into()))
    }

    /// Close the underlying link. The driver is unusable afterwards.
    async fn close(&self) -> Result<()>;
}
