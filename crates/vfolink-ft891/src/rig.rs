//! `Ft891` -- the [`RadioDriver`] implementation for the Yaesu FT-891.
//!
//! Ties the CAT codec to a [`SerialLink`] and enforces the one correctness
//! property everything else depends on: at most one command/response
//! exchange is in flight against the shared link at any time. The link is
//! held in a tokio mutex; each exchange (the write, and for queries the
//! subsequent read) runs inside one critical section, and the guard is
//! scoped so the lock is released even when the exchange fails mid-way.
//! Waiting callers acquire the lock in FIFO order.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use vfolink_core::driver::RadioDriver;
use vfolink_core::error::Result;
use vfolink_core::link::SerialLink;

use crate::commands;
use crate::protocol;

/// A Yaesu FT-891 controlled over CAT.
///
/// Constructed via [`Ft891Builder`](crate::builder::Ft891Builder). Owns its
/// link exclusively; nothing else may read or write it.
pub struct Ft891 {
    link: Mutex<Box<dyn SerialLink>>,
}

impl Ft891 {
    pub(crate) fn new(link: Box<dyn SerialLink>) -> Self {
        Ft891 { link: Mutex::new(link) }
    }
}

#[async_trait]
impl RadioDriver for Ft891 {
    async fn get_frequency(&self) -> Result<Option<u64>> {
        let frame = {
            let mut link = self.link.lock().await;
            debug!("requesting VFO");
            link.write(&commands::cmd_read_vfo()).await?;
            link.read_until(protocol::TERMINATOR).await?
        };

        let Some(frame) = frame else {
            debug!("no VFO reply within the read timeout");
            return Ok(None);
        };

        match commands::parse_vfo_reply(&frame) {
            Ok(freq_hz) => {
                debug!(freq_hz, "VFO read");
                Ok(Some(freq_hz))
            }
            Err(e) => {
                // Protocol desync degrades to "no value", same as a silent
                // radio; the trace keeps the two distinguishable.
                warn!(frame = %frame, error = %e, "unparseable VFO reply");
                Ok(None)
            }
        }
    }

    async fn set_frequency(&self, freq_hz: u64) -> Result<()> {
        if !commands::vfo_in_range(freq_hz) {
            debug!(freq_hz, "frequency outside tunable range, ignoring");
            return Ok(());
        }

        let cmd = commands::cmd_set_vfo(freq_hz);
        let mut link = self.link.lock().await;
        debug!(freq_hz, "setting VFO");
        // Fire-and-forget: the rig sends no reply to a set command.
        link.write(&cmd).await
    }

    async fn close(&self) -> Result<()> {
        let mut link = self.link.lock().await;
        debug!("closing link");
        link.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use vfolink_core::error::Error;
    use vfolink_test_harness::{EchoLink, MockSerialLink};

    fn make_rig(link: &MockSerialLink) -> Ft891 {
        Ft891::new(Box::new(link.clone()))
    }

    // -----------------------------------------------------------------
    // get_frequency
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn get_frequency_decodes_reply() {
        let link = MockSerialLink::new();
        link.expect(b"FA;", Some("FA014250000;"));

        let rig = make_rig(&link);
        assert_eq!(rig.get_frequency().await.unwrap(), Some(14_250_000));
    }

    #[tokio::test]
    async fn get_frequency_decodes_range_bottom() {
        let link = MockSerialLink::new();
        link.expect(b"FA;", Some("FA000030000;"));

        let rig = make_rig(&link);
        assert_eq!(rig.get_frequency().await.unwrap(), Some(30_000));
    }

    #[tokio::test]
    async fn get_frequency_timeout_is_none() {
        let link = MockSerialLink::new();
        link.expect(b"FA;", None);

        let rig = make_rig(&link);
        assert_eq!(rig.get_frequency().await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_frequency_malformed_reply_is_none() {
        let link = MockSerialLink::new();
        link.expect(b"FA;", Some("FAgarbage;"));

        let rig = make_rig(&link);
        assert_eq!(rig.get_frequency().await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_frequency_error_reply_is_none() {
        let link = MockSerialLink::new();
        link.expect(b"FA;", Some("?;"));

        let rig = make_rig(&link);
        assert_eq!(rig.get_frequency().await.unwrap(), None);
    }

    // -----------------------------------------------------------------
    // set_frequency
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn set_frequency_transmits_exact_command() {
        let link = MockSerialLink::new();
        let rig = make_rig(&link);

        rig.set_frequency(14_250_000).await.unwrap();

        assert_eq!(link.sent_data(), vec![b"FA014250000;".to_vec()]);
    }

    #[tokio::test]
    async fn set_frequency_below_range_writes_nothing() {
        let link = MockSerialLink::new();
        let rig = make_rig(&link);

        rig.set_frequency(commands::VFO_MIN - 1).await.unwrap();

        assert!(link.sent_data().is_empty());
    }

    #[tokio::test]
    async fn set_frequency_above_range_writes_nothing() {
        let link = MockSerialLink::new();
        let rig = make_rig(&link);

        rig.set_frequency(commands::VFO_MAX + 1).await.unwrap();

        assert!(link.sent_data().is_empty());
    }

    #[tokio::test]
    async fn set_frequency_range_is_inclusive() {
        let link = MockSerialLink::new();
        let rig = make_rig(&link);

        rig.set_frequency(commands::VFO_MIN).await.unwrap();
        rig.set_frequency(commands::VFO_MAX).await.unwrap();

        assert_eq!(
            link.sent_data(),
            vec![b"FA000030000;".to_vec(), b"FA054000000;".to_vec()]
        );
    }

    // -----------------------------------------------------------------
    // set-then-get against an echoing link
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let link = EchoLink::new();
        let rig = Ft891::new(Box::new(link));

        for freq in [commands::VFO_MIN, 7_074_000, 14_250_000, commands::VFO_MAX] {
            rig.set_frequency(freq).await.unwrap();
            assert_eq!(rig.get_frequency().await.unwrap(), Some(freq));
        }
    }

    // -----------------------------------------------------------------
    // exchange serialization
    // -----------------------------------------------------------------

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_exchanges_never_interleave() {
        let link = MockSerialLink::new();
        // The query's reply arrives slowly, holding the first exchange
        // open long enough for the set call to pile up behind it.
        link.expect_with_delay(b"FA;", Some("FA007000000;"), Duration::from_millis(50));

        let rig = Arc::new(make_rig(&link));

        let getter = {
            let rig = Arc::clone(&rig);
            tokio::spawn(async move { rig.get_frequency().await })
        };
        // Let the getter take the lock first.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let setter = {
            let rig = Arc::clone(&rig);
            tokio::spawn(async move { rig.set_frequency(14_250_000).await })
        };

        let freq = getter.await.unwrap().unwrap();
        setter.await.unwrap().unwrap();

        // The getter received its own reply, not a corrupted one.
        assert_eq!(freq, Some(7_000_000));
        // The set's write appears only after the query's full exchange.
        assert_eq!(
            link.sent_data(),
            vec![b"FA;".to_vec(), b"FA014250000;".to_vec()]
        );
    }

    // -----------------------------------------------------------------
    // close
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn operations_after_close_fail_fast() {
        let link = MockSerialLink::new();
        let rig = make_rig(&link);

        rig.close().await.unwrap();

        assert!(matches!(
            rig.get_frequency().await.unwrap_err(),
            Error::NotConnected
        ));
        assert!(matches!(
            rig.set_frequency(14_250_000).await.unwrap_err(),
            Error::NotConnected
        ));
    }

    #[tokio::test]
    async fn failed_exchange_releases_the_lock() {
        let link = MockSerialLink::new();
        let rig = make_rig(&link);

        // First exchange fails at the write (link disconnected).
        link.set_connected(false);
        assert!(rig.get_frequency().await.is_err());

        // The lock was released; the next exchange proceeds normally.
        link.set_connected(true);
        link.expect(b"FA;", Some("FA014250000;"));
        assert_eq!(rig.get_frequency().await.unwrap(), Some(14_250_000));
    }
}
