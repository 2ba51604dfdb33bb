//! VfoMonitor -- background polling loop for the dial frequency.
//!
//! The FT-891 never pushes frequency updates, so the only way to follow the
//! operator's tuning is to ask repeatedly. The monitor owns that loop in a
//! spawned task and publishes the most recent answer through a
//! [`watch`](tokio::sync::watch) channel, so any number of consumers can
//! await changes without issuing CAT traffic themselves.
//!
//! A poll that times out or fails does not stop the loop. The published
//! value simply reflects the latest answer, `None` while the radio is
//! silent.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use vfolink_core::driver::RadioDriver;

/// Default interval between frequency polls.
///
/// 500 ms tracks manual tuning closely enough for display purposes while
/// leaving the CAT link mostly idle for setters.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Background task polling a [`RadioDriver`] for its dial frequency.
///
/// Dropping the monitor aborts the task; the driver itself is unaffected.
pub struct VfoMonitor {
    rx: watch::Receiver<Option<u64>>,
    task: JoinHandle<()>,
}

impl VfoMonitor {
    /// Start polling `driver` every [`POLL_INTERVAL`].
    pub fn start(driver: Arc<dyn RadioDriver>) -> Self {
        Self::with_interval(driver, POLL_INTERVAL)
    }

    /// Start polling `driver` at a custom interval.
    pub fn with_interval(driver: Arc<dyn RadioDriver>, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(None);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // A slow exchange must not cause a burst of catch-up polls.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match driver.get_frequency().await {
                    Ok(freq) => {
                        tx.send_if_modified(|current| {
                            if *current != freq {
                                debug!(?freq, "VFO changed");
                                *current = freq;
                                true
                            } else {
                                false
                            }
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "VFO poll failed");
                    }
                }
            }
        });

        VfoMonitor { rx, task }
    }

    /// The most recently observed frequency, `None` while the radio has
    /// not answered.
    pub fn frequency(&self) -> Option<u64> {
        *self.rx.borrow()
    }

    /// Subscribe to frequency changes.
    ///
    /// The receiver yields a change notification whenever the polled value
    /// differs from the previous one, including the transition to `None`
    /// when the radio stops answering.
    pub fn subscribe(&self) -> watch::Receiver<Option<u64>> {
        self.rx.clone()
    }
}

impl Drop for VfoMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
