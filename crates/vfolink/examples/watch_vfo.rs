//! Follow the FT-891's dial in real time.
//!
//! Demonstrates the [`VfoMonitor`] polling loop: the monitor asks the rig
//! for its frequency twice a second and publishes changes through a watch
//! channel. Turn the VFO knob and watch the values arrive.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p vfolink --example watch_vfo
//! ```

use std::sync::Arc;
use std::time::Duration;

use vfolink::ft891::Ft891Builder;
use vfolink::VfoMonitor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let rig = Arc::new(Ft891Builder::new().build().await?);
    println!("Connected. Watching VFO-A for 60 seconds, turn the knob...\n");

    let monitor = VfoMonitor::start(rig);
    let mut freq = monitor.subscribe();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(60);
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            break;
        }

        match tokio::time::timeout(remaining, freq.changed()).await {
            Ok(Ok(())) => match *freq.borrow() {
                Some(hz) => println!("VFO-A: {:>9} Hz ({:.3} MHz)", hz, hz as f64 / 1_000_000.0),
                None => println!("VFO-A: no answer"),
            },
            // Channel closed or the watch period elapsed.
            Ok(Err(_)) | Err(_) => break,
        }
    }

    println!("\nDone.");
    Ok(())
}
