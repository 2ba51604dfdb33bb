//! Basic FT-891 VFO control example.
//!
//! Demonstrates connecting to an FT-891 over its built-in CP2105 USB
//! bridge, reading the current dial frequency, and setting a new one.
//!
//! # Requirements
//!
//! - A Yaesu FT-891 connected via USB
//! - The rig's `05-06 CAT RATE` menu set to 38400 (the default here)
//! - Permission to open the USB device (a udev rule for vendor 10c4 on
//!   Linux)
//!
//! # Usage
//!
//! ```sh
//! cargo run -p vfolink --example read_vfo
//! ```

use vfolink::ft891::Ft891Builder;
use vfolink::{BaudRate, RadioDriver};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Looking for an FT-891 on the USB bus...");

    let rig = Ft891Builder::new()
        .baud_rate(BaudRate::B38400)
        .build()
        .await?;

    // Read the current dial frequency.
    match rig.get_frequency().await? {
        Some(freq) => println!("VFO-A: {} Hz ({:.3} MHz)", freq, freq as f64 / 1_000_000.0),
        None => println!("Radio did not answer (is CAT enabled?)"),
    }

    // QSY to the FT8 frequency on 20 m.
    let target = 14_074_000;
    println!("Setting VFO-A to {} Hz...", target);
    rig.set_frequency(target).await?;

    match rig.get_frequency().await? {
        Some(freq) => println!("VFO-A now: {} Hz", freq),
        None => println!("Radio did not answer the read-back"),
    }

    rig.close().await?;
    Ok(())
}
