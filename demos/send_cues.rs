//! Basic example: connect to a cue peripheral and play a short sequence
//!
//! Run with: cargo run --example send_cues [service-uuid] [characteristic-uuid]

use cue_remote_ble::{BtleplugHost, ConnectionConfig, ConnectionState, Cue, Remote, Result};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cue_remote_ble=debug".parse().unwrap()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let mut config = ConnectionConfig::default();
    if let Some(service) = args.next() {
        config.service_uuid = service;
    }
    if let Some(characteristic) = args.next() {
        config.characteristic_uuid = characteristic;
    }

    let remote = Remote::new(Arc::new(BtleplugHost::new().await));

    if !remote.is_supported() {
        println!("No Bluetooth adapter found.");
        return Ok(());
    }

    remote.set_on_state_change(Some(Arc::new(|state: &ConnectionState| {
        println!("State: {}", state);
    })));

    println!(
        "Looking for a device with service {} ...",
        config.service_uuid
    );
    remote.connect(&config).await?;

    remote.set_intensity(0.6).await?;

    for cue in [Cue::Chance, Cue::Pinch, Cue::Normal] {
        println!("Cue: {}", cue);
        remote.set_cue(cue).await?;
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    println!("Stop");
    remote.stop().await?;

    remote.disconnect().await?;
    println!("\nDone!");

    Ok(())
}
