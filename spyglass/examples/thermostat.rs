//! Thermostat Example - Observing a Lifecycle-Aware Producer
//!
//! A thermostat publishes readings on a `watch` channel from a background
//! task, but only while its owning component is active. The example:
//!
//! - Drives the component lifecycle with `LifecycleDriver`
//! - Records readings with `RecordingObserver`
//! - Derives a Fahrenheit observer with `map`
//! - Waits for values with both the async and blocking APIs

use std::time::Duration;

use spyglass::{LifecycleDriver, LifecycleState, RecordingObserver, Source, Tracer};
use tokio::sync::watch;

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut driver = LifecycleDriver::resumed();
    let mut lifecycle = driver.lifecycle().states();
    let (readings, rx) = watch::channel(20.0_f64);

    let _trace = rx.subscribe(std::sync::Arc::new(Tracer::new("thermostat")))?;
    let celsius = RecordingObserver::attach(&rx)?;
    let fahrenheit = celsius.map(|c: &f64| c * 9.0 / 5.0 + 32.0);

    tokio::spawn(async move {
        let mut temp = 20.0;
        loop {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if lifecycle.borrow_and_update().is_active() {
                temp += 0.5;
                if readings.send(temp).is_err() {
                    break;
                }
            } else if lifecycle.changed().await.is_err() {
                break;
            }
        }
    });

    celsius.expect_next_value().await?;
    fahrenheit.assert_value_matches(|f| *f > 68.0)?;
    println!("readings so far: {:?}", celsius.value_history());

    driver.pause();
    assert_eq!(driver.current_state(), LifecycleState::Paused);
    tokio::time::sleep(Duration::from_millis(50)).await;
    let paused_at = celsius.history_len();

    driver.resume();
    let waiter = celsius.clone();
    tokio::task::spawn_blocking(move || {
        waiter.await_next_value_timeout(Duration::from_secs(1));
    })
    .await?;

    assert!(celsius.history_len() > paused_at);
    celsius.assert_never(|c| *c < 20.0)?;
    println!("fahrenheit: {:?}", fahrenheit.value_history());

    celsius.dispose();
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
    }
}
