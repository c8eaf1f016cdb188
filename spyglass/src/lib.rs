#![cfg_attr(docsrs, feature(doc_cfg))]
//! # Spyglass
//!
//! Recording observers for testing reactive sources, plus a deterministic
//! lifecycle driver.
//!
//! A [`RecordingObserver`] subscribes to a producer, records every value it is
//! handed (possibly from a background thread), and lets the test block until a
//! value shows up, derive mapped observers, and assert on the history.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use spyglass::{LifecycleDriver, LifecycleState, RecordingObserver};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> spyglass::Result {
//! let mut driver = LifecycleDriver::resumed();
//! let states = RecordingObserver::attach(&driver.lifecycle().states())?;
//! states.assert_value(&LifecycleState::Resumed)?;
//!
//! let expectation = states.expect_next_value().within(Duration::from_secs(1));
//! driver.pause();
//! expectation.await?;
//! states.assert_value(&LifecycleState::Paused)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RecordingObserver`] | Records values, blocks until they arrive, asserts on them |
//! | [`Expectation`] | Async wait for a value with a timeout |
//! | [`Source`] / [`Subscriber`] | The push contract between producer and observer |
//! | [`Subscription`] | Cancellable handle returned by [`Source::subscribe`] |
//! | [`LifecycleDriver`] | Named-transition adapter over a [`Lifecycle`] |
//! | [`LifecycleRegistry`] | Default lifecycle, publishes its states on a `watch` channel |
//! | [`Tracer`] | Subscriber that logs values through `tracing` |
//!
//! ## Waiting
//!
//! | Call | Returns when |
//! |------|--------------|
//! | `await_value()` | history is non-empty (immediately if it already is) |
//! | `await_next_value()` | a value arrives after the call |
//! | `*_timeout(d)` | as above, or after `d` without failing |
//! | `expect_value().await` | as `await_value`, fails with [`Error::WaitTimeout`] |
//! | `expect_next_value().await` | as `await_next_value`, fails with [`Error::WaitTimeout`] |
//!
//! ## Features
//!
//! - **`serde`** - `Serialize`/`Deserialize` for [`ObserverConfig`], [`LifecycleState`] and [`LifecycleEvent`]
//!
//! # Warning
//!
//! **Do not use in production.** History grows without bound; the observer is
//! meant to live as long as one test.

mod config;
mod error;
mod label;
mod lifecycle;
mod observer;
mod source;
mod subscriber;
mod tracer;

pub use config::ObserverConfig;
pub use error::Error;
pub use label::Label;
pub use lifecycle::{Lifecycle, LifecycleDriver, LifecycleEvent, LifecycleRegistry, LifecycleState};
pub use observer::{Expectation, RecordingObserver};
pub use source::{Source, Subscription};
pub use subscriber::Subscriber;
pub use tracer::Tracer;

/// Convenience alias for `Result<T, spyglass::Error>`.
pub type Result<T = ()> = std::result::Result<T, Error>;
