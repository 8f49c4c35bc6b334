//! therm daemon - CPU temperature watch
//!
//! This crate provides the pieces of the `thermd` daemon:
//! - `daemon` - Double-fork detach from the controlling terminal
//! - `sensor` - Temperature reader backed by the `sensors` command
//! - `notifier` - Best-effort desktop alerts via `notify-send`
//! - `log_sink` - Append-only, synced readings log
//! - `monitor` - The read → log → maybe-notify → sleep loop
//! - `app` - Startup order and tracing setup
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      thermd daemon                       │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ┌───────────────┐   read    ┌────────────────────────┐  │
//! │  │    Monitor    │──────────▶│     SensorCommand      │  │
//! │  │ (every 5 sec) │           │  (`sensors`, "Tctl:")  │  │
//! │  └──┬─────────┬──┘           └────────────────────────┘  │
//! │     │ append  │ ≥ threshold                              │
//! │     ▼         ▼                                          │
//! │  ┌────────┐ ┌────────────────────────┐                   │
//! │  │LogSink │ │    DesktopNotifier     │                   │
//! │  │ (sync) │ │    (`notify-send`)     │                   │
//! │  └────────┘ └────────────────────────┘                   │
//! │                                                          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Panic-Free Guarantees
//!
//! All production code in this crate follows the project panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - All fallible operations return `Result` or `Option`
//! - External command failures degrade to sentinel readings or are logged

pub mod app;
pub mod config;
pub mod daemon;
pub mod error;
pub mod log_sink;
pub mod monitor;
pub mod notifier;
pub mod pidfile;
pub mod sensor;
pub mod stress;

pub use config::Config;
pub use error::{DaemonError, Result};
pub use log_sink::LogSink;
pub use monitor::{CycleOutcome, Monitor};
pub use notifier::{AlertSink, DesktopNotifier};
pub use sensor::{SensorCommand, TemperatureSource};
