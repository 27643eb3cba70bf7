//! Beacon Collector - mock pixel endpoint for tracker tests
//!
//! Stands in for an analytics collector: every inbound request gets a
//! `200 OK` transparent GIF, and the query parameters of each `GET` are
//! appended to a shared [`beacon_core::RequestLog`].
//!
//! ```rust,ignore
//! use beacon_collector::{CollectorConfig, MockCollector};
//! use beacon_core::{Expectation, RequestLog, exists};
//!
//! let log = RequestLog::new();
//! let collector = MockCollector::start(&CollectorConfig::default(), log.clone()).await?;
//! // ... drive the tracker at collector.base_url() ...
//! log.wait_for_len(3, Duration::from_secs(10)).await;
//! assert!(exists(&Expectation::new().field("e", "pv"), &log.snapshot()));
//! collector.shutdown().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
mod error;
pub mod query;
mod server;
pub mod telemetry;

pub use config::{CollectorConfig, LogFormat};
pub use error::*;
pub use query::parse_query;
pub use server::{CollectorHandle, MockCollector, TRANSPARENT_GIF, router};
