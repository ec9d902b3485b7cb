//! # aiqcli
//!
//! Correlated reports from the NetApp Active IQ telemetry API.
//!
//! ## Usage
//!
//! ```bash
//! aiq inventory <customer-id> [--table]
//! aiq capacity <customer-id> [-f percent]
//! aiq efficiency <cluster-id> [--concurrency N]
//! ```
//!
//! ## Modules
//!
//! - `source` - Remote data source trait with HTTP and mock implementations
//! - `fetch` - Concurrent fetch of named documents
//! - `document` - Typed decoding of API documents, error documents rejected once
//! - `correlate` - Serial-number join of inventory and capacity
//! - `classify` - Time-to-full forecast buckets
//! - `aggregate` - Threshold filters, stable ordering and means
//! - `efficiency` - Bounded per-node efficiency fan-out
//! - `report` - Report pipelines built from the stages above
//! - `output` - Text and CSV rendering
//! - `auth` - Token files and the refresh exchange
//! - `config` - Configuration loading
pub mod aggregate;
pub mod auth;
pub mod classify;
pub mod cli;
pub mod config;
pub mod correlate;
pub mod document;
pub mod efficiency;
pub mod error;
pub mod fetch;
pub mod output;
pub mod report;
pub mod source;

pub use error::{Error, Result};
