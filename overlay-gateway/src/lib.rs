//! # Saorsa Overlay Gateway
//!
//! HTTP [`PersistenceGateway`](overlay_core::PersistenceGateway) for the
//! document service. The engine hands this gateway snapshots to save and
//! consumes what it loads; no retries are attempted.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;

pub use client::{DocumentSummary, HttpGateway};
pub use config::{
    GatewayConfig, DEFAULT_SERVICE_URL, DEFAULT_TIMEOUT_MS, SERVICE_URL_ENV, TIMEOUT_ENV,
};
pub use error::ConfigError;
