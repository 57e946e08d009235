#![forbid(unsafe_code)]

//! Relay that turns WebSocket-pushed messages into single-slot mailboxes
//! drained by HTTP polling.

pub mod config;
pub mod dashboard;
pub mod errors;
pub mod ingest;
pub mod mode;
pub mod models;
pub mod poll;
pub mod server;
pub mod store;

pub use config::RelayConfig;
pub use errors::{AppError, Result};
pub use store::RelayStore;
