//! Repoman Core - Domain types, errors, logging, configuration and the batch executor
//!
//! Nothing in this crate talks to the network; the GitHub adapter lives in `repoman-github`.

pub mod async_utils;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use async_utils::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tokio;
pub use tracing;
