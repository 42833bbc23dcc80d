//! Logging initialization shared by the binaries of this workspace.
//!
//! Library crates only emit `tracing` events; installing a subscriber is up
//! to whichever binary runs them.
pub mod config;
pub mod tracing;

pub use config::Config;
