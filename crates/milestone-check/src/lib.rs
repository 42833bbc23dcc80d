//! Command line adapter around the milestone validation engine. Reads JSON
//! documents from disk, runs the engine and renders its verdicts as JSON.

pub mod arguments;
pub mod config;
pub mod run;

pub use run::{Outcome, run};
