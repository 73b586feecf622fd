//! Core data model for the assay LLM QA harness.
//!
//! Everything here is plain data and pure reduction logic; the concurrent engine that produces
//! these values lives in the `assay` crate.
mod config;
mod constants;
mod data;
mod error;
mod metrics;
mod results;
mod stats;

pub use config::*;
pub use constants::*;
pub use data::*;
pub use error::*;
pub use metrics::*;
pub use results::*;
pub use stats::*;
