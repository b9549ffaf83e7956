//! scriptbridge host library
//!
//! This module exports the composition root pieces of the `scriptbridge`
//! binary so they can be embedded and tested.

pub mod bridge;
pub mod config;
pub mod script_file;

pub use bridge::Bridge;
pub use config::Config;
pub use script_file::ScriptFile;
