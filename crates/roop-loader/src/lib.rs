//! Roop Loader -- turns program text into a framed grid.
//!
//! - [`source`] frames and scans program text, resolving literals, comments
//!   and named constants.
//! - [`constants`] is the named-constant table.
//! - [`suite`] parses `@` test-suite files and runs their cases.
//! - [`config`] reads run settings from RON, TOML or JSON files.

pub mod config;
pub mod constants;
pub mod source;
pub mod suite;

pub use config::{ConfigError, DebugFormat, RunConfig};
pub use source::{load, LoadError};
pub use suite::{SuiteError, SuiteReport, TestCase};
