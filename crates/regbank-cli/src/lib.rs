//! Command-line front end for regbank register banks.

use env_logger as _;
#[cfg(test)]
use tempfile as _;

/// Device selection from command-line values.
pub mod config;
/// JSON register file adapter.
pub mod file_store;
/// Plain-text views of banks and registers.
pub mod render;
