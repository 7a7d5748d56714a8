//! variants library crate: configuration, output formatting and telemetry
//! for the `variants` binary.
//!
//! The engine itself lives in `variants-core` and is re-exported here as
//! [`engine`] so that integration tests and embedders need a single
//! dependency.

pub mod config;
pub mod format;
pub mod telemetry;

pub use variants_core as engine;

// Private modules only used by the binary (not re-exported): commands
