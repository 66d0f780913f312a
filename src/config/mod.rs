//! Configuration loading and merging
//!
//! Settings come from a config file (explicit or discovered in the working
//! directory) and are then overridden by command-line flags.

pub mod loader;
pub mod merge;

pub use loader::load_config;
pub use merge::CliOverrides;
