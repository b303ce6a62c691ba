//! Configuration module
//!
//! Settings for indicator glyphs, the quiz service endpoint and
//! per-table options, stored as TOML.

pub mod config;

pub use config::Config;
