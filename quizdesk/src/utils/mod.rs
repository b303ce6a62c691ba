//! Utility functions and helpers
//!
//! Application paths and the tracing setup shared by the binary.

pub mod app_paths;
pub mod logging;
