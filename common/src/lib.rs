//! Shared types for the probr workspace.
//!
//! Everything in here is free of network I/O: the data model, target parsing
//! and range expansion, configuration, and the error taxonomy.

pub mod config;
pub mod error;
pub mod macros;
pub mod network;
pub mod platform;
pub mod response;

#[doc(hidden)]
pub use tracing as __tracing;
