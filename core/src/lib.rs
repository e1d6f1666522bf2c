//! The discovery engine: name resolution, reachability probing and the
//! service that strings them together.
//!
//! High-level callers should only need [`discovery::DiscoveryService`]. The
//! [`resolver::NameResolver`] and [`prober::Prober`] traits are the seams for
//! swapping in other implementations (or fakes in tests).

pub mod discovery;
pub mod prober;
pub mod resolver;

pub use discovery::DiscoveryService;
