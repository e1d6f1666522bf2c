pub mod host;
pub mod range;
pub mod target;
