//! Category stream provider.

pub mod service;

pub use service::*;
