//! Product stream provider: the base product feed, the category join, the
//! selection streams and the insertion fold.

pub mod pipelines;
pub mod service;
pub mod suppliers;

pub use pipelines::*;
pub use service::*;
pub use suppliers::*;
