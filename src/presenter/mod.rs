//! Presentation-facing view models.

pub mod product_list;

pub use product_list::*;
