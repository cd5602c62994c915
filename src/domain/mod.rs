pub mod category;
pub mod product;
pub mod supplier;

pub use category::*;
pub use product::*;
pub use supplier::*;

pub type ProductId = u32;
pub type CategoryId = u32;
pub type SupplierId = u32;
