use crate::domain::Product;

/// Commands accepted by the category service.
#[derive(Debug)]
pub enum CategoryRequest {
    /// Re-fetch categories and publish the new collection.
    Refresh,
    Shutdown,
}

/// Commands accepted by the product service.
///
/// Sent over an unbounded channel so that `add_product` stays fire-and-forget.
#[derive(Debug)]
pub enum ProductRequest {
    Insert(Product),
    Shutdown,
}
