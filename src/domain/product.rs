use serde::{Deserialize, Serialize};

use super::{CategoryId, ProductId, SupplierId};

/// Multiplier applied to every backend price when a product is ingested.
pub const PRICE_MULTIPLIER: f64 = 1.5;

/// Label shown for a product whose category could not be joined.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Represents a product in the catalog.
///
/// The wire shape is the backend's camelCase record. `category` and
/// `search_key` are derived client-side and default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub product_code: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category_id: CategoryId,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity_in_stock: u32,
    #[serde(default)]
    pub search_key: Vec<String>,
    #[serde(default)]
    pub supplier_ids: Option<Vec<SupplierId>>,
}

impl Product {
    pub fn new(
        id: ProductId,
        product_name: impl Into<String>,
        price: f64,
        category_id: CategoryId,
    ) -> Self {
        Self {
            id,
            product_name: product_name.into(),
            product_code: String::new(),
            description: String::new(),
            price,
            category_id,
            category: None,
            quantity_in_stock: 0,
            search_key: Vec::new(),
            supplier_ids: None,
        }
    }

    pub fn with_suppliers(mut self, supplier_ids: Vec<SupplierId>) -> Self {
        self.supplier_ids = Some(supplier_ids);
        self
    }

    /// Converts a backend record into its displayed form.
    ///
    /// The price multiplier is applied here and only here; joins with
    /// categories must not reapply it.
    pub fn ingest(self) -> Self {
        let search_key = vec![self.product_name.clone()];
        Self {
            price: self.price * PRICE_MULTIPLIER,
            search_key,
            ..self
        }
    }

    /// Record pushed by `add_product` when the caller supplies none.
    pub fn fallback() -> Self {
        Self {
            id: 42,
            product_name: "Another One".to_string(),
            product_code: "TBX-0042".to_string(),
            description: "Our new product".to_string(),
            price: 8.9,
            category_id: 3,
            category: Some("Toolbox".to_string()),
            quantity_in_stock: 30,
            search_key: Vec::new(),
            supplier_ids: None,
        }
    }

    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }

    pub fn supplier_ids(&self) -> &[SupplierId] {
        self.supplier_ids.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_applies_multiplier_and_search_key() {
        let product = Product::new(1, "Leaf Rake", 10.0, 1).ingest();
        assert_eq!(product.price, 15.0);
        assert_eq!(product.search_key, vec!["Leaf Rake".to_string()]);
    }

    #[test]
    fn test_deserializes_backend_record() {
        let json = r#"{
            "id": 5,
            "productName": "Hammer",
            "productCode": "TBX-0048",
            "description": "Curved claw steel hammer",
            "price": 8.9,
            "categoryId": 3,
            "quantityInStock": 8,
            "supplierIds": [5, 6]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.product_code, "TBX-0048");
        assert_eq!(product.supplier_ids(), &[5, 6]);
        assert_eq!(product.category, None);
        assert_eq!(product.category_label(), UNCATEGORIZED);
    }
}
