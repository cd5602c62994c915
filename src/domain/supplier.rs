use serde::{Deserialize, Serialize};

use super::SupplierId;

/// A supplier record, fetched individually by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: SupplierId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub min_quantity: u32,
}

impl Supplier {
    pub fn new(id: SupplierId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cost: 0.0,
            min_quantity: 0,
        }
    }
}
