//! Module containing product model for query, insert, update
use std::time::SystemTime;

use serde::{Deserialize, Deserializer};
use validator::Validate;

use models::time::serialize_utc_instant;
use models::types::{CategoryId, ProductId, SupermarketId, UserId};
use models::validation_rules::*;
use schema::products;

/// Payload for querying products
#[derive(Debug, Serialize, Queryable, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub image: Option<String>,
    pub category_id: Option<CategoryId>,
    pub owner_id: UserId,
    pub supermarket_id: Option<SupermarketId>,
    pub barcode: Option<String>,
    pub unit: Option<String>,
    pub unit_price: Option<f64>,
    #[serde(serialize_with = "serialize_utc_instant")]
    pub last_updated: SystemTime, // UTC 0, generated at db level
    #[serde(serialize_with = "serialize_utc_instant")]
    pub created_at: SystemTime, // UTC 0, generated at db level
}

impl Product {
    /// Price used for comparison between supermarkets
    pub fn effective_price(&self) -> f64 {
        self.unit_price.unwrap_or(self.price)
    }
}

/// Payload for creating products
#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug)]
#[table_name = "products"]
pub struct NewProduct {
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    #[validate(range(min = "0.0", max = "1000000000.0"))]
    pub price: f64,
    #[serde(default)]
    pub stock: i32,
    pub image: Option<String>,
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub owner_id: UserId,
    pub supermarket_id: Option<SupermarketId>,
    #[validate(custom = "validate_barcode")]
    pub barcode: Option<String>,
    pub unit: Option<String>,
    #[validate(range(min = "0.0", max = "1000000000.0"))]
    pub unit_price: Option<f64>,
}

/// Payload for updating products. Nullable columns take `Option<Option<_>>`:
/// a missing field keeps the value, an explicit `null` clears it.
#[derive(Serialize, Deserialize, AsChangeset, Validate, Clone, Debug, Default)]
#[table_name = "products"]
pub struct UpdateProduct {
    #[validate(custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(range(min = "0.0", max = "1000000000.0"))]
    pub price: Option<f64>,
    pub stock: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub category_id: Option<Option<CategoryId>>,
    pub owner_id: Option<UserId>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub supermarket_id: Option<Option<SupermarketId>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[validate(custom = "validate_barcode")]
    pub barcode: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub unit: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[validate(range(min = "0.0", max = "1000000000.0"))]
    pub unit_price: Option<Option<f64>>,
    #[serde(skip_deserializing)]
    pub last_updated: Option<SystemTime>,
}

fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Filters for products listing
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ProductsSearchTerms {
    pub supermarket_id: Option<SupermarketId>,
    pub category_id: Option<CategoryId>,
    pub owner_id: Option<UserId>,
    pub barcode: Option<String>,
}
