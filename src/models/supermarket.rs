//! Module containing supermarket model for query, insert, update
use std::time::SystemTime;

use validator::Validate;

use models::time::serialize_utc_instant;
use models::types::{SupermarketId, UserId};
use models::validation_rules::*;
use schema::supermarkets;

/// Payload for querying supermarkets
#[derive(Debug, Serialize, Queryable, Clone, PartialEq)]
pub struct Supermarket {
    pub id: SupermarketId,
    pub name: String,
    pub address: Option<String>,
    pub owner_id: Option<UserId>,
    #[serde(serialize_with = "serialize_utc_instant")]
    pub created_at: SystemTime,
}

/// Payload for creating supermarkets
#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug)]
#[table_name = "supermarkets"]
pub struct NewSupermarket {
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    pub address: Option<String>,
    pub owner_id: Option<UserId>,
}

/// Payload for updating supermarkets
#[derive(Serialize, Deserialize, AsChangeset, Validate, Clone, Debug, Default)]
#[table_name = "supermarkets"]
pub struct UpdateSupermarket {
    #[validate(custom = "validate_not_blank")]
    pub name: Option<String>,
    pub address: Option<String>,
    pub owner_id: Option<UserId>,
}

impl UpdateSupermarket {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none() && self.owner_id.is_none()
    }
}

/// Price statistics of one supermarket
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SupermarketStats {
    pub supermarket_id: SupermarketId,
    pub supermarket_name: String,
    pub product_count: i64,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}
