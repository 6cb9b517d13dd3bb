//! Models for price comparison of a single barcode
use std::time::SystemTime;

use models::time::serialize_optional_utc_instant;
use models::types::{ProductId, SupermarketId};

/// One offer of a good, product joined with its supermarket
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Offer {
    pub product_id: ProductId,
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supermarket_id: Option<SupermarketId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supermarket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_optional_utc_instant")]
    pub last_updated: Option<SystemTime>,
}

impl Offer {
    pub fn effective_price(&self) -> f64 {
        self.unit_price.unwrap_or(self.price)
    }
}

/// Ranked offers for a barcode and the best of them
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BarcodeComparison {
    pub barcode: String,
    pub results: Vec<Offer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best: Option<Offer>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_offer_omits_missing_fields() {
        let offer = Offer {
            product_id: ProductId(3),
            name: "Bread".to_string(),
            price: 1.2,
            unit_price: None,
            unit: None,
            supermarket_id: None,
            supermarket_name: None,
            last_updated: Some(UNIX_EPOCH + Duration::from_secs(1_500_000_000)),
        };
        let value = serde_json::to_value(&offer).unwrap();
        assert_eq!(value["product_id"], 3);
        assert_eq!(value["last_updated"], "2017-07-14T02:40:00Z");
        assert!(value.get("unit_price").is_none());
        assert!(value.get("supermarket_name").is_none());
    }
}
