//! Models for basket comparison across supermarkets
use models::types::SupermarketId;

/// Requested line of a basket
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BasketItem {
    pub barcode: String,
    pub quantity: i32,
}

/// Payload for basket comparison
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BasketRequest {
    pub items: Vec<BasketItem>,
}

/// Effective price of a barcode in a supermarket
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodePrice {
    pub barcode: String,
    pub supermarket_id: SupermarketId,
    pub price: f64,
}

/// Basket outcome for one supermarket
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SupermarketTotal {
    pub supermarket_id: SupermarketId,
    pub supermarket_name: String,
    pub total: f64,
    pub missing: Vec<String>,
    pub matched_items: usize,
}

/// Basket outcomes for all supermarkets
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BasketComparison {
    pub results: Vec<SupermarketTotal>,
}
