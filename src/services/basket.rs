//! Basket comparison, totals of a shopping list in every supermarket
use std::collections::HashMap;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use errors::Error;
use models::{BarcodePrice, BasketComparison, BasketItem, BasketRequest, Supermarket, SupermarketId, SupermarketTotal};
use repos::ReposFactory;
use services::types::ServiceFuture;
use services::Service;

pub trait BasketService {
    /// Returns basket total, matched and missing items for every supermarket
    fn compare_basket(&self, payload: BasketRequest) -> ServiceFuture<BasketComparison>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > BasketService for Service<T, M, F>
{
    fn compare_basket(&self, payload: BasketRequest) -> ServiceFuture<BasketComparison> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            validate_basket(&payload)?;

            let supermarkets_repo = repo_factory.create_supermarkets_repo(&*conn, identity);
            let products_repo = repo_factory.create_products_repo(&*conn, identity);
            conn.transaction::<BasketComparison, FailureError, _>(move || {
                let supermarkets = supermarkets_repo.list_all()?;
                if supermarkets.is_empty() {
                    return Err(format_err!("Basket compared without supermarkets")
                        .context(Error::Unavailable("no supermarkets available".to_string()))
                        .into());
                }

                let barcodes = distinct_barcodes(&payload.items);
                let prices = products_repo.prices_by_barcodes(&barcodes)?;

                let mut aggregator = BasketAggregator::new(&supermarkets, &payload.items);
                for item in &payload.items {
                    let line_prices = min_price_per_supermarket(&item.barcode, &prices);
                    aggregator.add_line(item, &line_prices);
                }
                Ok(aggregator.finish())
            }).map_err(|e: FailureError| e.context("Service basket, compare_basket endpoint error occurred.").into())
        })
    }
}

/// Rejects empty baskets, blank barcodes and negative quantities
pub fn validate_basket(payload: &BasketRequest) -> Result<(), FailureError> {
    if payload.items.is_empty() {
        return Err(format_err!("Basket is empty")
            .context(Error::InvalidArgument("no items provided".to_string()))
            .into());
    }

    for item in &payload.items {
        if item.barcode.trim().is_empty() {
            return Err(format_err!("Basket item without barcode")
                .context(Error::InvalidArgument("barcode is required for every item".to_string()))
                .into());
        }
        if item.quantity < 0 {
            return Err(format_err!("Basket item {} has quantity {}", item.barcode, item.quantity)
                .context(Error::InvalidArgument("quantity must not be negative".to_string()))
                .into());
        }
    }

    Ok(())
}

/// Requested barcodes without repeats, in request order
pub fn distinct_barcodes(items: &[BasketItem]) -> Vec<String> {
    let mut barcodes: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !barcodes.contains(&item.barcode) {
            barcodes.push(item.barcode.clone());
        }
    }
    barcodes
}

/// Cheapest effective price of the barcode in each supermarket
pub fn min_price_per_supermarket(barcode: &str, prices: &[BarcodePrice]) -> HashMap<SupermarketId, f64> {
    let mut result = HashMap::new();
    for price in prices.iter().filter(|price| price.barcode == barcode) {
        let entry = result.entry(price.supermarket_id).or_insert(price.price);
        if price.price < *entry {
            *entry = price.price;
        }
    }
    result
}

/// Running totals, one per supermarket in load order
pub struct BasketAggregator {
    totals: Vec<SupermarketTotal>,
}

impl BasketAggregator {
    /// Every supermarket starts with zero total and all barcodes missing
    pub fn new(supermarkets: &[Supermarket], items: &[BasketItem]) -> Self {
        let missing = distinct_barcodes(items);
        let totals = supermarkets
            .iter()
            .map(|supermarket| SupermarketTotal {
                supermarket_id: supermarket.id,
                supermarket_name: supermarket.name.clone(),
                total: 0.0,
                missing: missing.clone(),
                matched_items: 0,
            }).collect();
        Self { totals }
    }

    /// Adds line item priced with `prices` to every supermarket offering it
    pub fn add_line(&mut self, item: &BasketItem, prices: &HashMap<SupermarketId, f64>) {
        for total in &mut self.totals {
            if let Some(price) = prices.get(&total.supermarket_id) {
                total.total += price * f64::from(item.quantity);
                if let Some(position) = total.missing.iter().position(|barcode| *barcode == item.barcode) {
                    total.missing.remove(position);
                    total.matched_items += 1;
                }
            }
        }
    }

    pub fn finish(self) -> BasketComparison {
        BasketComparison { results: self.totals }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio_core::reactor::Core;

    use errors;
    use repos::repo_factory::tests::*;

    fn item(barcode: &str, quantity: i32) -> BasketItem {
        BasketItem {
            barcode: barcode.to_string(),
            quantity,
        }
    }

    fn aggregate(items: Vec<BasketItem>) -> BasketComparison {
        let supermarkets = mock_supermarkets();
        let prices = mock_prices();
        let mut aggregator = BasketAggregator::new(&supermarkets, &items);
        for item in &items {
            aggregator.add_line(item, &min_price_per_supermarket(&item.barcode, &prices));
        }
        aggregator.finish()
    }

    fn assert_kind_message(err: &FailureError, expected: &str) {
        match errors::find_kind(err) {
            Some(&errors::Error::InvalidArgument(ref message)) => assert_eq!(message, expected),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_every_supermarket_is_reported() {
        let result = aggregate(vec![item(MOCK_BARCODE, 1), item(MOCK_UNKNOWN_BARCODE, 2)]);
        assert_eq!(result.results.len(), mock_supermarkets().len());
        for total in &result.results {
            assert!(total.total >= 0.0);
            assert!(total.matched_items <= 2);
            assert!(total.missing.contains(&MOCK_UNKNOWN_BARCODE.to_string()));
        }
    }

    #[test]
    fn test_duplicate_listing_counts_cheapest_price() {
        let result = aggregate(vec![item(MOCK_BARCODE, 2)]);
        let fresh_market = &result.results[0];
        assert_eq!(fresh_market.supermarket_id, SupermarketId(1));
        assert!((fresh_market.total - 3.6).abs() < 1e-9);
        assert_eq!(fresh_market.matched_items, 1);
        assert!(fresh_market.missing.is_empty());
    }

    #[test]
    fn test_totals_and_missing_per_supermarket() {
        let result = aggregate(vec![item(MOCK_BARCODE, 1), item(MOCK_PLAIN_BARCODE, 2)]);

        let fresh_market = &result.results[0];
        assert!((fresh_market.total - 1.8).abs() < 1e-9);
        assert_eq!(fresh_market.missing, vec![MOCK_PLAIN_BARCODE.to_string()]);

        let budget_foods = &result.results[1];
        assert!((budget_foods.total - 7.5).abs() < 1e-9);
        assert_eq!(budget_foods.matched_items, 2);
        assert!(budget_foods.missing.is_empty());

        let corner_shop = &result.results[2];
        assert_eq!(corner_shop.total, 0.0);
        assert_eq!(corner_shop.matched_items, 0);
        assert_eq!(corner_shop.missing, vec![MOCK_BARCODE.to_string(), MOCK_PLAIN_BARCODE.to_string()]);
    }

    #[test]
    fn test_repeated_barcode_is_matched_once() {
        let result = aggregate(vec![item(MOCK_BARCODE, 1), item(MOCK_BARCODE, 1)]);
        let budget_foods = &result.results[1];
        assert!((budget_foods.total - 3.0).abs() < 1e-9);
        assert_eq!(budget_foods.matched_items, 1);
        assert_eq!(result.results[2].missing, vec![MOCK_BARCODE.to_string()]);
    }

    #[test]
    fn test_validate_basket() {
        let err = validate_basket(&BasketRequest { items: vec![] }).unwrap_err();
        assert_kind_message(&err, "no items provided");

        assert!(validate_basket(&BasketRequest { items: vec![item(" ", 1)] }).is_err());
        assert!(validate_basket(&BasketRequest {
            items: vec![item(MOCK_BARCODE, -1)]
        }).is_err());
        assert!(validate_basket(&BasketRequest {
            items: vec![item(MOCK_BARCODE, 0)]
        }).is_ok());
    }

    #[test]
    fn test_compare_basket() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(user_identity()));
        let work = service.compare_basket(BasketRequest {
            items: vec![item(MOCK_BARCODE, 1), item(MOCK_UNKNOWN_BARCODE, 1)],
        });
        let result = core.run(work).unwrap();
        assert_eq!(result.results.len(), 3);
        assert_eq!(result.results[1].matched_items, 1);
        assert_eq!(result.results[1].missing, vec![MOCK_UNKNOWN_BARCODE.to_string()]);
    }

    #[test]
    fn test_compare_basket_without_supermarkets() {
        let mut core = Core::new().unwrap();
        let service = create_service_with_factory(Some(user_identity()), MOCK_EMPTY_REPO_FACTORY);
        let work = service.compare_basket(BasketRequest {
            items: vec![item(MOCK_BARCODE, 1)],
        });
        let err = core.run(work).unwrap_err();
        match errors::find_kind(&err) {
            Some(&errors::Error::Unavailable(ref message)) => assert_eq!(message, "no supermarkets available"),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_compare_empty_basket() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(user_identity()));
        let err = core.run(service.compare_basket(BasketRequest { items: vec![] })).unwrap_err();
        assert_kind_message(&err, "no items provided");
    }
}
