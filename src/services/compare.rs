//! Price comparison of a single barcode across supermarkets

use std::cmp::Ordering;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use errors::Error;
use models::{BarcodeComparison, Offer};
use repos::ReposFactory;
use services::types::ServiceFuture;
use services::Service;

pub trait CompareService {
    /// Returns all offers for barcode with the best one
    fn compare_by_barcode(&self, barcode: String) -> ServiceFuture<BarcodeComparison>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > CompareService for Service<T, M, F>
{
    fn compare_by_barcode(&self, barcode: String) -> ServiceFuture<BarcodeComparison> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let barcode = barcode.trim().to_string();
            if barcode.is_empty() {
                return Err(format_err!("Empty barcode")
                    .context(Error::InvalidArgument("barcode is required".to_string()))
                    .into());
            }

            let products_repo = repo_factory.create_products_repo(&*conn, identity);
            products_repo
                .offers_by_barcode(&barcode)
                .and_then(|offers| compare_offers(barcode.clone(), offers))
                .map_err(|e: FailureError| e.context("Service compare, compare_by_barcode endpoint error occurred.").into())
        })
    }
}

/// Builds comparison out of offers for one barcode
pub fn compare_offers(barcode: String, offers: Vec<Offer>) -> Result<BarcodeComparison, FailureError> {
    if offers.is_empty() {
        return Err(format_err!("No offers for barcode {}", barcode)
            .context(Error::NotFound("no offers found for barcode".to_string()))
            .into());
    }

    let results = rank_offers(offers);
    let best = best_offer_index(&results).map(|index| results[index].clone());

    Ok(BarcodeComparison { barcode, results, best })
}

/// Offers with unit price first, then by ascending effective price. The sort is stable.
pub fn rank_offers(mut offers: Vec<Offer>) -> Vec<Offer> {
    offers.sort_by(|a, b| {
        a.unit_price
            .is_none()
            .cmp(&b.unit_price.is_none())
            .then_with(|| compare_prices(a.effective_price(), b.effective_price()))
            .then_with(|| compare_prices(a.price, b.price))
    });
    offers
}

/// Smallest unit price wins when any offer has one, otherwise smallest plain price.
/// The first seen offer wins a tie.
pub fn best_offer_index(offers: &[Offer]) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_unit_price: Option<f64> = None;

    for (index, offer) in offers.iter().enumerate() {
        match offer.unit_price {
            Some(unit_price) => {
                if best_unit_price.map_or(true, |current| unit_price < current) {
                    best_unit_price = Some(unit_price);
                    best = Some(index);
                }
            }
            None => {
                if best_unit_price.is_none() && best.map_or(true, |current| offer.price < offers[current].price) {
                    best = Some(index);
                }
            }
        }
    }

    best
}

fn compare_prices(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio_core::reactor::Core;

    use errors;
    use models::*;
    use repos::repo_factory::tests::*;

    fn offer(id: i32, price: f64, unit_price: Option<f64>) -> Offer {
        Offer {
            product_id: ProductId(id),
            name: format!("Offer {}", id),
            price,
            unit_price,
            unit: unit_price.map(|_| "kg".to_string()),
            supermarket_id: Some(SupermarketId(id)),
            supermarket_name: Some(format!("Supermarket {}", id)),
            last_updated: None,
        }
    }

    #[test]
    fn test_best_is_smallest_unit_price() {
        let offers = vec![offer(1, 4.0, Some(2.0)), offer(2, 3.5, Some(1.5)), offer(3, 3.0, None)];
        let comparison = compare_offers("4600000000001".to_string(), offers).unwrap();
        assert_eq!(comparison.best.unwrap().product_id, ProductId(2));
        assert_eq!(comparison.results.len(), 3);
    }

    #[test]
    fn test_best_is_smallest_price_without_unit_prices() {
        let offers = vec![offer(1, 5.0, None), offer(2, 3.0, None)];
        let comparison = compare_offers("4600000000002".to_string(), offers).unwrap();
        assert_eq!(comparison.best.unwrap().product_id, ProductId(2));
    }

    #[test]
    fn test_unit_price_beats_cheaper_plain_price() {
        let offers = vec![offer(1, 0.5, None), offer(2, 9.0, Some(4.0))];
        assert_eq!(best_offer_index(&offers), Some(1));
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let offers = vec![offer(1, 2.0, Some(1.0)), offer(2, 1.0, Some(1.0))];
        assert_eq!(best_offer_index(&offers), Some(0));
        let offers = vec![offer(1, 2.0, None), offer(2, 2.0, None)];
        assert_eq!(best_offer_index(&offers), Some(0));
    }

    #[test]
    fn test_rank_puts_unit_prices_first() {
        let ranked = rank_offers(vec![offer(1, 1.0, None), offer(2, 4.0, Some(3.0)), offer(3, 4.0, Some(2.0))]);
        let ids: Vec<ProductId> = ranked.iter().map(|o| o.product_id).collect();
        assert_eq!(ids, vec![ProductId(3), ProductId(2), ProductId(1)]);
    }

    #[test]
    fn test_no_offers_is_not_found() {
        let err = compare_offers("0000".to_string(), vec![]).unwrap_err();
        match errors::find_kind(&err) {
            Some(&errors::Error::NotFound(ref message)) => assert_eq!(message, "no offers found for barcode"),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_compare_by_barcode() {
        let mut core = Core::new().unwrap();
        let service = create_service(None);
        let work = service.compare_by_barcode(MOCK_BARCODE.to_string());
        let result = core.run(work).unwrap();
        assert_eq!(result.barcode, MOCK_BARCODE);
        assert_eq!(result.results.len(), 3);
        assert_eq!(result.best.unwrap().unit_price, Some(1.5));
    }

    #[test]
    fn test_compare_by_unknown_barcode() {
        let mut core = Core::new().unwrap();
        let service = create_service(None);
        let work = service.compare_by_barcode(MOCK_UNKNOWN_BARCODE.to_string());
        let err = core.run(work).unwrap_err();
        match errors::find_kind(&err) {
            Some(&errors::Error::NotFound(_)) => (),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_compare_by_blank_barcode() {
        let mut core = Core::new().unwrap();
        let service = create_service(None);
        let work = service.compare_by_barcode("  ".to_string());
        let err = core.run(work).unwrap_err();
        match errors::find_kind(&err) {
            Some(&errors::Error::InvalidArgument(_)) => (),
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
