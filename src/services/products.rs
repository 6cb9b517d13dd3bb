//! Products Services, presents CRUD operations with products
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;
use validator::Validate;

use errors::Error;
use models::{Identity, NewProduct, Product, ProductId, ProductsSearchTerms, UpdateProduct, UserId};
use repos::ReposFactory;
use services::types::ServiceFuture;
use services::Service;

pub trait ProductsService {
    /// Returns product by ID
    fn get_product(&self, product_id: ProductId) -> ServiceFuture<Product>;
    /// Lists products matching search terms, limited by `from` and `count` parameters
    fn list_products(&self, search_terms: ProductsSearchTerms, from: ProductId, count: i64) -> ServiceFuture<Vec<Product>>;
    /// Creates new product owned by the caller
    fn create_product(&self, payload: NewProduct) -> ServiceFuture<Product>;
    /// Updates specific product
    fn update_product(&self, product_id: ProductId, payload: UpdateProduct) -> ServiceFuture<Product>;
    /// Deletes specific product
    fn delete_product(&self, product_id: ProductId) -> ServiceFuture<Product>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > ProductsService for Service<T, M, F>
{
    fn get_product(&self, product_id: ProductId) -> ServiceFuture<Product> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let products_repo = repo_factory.create_products_repo(&*conn, identity);
            products_repo
                .find(product_id)
                .and_then(|product| {
                    product.ok_or_else(|| {
                        format_err!("Product with id {} not found", product_id)
                            .context(Error::NotFound("Product not found".to_string()))
                            .into()
                    })
                }).map_err(|e: FailureError| e.context("Service products, get endpoint error occurred.").into())
        })
    }

    fn list_products(&self, search_terms: ProductsSearchTerms, from: ProductId, count: i64) -> ServiceFuture<Vec<Product>> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let products_repo = repo_factory.create_products_repo(&*conn, identity);
            products_repo
                .list(search_terms, from, count)
                .map_err(|e| e.context("Service products, list endpoint error occurred.").into())
        })
    }

    fn create_product(&self, payload: NewProduct) -> ServiceFuture<Product> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let identity = identity.ok_or_else(|| {
                FailureError::from(format_err!("Product created without identity").context(Error::Unauthenticated(
                    "Authorization header required".to_string(),
                )))
            })?;
            payload.validate().map_err(|e| FailureError::from(Error::Validate(e)))?;

            let payload = NewProduct {
                owner_id: resolve_owner(&identity, payload.owner_id),
                ..payload
            };
            let products_repo = repo_factory.create_products_repo(&*conn, Some(identity));
            conn.transaction::<Product, FailureError, _>(move || products_repo.create(payload))
                .map_err(|e: FailureError| e.context("Service products, create endpoint error occurred.").into())
        })
    }

    fn update_product(&self, product_id: ProductId, payload: UpdateProduct) -> ServiceFuture<Product> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            payload.validate().map_err(|e| FailureError::from(Error::Validate(e)))?;
            check_owner_change(identity.as_ref(), &payload)?;

            let products_repo = repo_factory.create_products_repo(&*conn, identity);
            conn.transaction::<Product, FailureError, _>(move || products_repo.update(product_id, payload))
                .map_err(|e: FailureError| e.context("Service products, update endpoint error occurred.").into())
        })
    }

    fn delete_product(&self, product_id: ProductId) -> ServiceFuture<Product> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let products_repo = repo_factory.create_products_repo(&*conn, identity);
            conn.transaction::<Product, FailureError, _>(move || products_repo.delete(product_id))
                .map_err(|e: FailureError| e.context("Service products, delete endpoint error occurred.").into())
        })
    }
}

/// Owner of a new product: users always own what they create, admins may pick another owner
pub fn resolve_owner(identity: &Identity, requested: UserId) -> UserId {
    if identity.is_admin() && requested != UserId::default() {
        requested
    } else {
        identity.user_id
    }
}

/// Only admins hand a product over to another owner
pub fn check_owner_change(identity: Option<&Identity>, payload: &UpdateProduct) -> Result<(), FailureError> {
    match (identity, payload.owner_id) {
        (_, None) => Ok(()),
        (Some(identity), Some(owner_id)) if identity.is_admin() || identity.user_id == owner_id => Ok(()),
        (_, Some(owner_id)) => Err(format_err!("Owner change to {} requested by {:?}", owner_id, identity)
            .context(Error::Forbidden("Only admin can change product owner".to_string()))
            .into()),
    }
}

#[cfg(test)]
mod tests {
    use tokio_core::reactor::Core;

    use errors;
    use models::*;
    use repos::repo_factory::tests::*;
    use services::*;

    fn new_product(owner_id: UserId) -> NewProduct {
        NewProduct {
            name: "Oat milk 1L".to_string(),
            price: 2.49,
            stock: 12,
            image: None,
            category_id: None,
            owner_id,
            supermarket_id: Some(SupermarketId(1)),
            barcode: Some(MOCK_BARCODE.to_string()),
            unit: Some("L".to_string()),
            unit_price: Some(2.49),
        }
    }

    fn price_update(price: f64) -> UpdateProduct {
        UpdateProduct {
            price: Some(price),
            ..Default::default()
        }
    }

    fn assert_forbidden(err: &::failure::Error) {
        match errors::find_kind(err) {
            Some(&errors::Error::Forbidden(_)) => (),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_resolve_owner() {
        assert_eq!(resolve_owner(&user_identity(), MOCK_OTHER_USER_ID), MOCK_USER_ID);
        assert_eq!(resolve_owner(&admin_identity(), MOCK_OTHER_USER_ID), MOCK_OTHER_USER_ID);
        assert_eq!(resolve_owner(&admin_identity(), UserId::default()), MOCK_ADMIN_ID);
    }

    #[test]
    fn test_get_product() {
        let mut core = Core::new().unwrap();
        let service = create_service(None);
        let result = core.run(service.get_product(MOCK_PRODUCT_ID)).unwrap();
        assert_eq!(result.id, MOCK_PRODUCT_ID);
    }

    #[test]
    fn test_get_missing_product() {
        let mut core = Core::new().unwrap();
        let service = create_service(None);
        let err = core.run(service.get_product(MOCK_MISSING_PRODUCT_ID)).unwrap_err();
        match errors::find_kind(&err) {
            Some(&errors::Error::NotFound(ref message)) => assert_eq!(message, "Product not found"),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_list_products() {
        let mut core = Core::new().unwrap();
        let service = create_service(None);
        let search_terms = ProductsSearchTerms {
            supermarket_id: Some(SupermarketId(2)),
            ..Default::default()
        };
        let result = core.run(service.list_products(search_terms, ProductId(0), 2)).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|product| product.supermarket_id == Some(SupermarketId(2))));
    }

    #[test]
    fn test_create_product_forces_owner() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(user_identity()));
        let result = core.run(service.create_product(new_product(MOCK_OTHER_USER_ID))).unwrap();
        assert_eq!(result.id, MOCK_NEW_PRODUCT_ID);
        assert_eq!(result.owner_id, MOCK_USER_ID);
    }

    #[test]
    fn test_create_product_anonymously() {
        let mut core = Core::new().unwrap();
        let service = create_service(None);
        let err = core.run(service.create_product(new_product(MOCK_USER_ID))).unwrap_err();
        match errors::find_kind(&err) {
            Some(&errors::Error::Unauthenticated(_)) => (),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_create_product_with_negative_price() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(user_identity()));
        let mut payload = new_product(MOCK_USER_ID);
        payload.price = -1.0;
        let err = core.run(service.create_product(payload)).unwrap_err();
        match errors::find_kind(&err) {
            Some(&errors::Error::Validate(_)) => (),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_update_own_product() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(user_identity()));
        let result = core.run(service.update_product(MOCK_PRODUCT_ID, price_update(1.99))).unwrap();
        assert_eq!(result.price, 1.99);
    }

    #[test]
    fn test_update_foreign_product() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(user_identity()));
        let err = core
            .run(service.update_product(MOCK_FOREIGN_PRODUCT_ID, price_update(1.99)))
            .unwrap_err();
        assert_forbidden(&err);
    }

    #[test]
    fn test_admin_updates_foreign_product() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(admin_identity()));
        let result = core
            .run(service.update_product(MOCK_FOREIGN_PRODUCT_ID, price_update(1.99)))
            .unwrap();
        assert_eq!(result.owner_id, MOCK_OTHER_USER_ID);
    }

    #[test]
    fn test_update_clears_unit_price() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(user_identity()));
        let payload = UpdateProduct {
            unit: Some(None),
            unit_price: Some(None),
            ..Default::default()
        };
        let result = core.run(service.update_product(MOCK_PRODUCT_ID, payload)).unwrap();
        assert_eq!(result.unit_price, None);
        assert_eq!(result.unit, None);
        assert_eq!(result.barcode, Some(MOCK_BARCODE.to_string()));
    }

    #[test]
    fn test_user_cannot_give_product_away() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(user_identity()));
        let payload = UpdateProduct {
            owner_id: Some(MOCK_OTHER_USER_ID),
            ..Default::default()
        };
        let err = core.run(service.update_product(MOCK_PRODUCT_ID, payload)).unwrap_err();
        assert_forbidden(&err);
    }

    #[test]
    fn test_admin_reassigns_owner() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(admin_identity()));
        let payload = UpdateProduct {
            owner_id: Some(MOCK_USER_ID),
            ..Default::default()
        };
        let result = core.run(service.update_product(MOCK_FOREIGN_PRODUCT_ID, payload)).unwrap();
        assert_eq!(result.owner_id, MOCK_USER_ID);
    }

    #[test]
    fn test_delete_foreign_product() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(user_identity()));
        let err = core.run(service.delete_product(MOCK_FOREIGN_PRODUCT_ID)).unwrap_err();
        assert_forbidden(&err);
    }

    #[test]
    fn test_delete_missing_product() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(admin_identity()));
        let err = core.run(service.delete_product(MOCK_MISSING_PRODUCT_ID)).unwrap_err();
        match errors::find_kind(&err) {
            Some(&errors::Error::NotFound(_)) => (),
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
