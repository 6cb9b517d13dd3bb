//! Supermarkets Services, presents CRUD operations with supermarkets
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;
use validator::Validate;

use errors::Error;
use models::{NewSupermarket, Supermarket, SupermarketId, SupermarketStats, UpdateSupermarket};
use repos::ReposFactory;
use services::types::ServiceFuture;
use services::Service;

pub trait SupermarketsService {
    /// Returns supermarket by ID
    fn get_supermarket(&self, supermarket_id: SupermarketId) -> ServiceFuture<Supermarket>;
    /// Lists supermarkets limited by `from` and `count` parameters
    fn list_supermarkets(&self, from: SupermarketId, count: i64) -> ServiceFuture<Vec<Supermarket>>;
    /// Creates new supermarket
    fn create_supermarket(&self, payload: NewSupermarket) -> ServiceFuture<Supermarket>;
    /// Updates specific supermarket
    fn update_supermarket(&self, supermarket_id: SupermarketId, payload: UpdateSupermarket) -> ServiceFuture<Supermarket>;
    /// Deletes specific supermarket
    fn delete_supermarket(&self, supermarket_id: SupermarketId) -> ServiceFuture<Supermarket>;
    /// Product count and prices of every supermarket
    fn supermarkets_stats(&self) -> ServiceFuture<Vec<SupermarketStats>>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > SupermarketsService for Service<T, M, F>
{
    fn get_supermarket(&self, supermarket_id: SupermarketId) -> ServiceFuture<Supermarket> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let supermarkets_repo = repo_factory.create_supermarkets_repo(&*conn, identity);
            supermarkets_repo
                .find(supermarket_id)
                .and_then(|supermarket| {
                    supermarket.ok_or_else(|| {
                        format_err!("Supermarket with id {} not found", supermarket_id)
                            .context(Error::NotFound("Supermarket not found".to_string()))
                            .into()
                    })
                }).map_err(|e: FailureError| e.context("Service supermarkets, get endpoint error occurred.").into())
        })
    }

    fn list_supermarkets(&self, from: SupermarketId, count: i64) -> ServiceFuture<Vec<Supermarket>> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let supermarkets_repo = repo_factory.create_supermarkets_repo(&*conn, identity);
            supermarkets_repo
                .list(from, count)
                .map_err(|e| e.context("Service supermarkets, list endpoint error occurred.").into())
        })
    }

    fn create_supermarket(&self, payload: NewSupermarket) -> ServiceFuture<Supermarket> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            payload.validate().map_err(|e| FailureError::from(Error::Validate(e)))?;

            let supermarkets_repo = repo_factory.create_supermarkets_repo(&*conn, identity);
            supermarkets_repo
                .create(payload)
                .map_err(|e| e.context("Service supermarkets, create endpoint error occurred.").into())
        })
    }

    fn update_supermarket(&self, supermarket_id: SupermarketId, payload: UpdateSupermarket) -> ServiceFuture<Supermarket> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            if payload.is_empty() {
                return Err(format_err!("Empty update of supermarket {}", supermarket_id)
                    .context(Error::InvalidArgument("No fields to update".to_string()))
                    .into());
            }
            payload.validate().map_err(|e| FailureError::from(Error::Validate(e)))?;

            let supermarkets_repo = repo_factory.create_supermarkets_repo(&*conn, identity);
            supermarkets_repo
                .update(supermarket_id, payload)
                .map_err(|e| e.context("Service supermarkets, update endpoint error occurred.").into())
        })
    }

    fn delete_supermarket(&self, supermarket_id: SupermarketId) -> ServiceFuture<Supermarket> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let supermarkets_repo = repo_factory.create_supermarkets_repo(&*conn, identity);
            supermarkets_repo
                .delete(supermarket_id)
                .map_err(|e| e.context("Service supermarkets, delete endpoint error occurred.").into())
        })
    }

    fn supermarkets_stats(&self) -> ServiceFuture<Vec<SupermarketStats>> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let supermarkets_repo = repo_factory.create_supermarkets_repo(&*conn, identity);
            supermarkets_repo
                .stats()
                .map_err(|e| e.context("Service supermarkets, stats endpoint error occurred.").into())
        })
    }
}
