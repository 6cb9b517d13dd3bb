//! `Controller` is a top layer that handles all http-related
//! stuff like reading bodies, parsing params, forming a response.
//! Basically it provides inputs to `Service` layer and converts outputs
//! of `Service` layer to http responses

pub mod application;
pub mod context;
pub mod gate;
pub mod router;
pub mod routes;
pub mod types;
pub mod utils;

use std::collections::HashMap;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use futures::future;
use futures::Future;
use hyper::header::Authorization;
use hyper::server::Request;
use hyper::{Method, StatusCode};
use r2d2::ManageConnection;
use serde_json;

use self::application::Controller;
use self::context::{DynamicContext, StaticContext};
use self::routes::Route;
use self::types::{ControllerFuture, JsonResponse};
use self::utils::{parse_body, parse_query, query_param};
use errors::Error;
use models::*;
use repos::repo_factory::*;
use services::*;

macro_rules! serialize_future {
    ($e:expr) => {
        serialize_future!($e, StatusCode::Ok)
    };
    ($e:expr, $status:expr) => {
        Box::new($e.and_then(move |resp| {
            serde_json::to_string(&resp)
                .map(|body| JsonResponse { status: $status, body })
                .map_err(FailureError::from)
        }))
    };
}

/// Controller handles route parsing and calling `Service` layer
pub struct ControllerImpl<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    pub static_context: StaticContext<T, M, F>,
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > ControllerImpl<T, M, F>
{
    /// Create a new controller based on services
    pub fn new(static_context: StaticContext<T, M, F>) -> Self {
        Self { static_context }
    }
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > Controller for ControllerImpl<T, M, F>
{
    /// Handle a request and get future response
    fn call(&self, req: Request) -> ControllerFuture {
        let (method, uri, _, headers, payload) = req.deconstruct();
        let auth_header = headers.get::<Authorization<String>>().map(|auth| auth.0.clone());

        let route = match self.static_context.route_parser.test(uri.path()) {
            Some(route) => route,
            None => return not_found(&method, uri.path()),
        };

        let identity = match gate::resolve_identity(
            &*self.static_context.token_service,
            &method,
            &route,
            auth_header.as_ref().map(|header| header.as_str()),
        ) {
            Ok(identity) => identity,
            Err(e) => return Box::new(future::err(e)),
        };

        let default_count = self.static_context.config.listing.default_count;
        let query = parse_query(uri.query());
        let service = Service::new(self.static_context.clone(), DynamicContext::new(identity));

        match (&method, route) {
            // GET /health, GET /healthcheck
            (&Method::Get, Route::Healthcheck) => serialize_future!(SystemServiceImpl::default().healthcheck()),

            // POST /register
            (&Method::Post, Route::Register) => serialize_future!(
                parse_body::<NewUser>(payload).and_then(move |new_user| service.register(new_user)),
                StatusCode::Created
            ),

            // POST /login
            (&Method::Post, Route::Login) => {
                serialize_future!(parse_body::<Credentials>(payload).and_then(move |credentials| service.login(credentials)))
            }

            // GET /me
            (&Method::Get, Route::Me) => serialize_future!(service.me()),

            // GET /users
            (&Method::Get, Route::Users) => serialize_future!(service.list_users()),

            // GET /products
            (&Method::Get, Route::Products) => serialize_future!(
                future::result(products_listing(&query, default_count))
                    .and_then(move |(search_terms, from, count)| service.list_products(search_terms, from, count))
            ),

            // POST /products
            (&Method::Post, Route::Products) => serialize_future!(
                parse_body::<NewProduct>(payload).and_then(move |new_product| service.create_product(new_product)),
                StatusCode::Created
            ),

            // GET /products/<product_id>
            (&Method::Get, Route::Product(product_id)) => serialize_future!(service.get_product(product_id)),

            // PUT /products/<product_id>
            (&Method::Put, Route::Product(product_id)) => serialize_future!(
                parse_body::<UpdateProduct>(payload)
                    .and_then(move |update_product| service.update_product(product_id, update_product))
            ),

            // DELETE /products/<product_id>
            (&Method::Delete, Route::Product(product_id)) => serialize_future!(service.delete_product(product_id)),

            // GET /products/compare/<barcode>
            (&Method::Get, Route::ProductsCompare(barcode)) => serialize_future!(service.compare_by_barcode(barcode)),

            // POST /basket/compare
            (&Method::Post, Route::BasketCompare) => serialize_future!(
                parse_body::<BasketRequest>(payload)
                    .map_err(|e| FailureError::from(e.context(Error::InvalidArgument("invalid body".to_string()))))
                    .and_then(move |basket| service.compare_basket(basket))
            ),

            // GET /supermarkets
            (&Method::Get, Route::Supermarkets) => serialize_future!(
                future::result(supermarkets_listing(&query, default_count))
                    .and_then(move |(from, count)| service.list_supermarkets(from, count))
            ),

            // GET /supermarkets/stats
            (&Method::Get, Route::SupermarketsStats) => serialize_future!(service.supermarkets_stats()),

            // GET /supermarkets/<supermarket_id>
            (&Method::Get, Route::Supermarket(supermarket_id)) => serialize_future!(service.get_supermarket(supermarket_id)),

            // POST /admin/supermarkets
            (&Method::Post, Route::AdminSupermarkets) => serialize_future!(
                parse_body::<NewSupermarket>(payload).and_then(move |new_supermarket| service.create_supermarket(new_supermarket)),
                StatusCode::Created
            ),

            // PUT /admin/supermarkets/<supermarket_id>
            (&Method::Put, Route::AdminSupermarket(supermarket_id)) => serialize_future!(
                parse_body::<UpdateSupermarket>(payload)
                    .and_then(move |update_supermarket| service.update_supermarket(supermarket_id, update_supermarket))
            ),

            // DELETE /admin/supermarkets/<supermarket_id>
            (&Method::Delete, Route::AdminSupermarket(supermarket_id)) => serialize_future!(service.delete_supermarket(supermarket_id)),

            // Fallback
            (method, _) => not_found(method, uri.path()),
        }
    }
}

fn not_found(method: &Method, path: &str) -> ControllerFuture {
    Box::new(future::err(FailureError::from(
        format_err!("Request to non existing endpoint {} {}", method, path).context(Error::NotFound("Not found".to_string())),
    )))
}

fn products_listing(query: &HashMap<String, String>, default_count: i64) -> Result<(ProductsSearchTerms, ProductId, i64), FailureError> {
    let search_terms = ProductsSearchTerms {
        supermarket_id: query_param(query, "supermarket_id")?,
        category_id: query_param(query, "category_id")?,
        owner_id: query_param(query, "owner_id")?,
        barcode: query_param(query, "barcode")?,
    };
    let from = query_param(query, "from")?.unwrap_or_default();
    let count = listing_count(query, default_count)?;
    Ok((search_terms, from, count))
}

fn supermarkets_listing(query: &HashMap<String, String>, default_count: i64) -> Result<(SupermarketId, i64), FailureError> {
    let from = query_param(query, "from")?.unwrap_or_default();
    let count = listing_count(query, default_count)?;
    Ok((from, count))
}

fn listing_count(query: &HashMap<String, String>, default_count: i64) -> Result<i64, FailureError> {
    match query_param::<i64>(query, "count")? {
        Some(count) if count < 0 => Err(format_err!("Negative count {}", count)
            .context(Error::InvalidArgument("count must not be negative".to_string()))
            .into()),
        Some(count) => Ok(count),
        None => Ok(default_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products_listing() {
        let query = parse_query(Some("from=5&count=20&supermarket_id=2&barcode=4600000000001"));
        let (search_terms, from, count) = products_listing(&query, 100).unwrap();
        assert_eq!(from, ProductId(5));
        assert_eq!(count, 20);
        assert_eq!(search_terms.supermarket_id, Some(SupermarketId(2)));
        assert_eq!(search_terms.barcode, Some("4600000000001".to_string()));
        assert_eq!(search_terms.owner_id, None);
    }

    #[test]
    fn test_listing_defaults() {
        let query = parse_query(None);
        assert_eq!(supermarkets_listing(&query, 100).unwrap(), (SupermarketId(0), 100));
        assert!(supermarkets_listing(&parse_query(Some("count=-1")), 100).is_err());
        assert!(products_listing(&parse_query(Some("owner_id=me")), 100).is_err());
    }
}
