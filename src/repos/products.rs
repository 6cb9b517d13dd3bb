//! Products repo, presents CRUD operations with db for products and
//! the barcode queries used by price comparison
use std::time::SystemTime;

use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::sql_types::Bool;
use diesel::Connection;
use failure::Error as FailureError;

use errors::Error;
use models::authorization::*;
use models::*;
use repos::acl;
use repos::legacy_acl::CheckScope;
use repos::types::{RepoAcl, RepoResult};
use schema::products::dsl as Products;
use schema::supermarkets::dsl as Supermarkets;

type OfferRow = (
    ProductId,
    String,
    f64,
    Option<f64>,
    Option<String>,
    Option<SupermarketId>,
    Option<String>,
    SystemTime,
);

type PriceRow = (Option<String>, Option<SupermarketId>, Option<f64>, f64);

/// Products repository, responsible for handling products
pub struct ProductsRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<Product>>,
}

pub trait ProductsRepo {
    /// Find specific product by ID
    fn find(&self, product_id: ProductId) -> RepoResult<Option<Product>>;

    /// Returns list of products matching search terms, limited by `from` and `count` parameters
    fn list(&self, search_terms: ProductsSearchTerms, from: ProductId, count: i64) -> RepoResult<Vec<Product>>;

    /// Creates new product
    fn create(&self, payload: NewProduct) -> RepoResult<Product>;

    /// Updates specific product
    fn update(&self, product_id: ProductId, payload: UpdateProduct) -> RepoResult<Product>;

    /// Deletes specific product
    fn delete(&self, product_id: ProductId) -> RepoResult<Product>;

    /// Every offer of a barcode joined with its supermarket, cheapest unit price first
    fn offers_by_barcode(&self, barcode: &str) -> RepoResult<Vec<Offer>>;

    /// Effective prices of barcodes in supermarkets, offers without supermarket are skipped
    fn prices_by_barcodes(&self, barcodes: &[String]) -> RepoResult<Vec<BarcodePrice>>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ProductsRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<Product>>) -> Self {
        Self { db_conn, acl }
    }

    fn find_existing(&self, product_id: ProductId) -> RepoResult<Product> {
        Products::products
            .find(product_id)
            .get_result::<Product>(self.db_conn)
            .optional()
            .map_err(FailureError::from)?
            .ok_or_else(|| {
                format_err!("Product with id {} not found", product_id)
                    .context(Error::NotFound("Product not found".to_string()))
                    .into()
            })
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ProductsRepo for ProductsRepoImpl<'a, T> {
    fn find(&self, product_id_arg: ProductId) -> RepoResult<Option<Product>> {
        debug!("Find in products with id {}.", product_id_arg);
        Products::products
            .find(product_id_arg)
            .get_result::<Product>(self.db_conn)
            .optional()
            .map_err(From::from)
            .and_then(|value: Option<Product>| {
                if let Some(ref value) = value {
                    acl::check(&*self.acl, Resource::Products, Action::Read, self, Some(value))?;
                }
                Ok(value)
            }).map_err(|e: FailureError| e.context(format!("Find product by id: {} error occurred", product_id_arg)).into())
    }

    fn list(&self, search_terms: ProductsSearchTerms, from: ProductId, count: i64) -> RepoResult<Vec<Product>> {
        debug!("Find in products by {:?} from {} count {}.", search_terms, from, count);
        type BoxedExpr = Box<BoxableExpression<Products::products, Pg, SqlType = Bool>>;

        let mut query: BoxedExpr = Box::new(Products::id.gt(from));

        if let Some(supermarket_id_filter) = search_terms.supermarket_id {
            query = Box::new(query.and(Products::supermarket_id.eq(supermarket_id_filter)));
        }

        if let Some(category_id_filter) = search_terms.category_id {
            query = Box::new(query.and(Products::category_id.eq(category_id_filter)));
        }

        if let Some(owner_id_filter) = search_terms.owner_id {
            query = Box::new(query.and(Products::owner_id.eq(owner_id_filter)));
        }

        if let Some(barcode_filter) = search_terms.barcode.clone() {
            query = Box::new(query.and(Products::barcode.eq(barcode_filter)));
        }

        Products::products
            .filter(query)
            .order(Products::id)
            .limit(count)
            .get_results(self.db_conn)
            .map_err(From::from)
            .and_then(|values: Vec<Product>| {
                for value in &values {
                    acl::check(&*self.acl, Resource::Products, Action::Read, self, Some(value))?;
                }
                Ok(values)
            }).map_err(|e: FailureError| {
                e.context(format!(
                    "Find in products by {:?} from {} count {} error occurred",
                    search_terms, from, count
                )).into()
            })
    }

    fn create(&self, payload: NewProduct) -> RepoResult<Product> {
        debug!("Create product {:?}.", payload);
        diesel::insert_into(Products::products)
            .values(&payload)
            .get_result::<Product>(self.db_conn)
            .map_err(From::from)
            .and_then(|value| {
                acl::check(&*self.acl, Resource::Products, Action::Create, self, Some(&value))?;
                Ok(value)
            }).map_err(|e: FailureError| e.context(format!("Create product {:?} error occurred", payload)).into())
    }

    fn update(&self, product_id_arg: ProductId, payload: UpdateProduct) -> RepoResult<Product> {
        debug!("Updating product with id {} and payload {:?}.", product_id_arg, payload);
        let mut payload = payload;
        payload.last_updated = Some(SystemTime::now());

        self.find_existing(product_id_arg)
            .and_then(|product| acl::check(&*self.acl, Resource::Products, Action::Update, self, Some(&product)))
            .and_then(|_| {
                diesel::update(Products::products.find(product_id_arg))
                    .set(&payload)
                    .get_result::<Product>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Updating product with id {} error occurred", product_id_arg))
                    .into()
            })
    }

    fn delete(&self, product_id_arg: ProductId) -> RepoResult<Product> {
        debug!("Delete product with id {}.", product_id_arg);
        self.find_existing(product_id_arg)
            .and_then(|product| acl::check(&*self.acl, Resource::Products, Action::Delete, self, Some(&product)))
            .and_then(|_| {
                diesel::delete(Products::products.find(product_id_arg))
                    .get_result::<Product>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Delete product with id {} error occurred", product_id_arg))
                    .into()
            })
    }

    fn offers_by_barcode(&self, barcode_arg: &str) -> RepoResult<Vec<Offer>> {
        debug!("Find offers with barcode {}.", barcode_arg);
        acl::check(&*self.acl, Resource::Products, Action::Read, self, None)
            .and_then(|_| {
                Products::products
                    .left_join(Supermarkets::supermarkets.on(Products::supermarket_id.eq(Supermarkets::id.nullable())))
                    .filter(Products::barcode.eq(barcode_arg))
                    .order((Products::unit_price.is_null(), Products::unit_price.asc(), Products::price.asc()))
                    .select((
                        Products::id,
                        Products::name,
                        Products::price,
                        Products::unit_price,
                        Products::unit,
                        Products::supermarket_id,
                        Supermarkets::name.nullable(),
                        Products::last_updated,
                    )).load::<OfferRow>(self.db_conn)
                    .map_err(From::from)
            }).map(|rows| {
                rows.into_iter()
                    .map(
                        |(product_id, name, price, unit_price, unit, supermarket_id, supermarket_name, last_updated)| Offer {
                            product_id,
                            name,
                            price,
                            unit_price,
                            unit,
                            supermarket_id,
                            supermarket_name,
                            last_updated: Some(last_updated),
                        },
                    ).collect()
            }).map_err(|e: FailureError| e.context(format!("Find offers with barcode {} error occurred", barcode_arg)).into())
    }

    fn prices_by_barcodes(&self, barcodes: &[String]) -> RepoResult<Vec<BarcodePrice>> {
        debug!("Find prices for barcodes {:?}.", barcodes);
        acl::check(&*self.acl, Resource::Products, Action::Read, self, None)
            .and_then(|_| {
                Products::products
                    .filter(Products::barcode.eq_any(barcodes.to_vec()))
                    .select((Products::barcode, Products::supermarket_id, Products::unit_price, Products::price))
                    .load::<PriceRow>(self.db_conn)
                    .map_err(From::from)
            }).map(|rows| {
                rows.into_iter()
                    .filter_map(|(barcode, supermarket_id, unit_price, price)| match (barcode, supermarket_id) {
                        (Some(barcode), Some(supermarket_id)) => Some(BarcodePrice {
                            barcode,
                            supermarket_id,
                            price: unit_price.unwrap_or(price),
                        }),
                        _ => None,
                    }).collect()
            }).map_err(|e: FailureError| e.context(format!("Find prices for barcodes {:?} error occurred", barcodes)).into())
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, Product>
    for ProductsRepoImpl<'a, T>
{
    fn is_in_scope(&self, user_id: UserId, scope: &Scope, obj: Option<&Product>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => obj.map(|product| product.owner_id == user_id).unwrap_or(false),
        }
    }
}
