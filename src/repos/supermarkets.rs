//! Supermarkets repo, presents CRUD operations with db for supermarkets
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{BigInt, Double, Integer, Nullable, VarChar};
use diesel::Connection;
use failure::Error as FailureError;

use errors::Error;
use models::authorization::*;
use models::{NewSupermarket, Supermarket, SupermarketId, SupermarketStats, UpdateSupermarket, UserId};
use repos::acl;
use repos::legacy_acl::CheckScope;
use repos::types::{RepoAcl, RepoResult};
use schema::supermarkets::dsl::*;

const STATS_QUERY: &str = "SELECT s.id AS supermarket_id, s.name AS supermarket_name, \
                           COUNT(p.id) AS product_count, AVG(p.price) AS avg_price, \
                           MIN(p.price) AS min_price, MAX(p.price) AS max_price \
                           FROM supermarkets s LEFT JOIN products p ON p.supermarket_id = s.id \
                           GROUP BY s.id, s.name ORDER BY s.id";

/// Stats row as returned by postgres, aggregates are null for supermarkets without products
#[derive(QueryableByName, Debug)]
struct RawSupermarketStats {
    #[sql_type = "Integer"]
    supermarket_id: SupermarketId,
    #[sql_type = "VarChar"]
    supermarket_name: String,
    #[sql_type = "BigInt"]
    product_count: i64,
    #[sql_type = "Nullable<Double>"]
    avg_price: Option<f64>,
    #[sql_type = "Nullable<Double>"]
    min_price: Option<f64>,
    #[sql_type = "Nullable<Double>"]
    max_price: Option<f64>,
}

impl From<RawSupermarketStats> for SupermarketStats {
    fn from(raw: RawSupermarketStats) -> Self {
        Self {
            supermarket_id: raw.supermarket_id,
            supermarket_name: raw.supermarket_name,
            product_count: raw.product_count,
            avg_price: raw.avg_price.unwrap_or(0.0),
            min_price: raw.min_price.unwrap_or(0.0),
            max_price: raw.max_price.unwrap_or(0.0),
        }
    }
}

/// Supermarkets repository, responsible for handling supermarkets
pub struct SupermarketsRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<Supermarket>>,
}

pub trait SupermarketsRepo {
    /// Find specific supermarket by ID
    fn find(&self, supermarket_id: SupermarketId) -> RepoResult<Option<Supermarket>>;

    /// Returns list of supermarkets, limited by `from` and `count` parameters
    fn list(&self, from: SupermarketId, count: i64) -> RepoResult<Vec<Supermarket>>;

    /// Returns every supermarket ordered by id
    fn list_all(&self) -> RepoResult<Vec<Supermarket>>;

    /// Creates new supermarket
    fn create(&self, payload: NewSupermarket) -> RepoResult<Supermarket>;

    /// Updates specific supermarket
    fn update(&self, supermarket_id: SupermarketId, payload: UpdateSupermarket) -> RepoResult<Supermarket>;

    /// Deletes specific supermarket
    fn delete(&self, supermarket_id: SupermarketId) -> RepoResult<Supermarket>;

    /// Product count and price aggregates per supermarket
    fn stats(&self) -> RepoResult<Vec<SupermarketStats>>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> SupermarketsRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<Supermarket>>) -> Self {
        Self { db_conn, acl }
    }

    fn find_existing(&self, supermarket_id: SupermarketId) -> RepoResult<Supermarket> {
        supermarkets
            .find(supermarket_id)
            .get_result::<Supermarket>(self.db_conn)
            .optional()
            .map_err(FailureError::from)?
            .ok_or_else(|| {
                format_err!("Supermarket with id {} not found", supermarket_id)
                    .context(Error::NotFound("Supermarket not found".to_string()))
                    .into()
            })
    }

    fn check_all(&self, values: &[Supermarket]) -> RepoResult<()> {
        for value in values {
            acl::check(&*self.acl, Resource::Supermarkets, Action::Read, self, Some(value))?;
        }
        Ok(())
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> SupermarketsRepo
    for SupermarketsRepoImpl<'a, T>
{
    fn find(&self, supermarket_id_arg: SupermarketId) -> RepoResult<Option<Supermarket>> {
        debug!("Find in supermarkets with id {}.", supermarket_id_arg);
        supermarkets
            .find(supermarket_id_arg)
            .get_result::<Supermarket>(self.db_conn)
            .optional()
            .map_err(From::from)
            .and_then(|value: Option<Supermarket>| {
                if let Some(ref value) = value {
                    acl::check(&*self.acl, Resource::Supermarkets, Action::Read, self, Some(value))?;
                }
                Ok(value)
            }).map_err(|e: FailureError| {
                e.context(format!("Find supermarket by id: {} error occurred", supermarket_id_arg))
                    .into()
            })
    }

    fn list(&self, from: SupermarketId, count: i64) -> RepoResult<Vec<Supermarket>> {
        debug!("Find in supermarkets from {} count {}.", from, count);
        supermarkets
            .filter(id.gt(from))
            .order(id)
            .limit(count)
            .load::<Supermarket>(self.db_conn)
            .map_err(From::from)
            .and_then(|values: Vec<Supermarket>| {
                self.check_all(&values)?;
                Ok(values)
            }).map_err(|e: FailureError| {
                e.context(format!("Find in supermarkets from {} count {} error occurred", from, count))
                    .into()
            })
    }

    fn list_all(&self) -> RepoResult<Vec<Supermarket>> {
        debug!("Find all supermarkets.");
        supermarkets
            .order(id)
            .load::<Supermarket>(self.db_conn)
            .map_err(From::from)
            .and_then(|values: Vec<Supermarket>| {
                self.check_all(&values)?;
                Ok(values)
            }).map_err(|e: FailureError| e.context("List all supermarkets error occurred").into())
    }

    fn create(&self, payload: NewSupermarket) -> RepoResult<Supermarket> {
        debug!("Create supermarket {:?}.", payload);
        acl::check(&*self.acl, Resource::Supermarkets, Action::Create, self, None)
            .and_then(|_| {
                diesel::insert_into(supermarkets)
                    .values(&payload)
                    .get_result::<Supermarket>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Create supermarket {:?} error occurred", payload)).into())
    }

    fn update(&self, supermarket_id_arg: SupermarketId, payload: UpdateSupermarket) -> RepoResult<Supermarket> {
        debug!("Updating supermarket with id {} and payload {:?}.", supermarket_id_arg, payload);
        self.find_existing(supermarket_id_arg)
            .and_then(|supermarket| acl::check(&*self.acl, Resource::Supermarkets, Action::Update, self, Some(&supermarket)))
            .and_then(|_| {
                diesel::update(supermarkets.find(supermarket_id_arg))
                    .set(&payload)
                    .get_result::<Supermarket>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Updating supermarket with id {} error occurred", supermarket_id_arg))
                    .into()
            })
    }

    fn delete(&self, supermarket_id_arg: SupermarketId) -> RepoResult<Supermarket> {
        debug!("Delete supermarket with id {}.", supermarket_id_arg);
        self.find_existing(supermarket_id_arg)
            .and_then(|supermarket| acl::check(&*self.acl, Resource::Supermarkets, Action::Delete, self, Some(&supermarket)))
            .and_then(|_| {
                diesel::delete(supermarkets.find(supermarket_id_arg))
                    .get_result::<Supermarket>(self.db_conn)
                    .map_err(|e| match e {
                        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                            format_err!("Supermarket {} is referenced by products", supermarket_id_arg)
                                .context(Error::Conflict("Supermarket still has products".to_string()))
                                .into()
                        }
                        e => FailureError::from(e),
                    })
            }).map_err(|e: FailureError| {
                e.context(format!("Delete supermarket with id {} error occurred", supermarket_id_arg))
                    .into()
            })
    }

    fn stats(&self) -> RepoResult<Vec<SupermarketStats>> {
        debug!("Collect supermarkets stats.");
        acl::check(&*self.acl, Resource::Supermarkets, Action::Read, self, None)
            .and_then(|_| {
                diesel::sql_query(STATS_QUERY)
                    .load::<RawSupermarketStats>(self.db_conn)
                    .map_err(From::from)
            }).map(|rows| rows.into_iter().map(SupermarketStats::from).collect())
            .map_err(|e: FailureError| e.context("Collect supermarkets stats error occurred").into())
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, Supermarket>
    for SupermarketsRepoImpl<'a, T>
{
    fn is_in_scope(&self, user_id: UserId, scope: &Scope, obj: Option<&Supermarket>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => obj
                .and_then(|supermarket| supermarket.owner_id)
                .map(|owner| owner == user_id)
                .unwrap_or(false),
        }
    }
}
