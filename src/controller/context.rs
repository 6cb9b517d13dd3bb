use std::marker::PhantomData;
use std::sync::Arc;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use futures_cpupool::CpuPool;
use r2d2::{ManageConnection, Pool};

use config::Config;
use controller::router::RouteParser;
use controller::routes::Route;
use models::Identity;
use repos::repo_factory::*;
use services::jwt::TokenService;
use services::password::PasswordHasher;

/// Static context for all app
pub struct StaticContext<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    pub db_pool: Pool<M>,
    pub cpu_pool: CpuPool,
    pub config: Arc<Config>,
    pub route_parser: Arc<RouteParser<Route>>,
    pub repo_factory: F,
    pub token_service: Arc<TokenService>,
    pub password_hasher: Arc<PasswordHasher>,
    phantom: PhantomData<T>,
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > StaticContext<T, M, F>
{
    /// Create a new static context
    pub fn new(
        db_pool: Pool<M>,
        cpu_pool: CpuPool,
        config: Arc<Config>,
        route_parser: Arc<RouteParser<Route>>,
        repo_factory: F,
        token_service: Arc<TokenService>,
        password_hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            db_pool,
            cpu_pool,
            config,
            route_parser,
            repo_factory,
            token_service,
            password_hasher,
            phantom: PhantomData,
        }
    }
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > Clone for StaticContext<T, M, F>
{
    fn clone(&self) -> Self {
        Self {
            db_pool: self.db_pool.clone(),
            cpu_pool: self.cpu_pool.clone(),
            config: self.config.clone(),
            route_parser: self.route_parser.clone(),
            repo_factory: self.repo_factory.clone(),
            token_service: self.token_service.clone(),
            password_hasher: self.password_hasher.clone(),
            phantom: PhantomData,
        }
    }
}

/// Dynamic context for each request
#[derive(Clone, Debug, Default)]
pub struct DynamicContext {
    pub identity: Option<Identity>,
}

impl DynamicContext {
    /// Create a new dynamic context
    pub fn new(identity: Option<Identity>) -> Self {
        Self { identity }
    }
}
