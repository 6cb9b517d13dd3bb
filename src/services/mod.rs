//! Services is a core layer for the app business logic like
//! validation, authorization, etc.

pub mod basket;
pub mod compare;
pub mod jwt;
pub mod password;
pub mod products;
pub mod supermarkets;
pub mod system;
pub mod types;
pub mod users;

pub use self::basket::*;
pub use self::compare::*;
pub use self::jwt::*;
pub use self::password::*;
pub use self::products::*;
pub use self::supermarkets::*;
pub use self::system::*;
pub use self::users::*;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::{Error as FailureError, Fail};
use r2d2::{ManageConnection, PooledConnection};

use controller::context::{DynamicContext, StaticContext};
use errors::Error;
use repos::ReposFactory;
use self::types::ServiceFuture;

/// Service
pub struct Service<
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
> {
    pub static_context: StaticContext<T, M, F>,
    pub dynamic_context: DynamicContext,
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > Service<T, M, F>
{
    /// Create a new service
    pub fn new(static_context: StaticContext<T, M, F>, dynamic_context: DynamicContext) -> Self {
        Self {
            static_context,
            dynamic_context,
        }
    }

    /// Runs `f` with a pooled db connection on the cpu pool
    pub fn spawn_on_pool<R, Func>(&self, f: Func) -> ServiceFuture<R>
    where
        Func: FnOnce(PooledConnection<M>) -> Result<R, FailureError> + Send + 'static,
        R: Send + 'static,
    {
        let db_pool = self.static_context.db_pool.clone();
        let cpu_pool = self.static_context.cpu_pool.clone();
        Box::new(cpu_pool.spawn_fn(move || db_pool.get().map_err(|e| e.context(Error::Connection).into()).and_then(f)))
    }
}
