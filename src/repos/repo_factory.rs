use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;

use models::*;
use repos::legacy_acl::SystemACL;
use repos::*;

pub trait ReposFactory<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static>: Clone + Send + 'static {
    fn create_users_repo<'a>(&self, db_conn: &'a C, identity: Option<Identity>) -> Box<UsersRepo + 'a>;
    fn create_users_repo_with_sys_acl<'a>(&self, db_conn: &'a C) -> Box<UsersRepo + 'a>;
    fn create_supermarkets_repo<'a>(&self, db_conn: &'a C, identity: Option<Identity>) -> Box<SupermarketsRepo + 'a>;
    fn create_products_repo<'a>(&self, db_conn: &'a C, identity: Option<Identity>) -> Box<ProductsRepo + 'a>;
}

#[derive(Clone, Copy, Default)]
pub struct ReposFactoryImpl;

impl<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ReposFactory<C> for ReposFactoryImpl {
    fn create_users_repo<'a>(&self, db_conn: &'a C, identity: Option<Identity>) -> Box<UsersRepo + 'a> {
        Box::new(UsersRepoImpl::new(db_conn, acl_for(identity))) as Box<UsersRepo>
    }
    fn create_users_repo_with_sys_acl<'a>(&self, db_conn: &'a C) -> Box<UsersRepo + 'a> {
        Box::new(UsersRepoImpl::new(db_conn, Box::new(SystemACL::default()) as BoxedAcl<User>)) as Box<UsersRepo>
    }
    fn create_supermarkets_repo<'a>(&self, db_conn: &'a C, identity: Option<Identity>) -> Box<SupermarketsRepo + 'a> {
        Box::new(SupermarketsRepoImpl::new(db_conn, acl_for(identity))) as Box<SupermarketsRepo>
    }
    fn create_products_repo<'a>(&self, db_conn: &'a C, identity: Option<Identity>) -> Box<ProductsRepo + 'a> {
        Box::new(ProductsRepoImpl::new(db_conn, acl_for(identity))) as Box<ProductsRepo>
    }
}
