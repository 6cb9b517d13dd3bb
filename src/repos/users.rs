//! Users repo, presents operations with db for users
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::dsl::exists;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::Connection;
use failure::Error as FailureError;

use errors::Error;
use models::authorization::*;
use models::{InsertUser, RawUser, User, UserId};
use repos::acl;
use repos::legacy_acl::CheckScope;
use repos::types::{RepoAcl, RepoResult};
use schema::users::dsl::*;

/// Users repository, responsible for handling users
pub struct UsersRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<User>>,
}

pub trait UsersRepo {
    /// Find specific user by ID
    fn find(&self, user_id: UserId) -> RepoResult<Option<User>>;

    /// Find user with password hash by email
    fn find_by_email(&self, email_arg: &str) -> RepoResult<Option<RawUser>>;

    /// Checks that email is already taken
    fn email_exists(&self, email_arg: &str) -> RepoResult<bool>;

    /// Creates new user
    fn create(&self, payload: InsertUser) -> RepoResult<User>;

    /// Returns all users ordered by id
    fn list(&self) -> RepoResult<Vec<User>>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> UsersRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<User>>) -> Self {
        Self { db_conn, acl }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> UsersRepo for UsersRepoImpl<'a, T> {
    fn find(&self, user_id_arg: UserId) -> RepoResult<Option<User>> {
        debug!("Find in users with id {}.", user_id_arg);
        users
            .find(user_id_arg)
            .get_result::<RawUser>(self.db_conn)
            .optional()
            .map_err(From::from)
            .and_then(|raw: Option<RawUser>| {
                let user = raw.map(User::from);
                if let Some(ref user) = user {
                    acl::check(&*self.acl, Resource::Users, Action::Read, self, Some(user))?;
                }
                Ok(user)
            }).map_err(|e: FailureError| e.context(format!("Find user by id: {} error occurred", user_id_arg)).into())
    }

    fn find_by_email(&self, email_arg: &str) -> RepoResult<Option<RawUser>> {
        debug!("Find in users with email {}.", email_arg);
        users
            .filter(email.eq(email_arg))
            .get_result::<RawUser>(self.db_conn)
            .optional()
            .map_err(From::from)
            .and_then(|raw: Option<RawUser>| {
                if let Some(ref raw) = raw {
                    acl::check(&*self.acl, Resource::Users, Action::Read, self, Some(&User::from(raw.clone())))?;
                }
                Ok(raw)
            }).map_err(|e: FailureError| e.context("Find user by email error occurred").into())
    }

    fn email_exists(&self, email_arg: &str) -> RepoResult<bool> {
        debug!("Check if email {} exists.", email_arg);
        diesel::select(exists(users.filter(email.eq(email_arg))))
            .get_result::<bool>(self.db_conn)
            .map_err(|e| FailureError::from(e).context("Check email exists error occurred").into())
    }

    fn create(&self, payload: InsertUser) -> RepoResult<User> {
        debug!("Create user with email {}.", payload.email);
        acl::check(&*self.acl, Resource::Users, Action::Create, self, None)?;

        diesel::insert_into(users)
            .values(&payload)
            .get_result::<RawUser>(self.db_conn)
            .map(User::from)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => format_err!("Email {} is taken", payload.email)
                    .context(Error::Conflict("User with this email already exists".to_string()))
                    .into(),
                e => FailureError::from(e).context("Create user error occurred").into(),
            })
    }

    fn list(&self) -> RepoResult<Vec<User>> {
        debug!("Find all users.");
        users
            .order(id)
            .load::<RawUser>(self.db_conn)
            .map_err(From::from)
            .and_then(|raws: Vec<RawUser>| {
                let values: Vec<User> = raws.into_iter().map(User::from).collect();
                for value in &values {
                    acl::check(&*self.acl, Resource::Users, Action::Read, self, Some(value))?;
                }
                Ok(values)
            }).map_err(|e: FailureError| e.context("List all users error occurred").into())
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, User>
    for UsersRepoImpl<'a, T>
{
    fn is_in_scope(&self, user_id_arg: UserId, scope: &Scope, obj: Option<&User>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => obj.map(|user| user.id == user_id_arg).unwrap_or(false),
        }
    }
}
