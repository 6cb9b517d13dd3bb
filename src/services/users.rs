//! Users Services, presents registration, login and profile operations
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;
use validator::Validate;

use errors::Error;
use models::{AuthResponse, Credentials, InsertUser, NewUser, User, UserRole};
use repos::ReposFactory;
use services::types::ServiceFuture;
use services::Service;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub trait UsersService {
    /// Creates user with `user` role and issues token for it
    fn register(&self, payload: NewUser) -> ServiceFuture<AuthResponse>;
    /// Checks credentials and issues token
    fn login(&self, payload: Credentials) -> ServiceFuture<AuthResponse>;
    /// Returns user of the current identity
    fn me(&self) -> ServiceFuture<User>;
    /// Lists users
    fn list_users(&self) -> ServiceFuture<Vec<User>>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > UsersService for Service<T, M, F>
{
    fn register(&self, payload: NewUser) -> ServiceFuture<AuthResponse> {
        let repo_factory = self.static_context.repo_factory.clone();
        let token_service = self.static_context.token_service.clone();
        let password_hasher = self.static_context.password_hasher.clone();

        self.spawn_on_pool(move |conn| {
            let email = normalize_email(&payload.email);
            let payload = NewUser {
                email: email.clone(),
                ..payload
            };
            payload.validate().map_err(|e| FailureError::from(Error::Validate(e)))?;

            let users_repo = repo_factory.create_users_repo_with_sys_acl(&*conn);
            conn.transaction::<AuthResponse, FailureError, _>(move || {
                if users_repo.email_exists(&email)? {
                    return Err(format_err!("Email {} is taken", email)
                        .context(Error::Conflict("User with this email already exists".to_string()))
                        .into());
                }

                let password_hash = password_hasher.hash(&payload.password)?;
                let user = users_repo.create(InsertUser {
                    name: payload.name.trim().to_string(),
                    email,
                    password_hash,
                    role: UserRole::User,
                })?;
                let token = token_service.issue(user.id, &user.email, user.role)?;
                info!("User {} registered.", user.id);
                Ok(AuthResponse { user, token })
            }).map_err(|e: FailureError| e.context("Service users, register endpoint error occurred.").into())
        })
    }

    fn login(&self, payload: Credentials) -> ServiceFuture<AuthResponse> {
        let repo_factory = self.static_context.repo_factory.clone();
        let token_service = self.static_context.token_service.clone();
        let password_hasher = self.static_context.password_hasher.clone();

        self.spawn_on_pool(move |conn| {
            let users_repo = repo_factory.create_users_repo_with_sys_acl(&*conn);
            let email = normalize_email(&payload.email);

            let raw = users_repo.find_by_email(&email)?;
            let dummy_digest = password_hasher.dummy_digest();
            let digest = raw.as_ref().map(|raw| raw.password_hash.as_str()).unwrap_or(dummy_digest);
            let verified = password_hasher.verify(&payload.password, digest)?;

            let raw = match raw {
                Some(raw) => raw,
                None => {
                    return Err(format_err!("Login with unknown email {}", email)
                        .context(Error::Unauthenticated(INVALID_CREDENTIALS.to_string()))
                        .into())
                }
            };
            if !verified {
                return Err(format_err!("Login with wrong password for user {}", raw.id)
                    .context(Error::Unauthenticated(INVALID_CREDENTIALS.to_string()))
                    .into());
            }

            let user = User::from(raw);
            token_service
                .issue(user.id, &user.email, user.role)
                .map(|token| AuthResponse { user, token })
                .map_err(|e| e.context("Service users, login endpoint error occurred.").into())
        })
    }

    fn me(&self) -> ServiceFuture<User> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let identity = identity.ok_or_else(|| {
                FailureError::from(format_err!("Profile requested without identity").context(Error::Unauthenticated(
                    "Authorization header required".to_string(),
                )))
            })?;

            let users_repo = repo_factory.create_users_repo(&*conn, Some(identity));
            users_repo
                .find(identity.user_id)
                .and_then(|user| {
                    user.ok_or_else(|| {
                        format_err!("User {} of a valid token is gone", identity.user_id)
                            .context(Error::NotFound("User not found".to_string()))
                            .into()
                    })
                }).map_err(|e: FailureError| e.context("Service users, me endpoint error occurred.").into())
        })
    }

    fn list_users(&self) -> ServiceFuture<Vec<User>> {
        let identity = self.dynamic_context.identity;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let users_repo = repo_factory.create_users_repo(&*conn, identity);
            users_repo
                .list()
                .map_err(|e| e.context("Service users, list_users endpoint error occurred.").into())
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
