//! Module containing user model for query, insert and the auth payloads
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::time::SystemTime;

use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::VarChar;
use failure::Error as FailureError;
use validator::Validate;

use models::time::serialize_utc_instant;
use models::types::UserId;
use models::validation_rules::*;
use schema::users;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, FromSqlRow, AsExpression)]
#[sql_type = "VarChar"]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match *self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = FailureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            other => Err(format_err!("Unrecognized user role: {}", other)),
        }
    }
}

impl ToSql<VarChar, Pg> for UserRole {
    fn to_sql<W: Write>(&self, out: &mut Output<W, Pg>) -> serialize::Result {
        <str as ToSql<VarChar, Pg>>::to_sql(self.as_str(), out)
    }
}

impl FromSql<VarChar, Pg> for UserRole {
    fn from_sql(bytes: Option<&[u8]>) -> deserialize::Result<Self> {
        let value = <String as FromSql<VarChar, Pg>>::from_sql(bytes)?;
        value
            .parse::<UserRole>()
            .map_err(|e| e.to_string().into())
    }
}

/// Row of `users` table, contains password hash and never leaves the service
#[derive(Debug, Queryable, Clone)]
pub struct RawUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: SystemTime,
}

/// User as seen by clients
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(serialize_with = "serialize_utc_instant")]
    pub created_at: SystemTime,
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            email: raw.email,
            role: raw.role,
            created_at: raw.created_at,
        }
    }
}

/// Payload for registering users
#[derive(Deserialize, Validate, Clone)]
pub struct NewUser {
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = "6", message = "Password should be at least 6 characters"))]
    pub password: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish()
    }
}

/// Row inserted on registration
#[derive(Debug, Insertable, Clone)]
#[table_name = "users"]
pub struct InsertUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Payload for login
#[derive(Deserialize, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Answer for successful registration or login
#[derive(Debug, Serialize, Clone)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("user".parse::<UserRole>().unwrap(), UserRole::User);
        assert!("staff".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_user_has_no_password_hash() {
        let raw = RawUser {
            id: UserId(7),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: "secret-hash".to_string(),
            role: UserRole::User,
            created_at: SystemTime::now(),
        };
        let value = serde_json::to_value(User::from(raw)).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["role"], "user");
    }

    #[test]
    fn test_new_user_validation() {
        let payload = NewUser {
            name: "".to_string(),
            email: "not-an-email".to_string(),
            password: "123".to_string(),
        };
        assert!(payload.validate().is_err());

        let payload = NewUser {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password: "123456".to_string(),
        };
        assert!(payload.validate().is_ok());
    }
}
