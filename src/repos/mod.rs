//! Repos is a module responsible for interacting with postgres db

#[macro_use]
pub mod acl;
pub mod products;
pub mod repo_factory;
pub mod supermarkets;
pub mod types;
pub mod users;

pub use self::acl::*;
pub use self::products::*;
pub use self::repo_factory::*;
pub use self::supermarkets::*;
pub use self::types::*;
pub use self::users::*;
