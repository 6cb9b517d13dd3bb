//! Models contains all structures that are used in different
//! modules of the app

pub mod authorization;
pub mod basket;
pub mod compare;
pub mod identity;
pub mod product;
pub mod supermarket;
pub mod time;
pub mod types;
pub mod user;
pub mod validation_rules;

pub use self::authorization::*;
pub use self::basket::*;
pub use self::compare::*;
pub use self::identity::*;
pub use self::product::*;
pub use self::supermarket::*;
pub use self::time::*;
pub use self::types::*;
pub use self::user::*;
pub use self::validation_rules::*;
