//! Strongly typed ids stored as INTEGER columns
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Integer;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, FromSqlRow, AsExpression)]
        #[sql_type = "Integer"]
        pub struct $name(pub i32);

        impl ToSql<Integer, Pg> for $name {
            fn to_sql<W: Write>(&self, out: &mut Output<W, Pg>) -> serialize::Result {
                ToSql::<Integer, Pg>::to_sql(&self.0, out)
            }
        }

        impl FromSql<Integer, Pg> for $name {
            fn from_sql(bytes: Option<&[u8]>) -> deserialize::Result<Self> {
                <i32 as FromSql<Integer, Pg>>::from_sql(bytes).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ::std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<i32>().map($name)
            }
        }
    };
}

id_type!(UserId);
id_type!(SupermarketId);
id_type!(ProductId);
id_type!(CategoryId);
