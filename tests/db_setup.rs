extern crate catalogue_lib;
extern crate diesel;

use diesel::prelude::*;
use diesel::sql_query;

use catalogue_lib::config::Config;

pub type TestConnection = PgConnection;

pub fn connection() -> TestConnection {
    let config = Config::with_env("test").unwrap();
    let conn = PgConnection::establish(&config.server.database).unwrap();
    conn.begin_test_transaction().unwrap();
    conn
}

#[allow(dead_code)]
pub fn connection_with_catalogue_tables() -> TestConnection {
    let conn = connection();
    for table in &["products", "supermarkets", "users"] {
        sql_query(format!("DROP TABLE IF EXISTS {} CASCADE", table))
            .execute(&conn)
            .unwrap();
    }
    sql_query(
        "CREATE TABLE users ( \
         id SERIAL PRIMARY KEY, \
         name VARCHAR NOT NULL, \
         email VARCHAR UNIQUE NOT NULL, \
         password_hash VARCHAR NOT NULL, \
         role VARCHAR NOT NULL DEFAULT 'user', \
         created_at TIMESTAMP NOT NULL DEFAULT now()::timestamp \
         );",
    ).execute(&conn)
    .unwrap();
    sql_query(
        "CREATE TABLE supermarkets ( \
         id SERIAL PRIMARY KEY, \
         name VARCHAR NOT NULL, \
         address VARCHAR, \
         owner_id INTEGER REFERENCES users(id), \
         created_at TIMESTAMP NOT NULL DEFAULT now()::timestamp \
         );",
    ).execute(&conn)
    .unwrap();
    sql_query(
        "CREATE TABLE products ( \
         id SERIAL PRIMARY KEY, \
         name VARCHAR NOT NULL, \
         price DOUBLE PRECISION NOT NULL, \
         stock INTEGER NOT NULL DEFAULT 0, \
         image VARCHAR, \
         category_id INTEGER, \
         owner_id INTEGER NOT NULL, \
         supermarket_id INTEGER REFERENCES supermarkets(id), \
         barcode VARCHAR, \
         unit VARCHAR, \
         unit_price DOUBLE PRECISION, \
         last_updated TIMESTAMP NOT NULL DEFAULT now()::timestamp, \
         created_at TIMESTAMP NOT NULL DEFAULT now()::timestamp \
         );",
    ).execute(&conn)
    .unwrap();
    conn
}
