//! Catalogue is a microservice responsible for supermarkets, their products
//! and comparison of product prices across supermarkets.
//! The layered structure of the app is
//!
//! `Application -> Controller -> Service -> Repo`
//!
//! Each layer can throw Error with context or cover occurred error with
//! Error in the context. When error is not covered with Error it will
//! be translated to code 500 in the http answer "Internal server error" of microservice.

#![allow(proc_macro_derive_resolution_fallback)]
#![recursion_limit = "128"]
extern crate argon2;
extern crate chrono;
extern crate config as config_crate;
#[macro_use]
extern crate diesel;
#[macro_use]
extern crate failure;
extern crate futures;
extern crate futures_cpupool;
extern crate hyper;
extern crate jsonwebtoken;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate r2d2;
extern crate rand;
extern crate regex;
extern crate serde;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;
extern crate tokio_core;
extern crate tokio_signal;
extern crate urlencoding;
extern crate validator;
#[macro_use]
extern crate validator_derive;
extern crate sentry;

pub mod config;
pub mod controller;
pub mod errors;
pub mod models;
pub mod repos;
pub mod schema;
pub mod sentry_integration;
pub mod services;

use std::process;
use std::sync::Arc;

use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use futures::{future, Future, Stream};
use futures_cpupool::CpuPool;
use hyper::server::Http;
use tokio_core::reactor::Core;

use config::Config;
use controller::application::Application;
use controller::context::StaticContext;
use controller::routes::create_route_parser;
use repos::repo_factory::ReposFactoryImpl;
use services::jwt::JwtTokenService;
use services::password::Argon2Hasher;

/// Starts new web service from provided `Config`
pub fn start_server<F: FnOnce() + 'static>(config: Config, port: &Option<String>, callback: F) {
    // Prepare reactor
    let mut core = Core::new().expect("Unexpected error creating event loop core");
    let handle = Arc::new(core.handle());

    // Prepare database pool
    let db_manager = ConnectionManager::<PgConnection>::new(config.server.database.clone());
    let db_pool = r2d2::Pool::builder()
        .build(db_manager)
        .expect("Failed to create DB connection pool");

    let thread_count = config.server.thread_count;

    // Prepare CPU pool
    let cpu_pool = CpuPool::new(thread_count);

    // Prepare server
    let address = {
        let port = port.as_ref().unwrap_or(&config.server.port);
        format!("{}:{}", config.server.host, port).parse().expect("Could not parse address")
    };

    let token_service = Arc::new(JwtTokenService::from_config(&config.auth));
    let password_hasher = Arc::new(Argon2Hasher::default());
    let route_parser = Arc::new(create_route_parser());

    let context = StaticContext::new(
        db_pool,
        cpu_pool,
        Arc::new(config),
        route_parser,
        ReposFactoryImpl::default(),
        token_service,
        password_hasher,
    );

    let serve = Http::new()
        .serve_addr_handle(&address, &handle, move || {
            // Prepare application
            let controller = controller::ControllerImpl::new(context.clone());
            let app = Application::new(controller);

            Ok(app)
        }).unwrap_or_else(|why| {
            error!("Http Server Initialization Error: {}", why);
            process::exit(1);
        });

    let handle_arc2 = handle.clone();
    handle.spawn(
        serve
            .for_each(move |conn| {
                handle_arc2.spawn(conn.map(|_| ()).map_err(|why| error!("Server Error: {}", why)));
                Ok(())
            }).map_err(|_| ()),
    );

    info!("Listening on http://{}, threads: {}", address, thread_count);
    handle.spawn_fn(move || {
        callback();
        future::ok(())
    });

    core.run(tokio_signal::ctrl_c().flatten_stream().take(1u64).for_each(|()| {
        info!("Ctrl+C received. Exit");

        Ok(())
    })).unwrap_or_else(|why| error!("Event loop error: {}", why));
}
