//! Catalogue is a microservice responsible for supermarkets, products and price comparison.
//! This crate is for running the service from `catalogue_lib`. See `catalogue_lib` for details.

extern crate catalogue_lib;
extern crate tracing_subscriber;

use tracing_subscriber::EnvFilter;

fn main() {
    let config = catalogue_lib::config::Config::new().expect("Can't load app config!");

    // Prepare logger
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    // Prepare sentry integration
    let _sentry = catalogue_lib::sentry_integration::init(config.sentry.as_ref());

    catalogue_lib::start_server(config, &None, || ());
}
