use sentry;
use sentry::internals::ClientInitGuard;

#[derive(Debug, Deserialize, Clone)]
pub struct SentryConfig {
    pub dsn: String,
}

/// Starts crash reporting when a DSN is configured. The guard must outlive the server.
pub fn init(sentry_config: Option<&SentryConfig>) -> Option<ClientInitGuard> {
    sentry_config.map(|config_sentry| {
        info!("initialization support with sentry");
        let result = sentry::init(config_sentry.dsn.as_str());
        sentry::integrations::panic::register_panic_handler();
        result
    })
}
