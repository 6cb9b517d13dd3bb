//! System Services, presents health check of the app
use futures::future;

use services::types::ServiceFuture;

/// Answer of the health check
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Health {
    pub status: String,
    pub message: String,
}

pub trait SystemService {
    /// Healthcheck endpoint, always returns healthy status
    fn healthcheck(&self) -> ServiceFuture<Health>;
}

/// System service, responsible for common endpoints like healthcheck
#[derive(Clone, Default)]
pub struct SystemServiceImpl;

impl SystemService for SystemServiceImpl {
    fn healthcheck(&self) -> ServiceFuture<Health> {
        Box::new(future::ok(Health {
            status: "healthy".to_string(),
            message: "Supermarket Catalogue API is running".to_string(),
        }))
    }
}
