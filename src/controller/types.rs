use failure::Error as FailureError;
use futures::future::Future;
use hyper::StatusCode;

/// Serialized answer of the controller
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status: StatusCode,
    pub body: String,
}

pub type ControllerFuture = Box<Future<Item = JsonResponse, Error = FailureError>>;
