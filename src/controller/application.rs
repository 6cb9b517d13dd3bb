//! Hyper service of the app, turns controller answers and errors into http responses
use failure::Error as FailureError;
use futures::Future;
use hyper;
use hyper::header::{ContentLength, ContentType};
use hyper::server::{Request, Response, Service};
use hyper::StatusCode;
use serde_json;

use controller::types::{ControllerFuture, JsonResponse};
use errors::find_kind;

pub trait Controller {
    fn call(&self, request: Request) -> ControllerFuture;
}

pub struct Application<C: Controller> {
    controller: C,
}

impl<C: Controller> Application<C> {
    pub fn new(controller: C) -> Self {
        Self { controller }
    }
}

impl<C: Controller> Service for Application<C> {
    type Request = Request;
    type Response = Response;
    type Error = hyper::Error;
    type Future = Box<Future<Item = Response, Error = hyper::Error>>;

    fn call(&self, req: Request) -> Self::Future {
        let method = req.method().clone();
        let path = req.path().to_string();
        debug!("Received request {} {}", method, path);

        Box::new(self.controller.call(req).then(move |result| {
            let answer = match result {
                Ok(answer) => answer,
                Err(err) => error_answer(&err),
            };
            info!("{} {} {}", method, path, answer.status);
            Ok::<_, hyper::Error>(json_response(answer))
        }))
    }
}

/// Json body and status for the first error kind found in the chain.
/// Errors without kind are logged and answered with 500.
pub fn error_answer(err: &FailureError) -> JsonResponse {
    let (status, body) = match find_kind(err) {
        Some(kind) => {
            let status = kind.code();
            if status == StatusCode::InternalServerError {
                error!("{}", format_chain(err));
            } else {
                debug!("{}", format_chain(err));
            }
            let mut body = json!({ "error": kind.message() });
            if let Some(details) = kind.payload() {
                body["details"] = details;
            }
            (status, body)
        }
        None => {
            error!("{}", format_chain(err));
            (StatusCode::InternalServerError, json!({ "error": "Internal server error" }))
        }
    };

    JsonResponse {
        status,
        body: body.to_string(),
    }
}

fn format_chain(err: &FailureError) -> String {
    err.iter_chain().map(|cause| cause.to_string()).collect::<Vec<String>>().join(" | ")
}

fn json_response(answer: JsonResponse) -> Response {
    Response::new()
        .with_status(answer.status)
        .with_header(ContentType::json())
        .with_header(ContentLength(answer.body.len() as u64))
        .with_body(answer.body)
}

#[cfg(test)]
mod tests {
    use super::*;

    use failure::Fail;

    use errors::Error;

    #[test]
    fn test_error_answer_uses_kind() {
        let err: FailureError = format_err!("Product 7 is missing")
            .context(Error::NotFound("Product not found".to_string()))
            .context("Service products, get endpoint error occurred.")
            .into();
        let answer = error_answer(&err);
        assert_eq!(answer.status, StatusCode::NotFound);
        let body: serde_json::Value = serde_json::from_str(&answer.body).unwrap();
        assert_eq!(body["error"], "Product not found");
    }

    #[test]
    fn test_error_answer_hides_internals() {
        let err: FailureError = format_err!("connection refused to 10.0.0.5:5432");
        let answer = error_answer(&err);
        assert_eq!(answer.status, StatusCode::InternalServerError);
        assert_eq!(answer.body, r#"{"error":"Internal server error"}"#);

        let err: FailureError = format_err!("pool timed out").context(Error::Connection).into();
        assert_eq!(error_answer(&err).body, r#"{"error":"Internal server error"}"#);
    }
}
