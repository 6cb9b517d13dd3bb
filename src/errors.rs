use failure::{Context, Error as FailureError};
use hyper::StatusCode;
use serde_json;
use validator::ValidationErrors;

/// Error kinds attached as context to `failure::Error` on every layer.
/// The first kind found in the chain decides the http status of the answer.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "{}", _0)]
    NotFound(String),
    #[fail(display = "Invalid request body")]
    Parse,
    #[fail(display = "{}", _0)]
    InvalidArgument(String),
    #[fail(display = "Validation error")]
    Validate(ValidationErrors),
    #[fail(display = "{}", _0)]
    Unauthenticated(String),
    #[fail(display = "{}", _0)]
    Forbidden(String),
    #[fail(display = "{}", _0)]
    Conflict(String),
    #[fail(display = "{}", _0)]
    Unavailable(String),
    #[fail(display = "R2D2 connection error")]
    Connection,
}

impl Error {
    pub fn code(&self) -> StatusCode {
        use self::Error::*;

        match *self {
            NotFound(_) => StatusCode::NotFound,
            Parse | InvalidArgument(_) | Validate(_) => StatusCode::BadRequest,
            Unauthenticated(_) => StatusCode::Unauthorized,
            Forbidden(_) => StatusCode::Forbidden,
            Conflict(_) => StatusCode::Conflict,
            Unavailable(_) | Connection => StatusCode::InternalServerError,
        }
    }

    /// Message shown to the client. Server side failures never expose their details.
    pub fn message(&self) -> String {
        match *self {
            Error::Connection => "Internal server error".to_string(),
            ref other => other.to_string(),
        }
    }

    /// Extra structured data for the answer body
    pub fn payload(&self) -> Option<serde_json::Value> {
        match *self {
            Error::Validate(ref e) => serde_json::to_value(e).ok(),
            _ => None,
        }
    }
}

/// Finds the first error kind in the chain of causes
pub fn find_kind(err: &FailureError) -> Option<&Error> {
    err.iter_chain()
        .filter_map(|cause| {
            cause
                .downcast_ref::<Context<Error>>()
                .map(|ctx| ctx.get_context())
                .or_else(|| cause.downcast_ref::<Error>())
        }).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(Error::NotFound("Product not found".to_string()).code(), StatusCode::NotFound);
        assert_eq!(Error::InvalidArgument("no items provided".to_string()).code(), StatusCode::BadRequest);
        assert_eq!(Error::Unauthenticated("Invalid email or password".to_string()).code(), StatusCode::Unauthorized);
        assert_eq!(Error::Forbidden("Admin access required".to_string()).code(), StatusCode::Forbidden);
        assert_eq!(Error::Conflict("exists".to_string()).code(), StatusCode::Conflict);
        assert_eq!(Error::Unavailable("no supermarkets available".to_string()).code(), StatusCode::InternalServerError);
    }

    #[test]
    fn test_find_kind_in_chain() {
        let err: FailureError = format_err!("Product 5 not found")
            .context(Error::NotFound("Product not found".to_string()))
            .into();
        let err: FailureError = err.context("Service products, get endpoint error occurred.").into();
        match find_kind(&err) {
            Some(&Error::NotFound(ref message)) => assert_eq!(message, "Product not found"),
            other => panic!("unexpected kind {:?}", other),
        }

        let plain: FailureError = format_err!("disk is on fire");
        assert!(find_kind(&plain).is_none());
    }

    #[test]
    fn test_connection_message_is_hidden() {
        assert_eq!(Error::Connection.message(), "Internal server error");
        assert_eq!(
            Error::NotFound("no offers found for barcode".to_string()).message(),
            "no offers found for barcode"
        );
    }
}
