//! Helpers for reading request bodies and query strings
use std::collections::HashMap;
use std::str::FromStr;

use failure::{Error as FailureError, Fail};
use futures::{future, Future, Stream};
use hyper::Body;
use serde::de::DeserializeOwned;
use serde_json;

use errors::Error;

/// Reads body of request into `String`
pub fn read_body(body: Body) -> Box<Future<Item = String, Error = FailureError>> {
    Box::new(
        body.fold(Vec::new(), |mut acc, chunk| {
            acc.extend_from_slice(&*chunk);
            future::ok::<_, ::hyper::Error>(acc)
        }).map_err(|e| FailureError::from(e.context(Error::Parse)))
        .and_then(|bytes| String::from_utf8(bytes).map_err(|e| FailureError::from(e.context(Error::Parse)))),
    )
}

/// Reads body of request and deserializes it from json
pub fn parse_body<T>(body: Body) -> Box<Future<Item = T, Error = FailureError>>
where
    T: DeserializeOwned + 'static,
{
    Box::new(read_body(body).and_then(|body| {
        serde_json::from_str::<T>(&body)
            .map_err(|e| FailureError::from(e.context(format!("Failed to parse body: {}", body)).context(Error::Parse)))
    }))
}

/// Splits query string into params, the last value of a repeated param wins
pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next().unwrap_or_default().to_string();
            let value = parts.next().unwrap_or_default().to_string();
            (key, value)
        }).collect()
}

/// Typed value of query param, empty values count as absent
pub fn query_param<T: FromStr>(params: &HashMap<String, String>, name: &str) -> Result<Option<T>, FailureError> {
    match params.get(name) {
        Some(value) if !value.is_empty() => value.parse::<T>().map(Some).map_err(|_| {
            format_err!("Query param {} has invalid value {}", name, value)
                .context(Error::InvalidArgument(format!("Invalid value of {}", name)))
                .into()
        }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use errors;

    #[test]
    fn test_parse_query() {
        let params = parse_query(Some("from=10&count=5&barcode=&flag"));
        assert_eq!(params.get("from").map(String::as_str), Some("10"));
        assert_eq!(query_param::<i64>(&params, "count").unwrap(), Some(5));
        assert_eq!(query_param::<String>(&params, "barcode").unwrap(), None);
        assert_eq!(query_param::<i32>(&params, "flag").unwrap(), None);
        assert_eq!(query_param::<i32>(&params, "missing").unwrap(), None);
        assert!(parse_query(None).is_empty());
    }

    #[test]
    fn test_invalid_query_param() {
        let params = parse_query(Some("from=ten"));
        let err = query_param::<i32>(&params, "from").unwrap_err();
        match errors::find_kind(&err) {
            Some(&errors::Error::InvalidArgument(ref message)) => assert_eq!(message, "Invalid value of from"),
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
