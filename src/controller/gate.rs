//! Authorization gate, resolves request credentials into identity
use failure::Error as FailureError;
use hyper::Method;

use controller::routes::{is_admin_only, is_public, Route};
use errors::Error;
use models::Identity;
use services::jwt::TokenService;

/// Extracts token out of `Bearer <token>` header value
pub fn parse_bearer(header: Option<&str>) -> Result<&str, FailureError> {
    let header = header.ok_or_else(|| {
        FailureError::from(format_err!("Request without authorization header").context(Error::Unauthenticated(
            "Authorization header required".to_string(),
        )))
    })?;

    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if *scheme == "Bearer" && !token.is_empty() => Ok(*token),
        _ => Err(format_err!("Malformed authorization header")
            .context(Error::Unauthenticated("Invalid authorization format".to_string()))
            .into()),
    }
}

/// Verifies bearer token of the header
pub fn authenticate(token_service: &TokenService, header: Option<&str>) -> Result<Identity, FailureError> {
    parse_bearer(header).and_then(|token| token_service.verify(token))
}

pub fn require_admin(identity: &Identity) -> Result<(), FailureError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(format_err!("User {} with role {} asked for admin route", identity.user_id, identity.role)
            .context(Error::Forbidden("Admin access required".to_string()))
            .into())
    }
}

/// Identity of the request: none on public routes, verified token elsewhere
pub fn resolve_identity(
    token_service: &TokenService,
    method: &Method,
    route: &Route,
    header: Option<&str>,
) -> Result<Option<Identity>, FailureError> {
    if is_public(method, route) {
        return Ok(None);
    }

    let identity = authenticate(token_service, header)?;
    if is_admin_only(route) {
        require_admin(&identity)?;
    }
    Ok(Some(identity))
}

#[cfg(test)]
mod tests {
    use super::*;

    use errors;
    use models::{ProductId, UserId, UserRole};
    use services::jwt::JwtTokenService;

    fn token_service() -> JwtTokenService {
        JwtTokenService::new("gate-secret".to_string(), 3600)
    }

    fn unauthenticated_message(err: &FailureError) -> String {
        match errors::find_kind(err) {
            Some(&errors::Error::Unauthenticated(ref message)) => message.clone(),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer(Some("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(unauthenticated_message(&parse_bearer(None).unwrap_err()), "Authorization header required");
        for header in &["abc.def", "Basic abc", "Bearer", "Bearer a b", "bearer abc"] {
            assert_eq!(
                unauthenticated_message(&parse_bearer(Some(*header)).unwrap_err()),
                "Invalid authorization format"
            );
        }
    }

    #[test]
    fn test_public_route_ignores_credentials() {
        let service = token_service();
        let identity = resolve_identity(&service, &Method::Get, &Route::Products, Some("garbage")).unwrap();
        assert_eq!(identity, None);
    }

    #[test]
    fn test_private_route_requires_token() {
        let service = token_service();
        let err = resolve_identity(&service, &Method::Delete, &Route::Product(ProductId(1)), None).unwrap_err();
        assert_eq!(unauthenticated_message(&err), "Authorization header required");

        let err = resolve_identity(&service, &Method::Get, &Route::Me, Some("Bearer forged")).unwrap_err();
        assert_eq!(unauthenticated_message(&err), "Invalid or expired token");
    }

    #[test]
    fn test_admin_route() {
        let service = token_service();
        let user_token = service.issue(UserId(1), "user@example.com", UserRole::User).unwrap();
        let admin_token = service.issue(UserId(2), "admin@example.com", UserRole::Admin).unwrap();

        let user_header = format!("Bearer {}", user_token);
        let err = resolve_identity(&service, &Method::Post, &Route::AdminSupermarkets, Some(user_header.as_str())).unwrap_err();
        match errors::find_kind(&err) {
            Some(&errors::Error::Forbidden(ref message)) => assert_eq!(message, "Admin access required"),
            other => panic!("unexpected kind {:?}", other),
        }

        let admin_header = format!("Bearer {}", admin_token);
        let identity = resolve_identity(&service, &Method::Post, &Route::AdminSupermarkets, Some(admin_header.as_str())).unwrap();
        assert_eq!(identity, Some(Identity::new(UserId(2), UserRole::Admin)));
    }
}
