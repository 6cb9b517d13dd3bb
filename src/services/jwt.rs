//! Token service issues and verifies signed identity tokens
use chrono::Utc;
use failure::Error as FailureError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use config::Auth;
use errors::Error;
use models::{Identity, UserId, UserRole};

/// Claims carried by the token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JwtClaims {
    pub user_id: UserId,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

pub trait TokenService: Send + Sync {
    /// Issues token for the user
    fn issue(&self, user_id: UserId, email: &str, role: UserRole) -> Result<String, FailureError>;

    /// Resolves token into identity, fails with `Unauthenticated` on bad signature or expired token
    fn verify(&self, token: &str) -> Result<Identity, FailureError>;
}

/// HS256 tokens signed with the configured secret
#[derive(Clone)]
pub struct JwtTokenService {
    secret: String,
    ttl_sec: i64,
}

impl JwtTokenService {
    pub fn new(secret: String, ttl_sec: i64) -> Self {
        Self { secret, ttl_sec }
    }

    pub fn from_config(auth: &Auth) -> Self {
        Self::new(auth.jwt_secret.clone(), auth.token_ttl_sec)
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: UserId, email: &str, role: UserRole) -> Result<String, FailureError> {
        let now = Utc::now().timestamp();
        let claims = JwtClaims {
            user_id,
            email: email.to_string(),
            role,
            iat: now,
            exp: now + self.ttl_sec,
        };

        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes())).map_err(|e| format_err!("Failed to sign token for user {}: {}", user_id, e))
    }

    fn verify(&self, token: &str) -> Result<Identity, FailureError> {
        decode::<JwtClaims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &Validation::default())
            .map(|data| Identity::new(data.claims.user_id, data.claims.role))
            .map_err(|e| {
                format_err!("Token verification failed: {}", e)
                    .context(Error::Unauthenticated("Invalid or expired token".to_string()))
                    .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errors;

    #[test]
    fn test_issue_and_verify() {
        let service = JwtTokenService::new("secret".to_string(), 3600);
        let token = service.issue(UserId(5), "jane@example.com", UserRole::Admin).unwrap();
        let identity = service.verify(&token).unwrap();
        assert_eq!(identity, Identity::new(UserId(5), UserRole::Admin));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = JwtTokenService::new("secret".to_string(), -3600);
        let token = service.issue(UserId(5), "jane@example.com", UserRole::User).unwrap();
        let err = service.verify(&token).unwrap_err();
        match errors::find_kind(&err) {
            Some(&Error::Unauthenticated(ref message)) => assert_eq!(message, "Invalid or expired token"),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let issuer = JwtTokenService::new("secret".to_string(), 3600);
        let verifier = JwtTokenService::new("other".to_string(), 3600);
        let token = issuer.issue(UserId(5), "jane@example.com", UserRole::User).unwrap();
        assert!(verifier.verify(&token).is_err());
        assert!(verifier.verify("not-a-token").is_err());
    }
}
