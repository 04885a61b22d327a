/// Session tokens
///
/// A session is an HS256-signed JWT whose subject is the numeric user id.
/// Nothing else about the caller is carried in the token: every request
/// re-derives its permissions from that id alone.
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use taskdeck_shared::auth::session::{create_session_token, validate_session_token, SessionClaims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-very-long-development-secret-value";
/// let token = create_session_token(&SessionClaims::new(42, Duration::hours(1)), secret)?;
///
/// let claims = validate_session_token(&token, secret)?;
/// assert_eq!(claims.sub, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer written into and required from every session token
pub const SESSION_ISSUER: &str = "taskdeck";

/// Default session lifetime
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to sign the token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Signature, issuer or format check failed
    #[error("Invalid session token: {0}")]
    Invalid(String),

    /// Token is past its `exp`
    #[error("Session has expired")]
    Expired,
}

/// JWT claims of a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: user id
    pub sub: i32,

    /// Issuer: always [`SESSION_ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Claims for `user_id` valid from now for `ttl`
    pub fn new(user_id: i32, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: SESSION_ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs the claims with HS256
pub fn create_session_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| SessionError::CreateError(e.to_string()))
}

/// Verifies signature, issuer, `nbf` and `exp`, and returns the claims
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    decode::<SessionClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => SessionError::Expired,
            _ => SessionError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = SessionClaims::new(7, Duration::hours(1));

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.iss, SESSION_ISSUER);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_create_and_validate_token() {
        let token = create_session_token(&SessionClaims::new(12, Duration::hours(24)), SECRET)
            .expect("Should create token");

        let validated = validate_session_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, 12);
        assert_eq!(validated.iss, SESSION_ISSUER);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let token = create_session_token(&SessionClaims::new(1, Duration::hours(1)), SECRET).unwrap();

        let result = validate_session_token(&token, "another-secret-key-of-sufficient-size");
        assert!(matches!(result, Err(SessionError::Invalid(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = SessionClaims::new(1, Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = create_session_token(&claims, SECRET).unwrap();
        let result = validate_session_token(&token, SECRET);

        assert!(matches!(result, Err(SessionError::Expired)));
    }

    #[test]
    fn test_validate_wrong_issuer() {
        let claims = SessionClaims {
            iss: "someone-else".to_string(),
            ..SessionClaims::new(1, Duration::hours(1))
        };
        let token = create_session_token(&claims, SECRET).unwrap();

        assert!(matches!(
            validate_session_token(&token, SECRET),
            Err(SessionError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_garbage() {
        assert!(validate_session_token("not.a.jwt", SECRET).is_err());
        assert!(validate_session_token("", SECRET).is_err());
    }
}
