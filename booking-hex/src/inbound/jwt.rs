//! JWT issuing and verification for user and admin tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const TOKEN_TTL_HOURS: i64 = 24;

/// Token claims. User tokens carry `id`, admin tokens carry `email`.
///
/// Every claim is optional so that tokens minted by other services in the
/// same deployment (which may omit `exp`) still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Creates and verifies HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues a token for a user, valid for 24 hours.
    pub fn issue_user_token(&self, user_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(Claims {
            id: Some(user_id.to_string()),
            ..Claims::default()
        })
    }

    /// Issues an admin token carrying `email`, valid for 24 hours.
    pub fn issue_admin_token(&self, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(Claims {
            email: Some(email.to_string()),
            ..Claims::default()
        })
    }

    fn issue(&self, mut claims: Claims) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        claims.iat = Some(now.timestamp());
        claims.exp = Some((now + Duration::hours(TOKEN_TTL_HOURS)).timestamp());
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Verifies the signature and, when present, the expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &self.decoding_key, &validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_token_round_trip() {
        let jwt = JwtService::new("test_secret");

        let token = jwt.issue_user_token("user_1").unwrap();
        let claims = jwt.verify(&token).unwrap();

        assert_eq!(claims.id.as_deref(), Some("user_1"));
        assert!(claims.email.is_none());
        let expires_in = claims.exp.unwrap() - Utc::now().timestamp();
        assert!(expires_in > 23 * 3600);
        assert!(expires_in <= 24 * 3600);
    }

    #[test]
    fn test_admin_token_carries_email() {
        let jwt = JwtService::new("test_secret");

        let token = jwt.issue_admin_token("admin@example.com").unwrap();
        let claims = jwt.verify(&token).unwrap();

        assert_eq!(claims.email.as_deref(), Some("admin@example.com"));
        assert!(claims.id.is_none());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = JwtService::new("secret1").issue_user_token("user_1").unwrap();

        assert!(JwtService::new("secret2").verify(&token).is_err());
    }

    #[test]
    fn test_token_without_expiry_is_accepted() {
        let jwt = JwtService::new("test_secret");
        let claims = Claims {
            id: Some("user_1".into()),
            ..Claims::default()
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test_secret"))
            .unwrap();

        assert_eq!(jwt.verify(&token).unwrap().id.as_deref(), Some("user_1"));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = JwtService::new("test_secret");
        let claims = Claims {
            id: Some("user_1".into()),
            exp: Some(Utc::now().timestamp() - 3600),
            ..Claims::default()
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test_secret"))
            .unwrap();

        assert!(jwt.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(JwtService::new("test_secret").verify("not.a.jwt").is_err());
    }
}
