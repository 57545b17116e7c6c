use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;

/// Claims encoded within an issued token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: Uuid,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
    /// Issuance timestamp (seconds since epoch).
    pub iat: usize,
}

/// Issues and checks bearer tokens. Built once at startup from the
/// configured signing secret; the key is never rotated mid-process.
///
/// Extraction and validation are deliberately split: the gate uses
/// [`TokenService::extract_subject`] to find the candidate user first,
/// then [`TokenService::validate`] against the freshly loaded record, so
/// a token for a since-deleted user fails even though its own claims
/// still check out.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Signed token for `subject`, expiring after the configured TTL.
    pub fn issue(&self, subject: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expiry = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal("Token expiry out of range".into()))?;

        let claims = Claims {
            sub: subject,
            exp: expiry.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))
    }

    /// Parses the token and checks the signature without enforcing
    /// expiry. Returns `None` for anything malformed or forged; never
    /// errors on a normal request.
    pub fn extract_subject(&self, token: &str) -> Option<Uuid> {
        let mut validation = Validation::default();
        validation.validate_exp = false;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .ok()
            .map(|data| data.claims.sub)
    }

    /// Authoritative check: signature valid, unexpired, and the embedded
    /// subject matches `user`.
    pub fn validate(&self, token: &str, user: &User) -> bool {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims.sub == user.id)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new(
            "Ann".to_string(),
            "ann@example.com".to_string(),
            "$2b$12$hash".to_string(),
        )
    }

    #[test]
    fn test_issue_and_validate() {
        let service = TokenService::new("test-secret", 24);
        let user = test_user();

        let token = service.issue(user.id).unwrap();
        assert_eq!(service.extract_subject(&token), Some(user.id));
        assert!(service.validate(&token, &user));
    }

    #[test]
    fn test_token_does_not_validate_against_other_user() {
        let service = TokenService::new("test-secret", 24);
        let user = test_user();
        let other = test_user();

        let token = service.issue(user.id).unwrap();
        assert!(!service.validate(&token, &other));
    }

    #[test]
    fn test_malformed_and_forged_tokens_extract_nothing() {
        let service = TokenService::new("test-secret", 24);
        assert_eq!(service.extract_subject("not-a-token"), None);
        assert_eq!(service.extract_subject(""), None);

        let forger = TokenService::new("a-completely-different-secret", 24);
        let forged = forger.issue(Uuid::new_v4()).unwrap();
        assert_eq!(service.extract_subject(&forged), None);
    }

    #[test]
    fn test_expired_token_extracts_but_fails_validation() {
        let service = TokenService::new("test-secret", 24);
        let user = test_user();

        // Expired well past the default decode leeway.
        let past = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: user.id,
            exp: past.timestamp() as usize,
            iat: (past - Duration::hours(1)).timestamp() as usize,
        };
        let expired = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret".as_bytes()),
        )
        .unwrap();

        assert_eq!(service.extract_subject(&expired), Some(user.id));
        assert!(!service.validate(&expired, &user));
    }
}
