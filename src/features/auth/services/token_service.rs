use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::persons::models::PersonRole;

/// Claim set carried by access tokens: subject id, email and role.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    email: String,
    role: PersonRole,
    iat: u64,
    exp: u64,
}

/// Issues and verifies HS256 access tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            expiry: config.token_expiry,
        }
    }

    pub fn issue(&self, person_id: i64, email: &str, role: PersonRole) -> Result<String> {
        let now = unix_now();
        let claims = Claims {
            sub: person_id,
            email: email.to_string(),
            role,
            iat: now,
            exp: now + self.expiry.as_secs(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(AuthenticatedUser {
            id: data.claims.sub,
            email: data.claims.email,
            role: data.claims.role,
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: secret.to_string(),
            token_expiry: Duration::from_secs(3600),
        })
    }

    #[test]
    fn issue_then_verify_roundtrip() {
        let tokens = service("a-very-long-test-secret-of-32-plus-chars");
        let token = tokens
            .issue(42, "moderator@example.com", PersonRole::Moderator)
            .unwrap();

        let user = tokens.verify(&token).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.email, "moderator@example.com");
        assert_eq!(user.role, PersonRole::Moderator);
    }

    #[test]
    fn verify_rejects_token_signed_with_other_secret() {
        let issuer = service("a-very-long-test-secret-of-32-plus-chars");
        let verifier = service("a-completely-different-secret-string!!");

        let token = issuer.issue(1, "user@example.com", PersonRole::User).unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn verify_rejects_expired_token() {
        let tokens = service("a-very-long-test-secret-of-32-plus-chars");

        // Sign an already-expired claim set with the service key.
        let past = unix_now() - 7200;
        let claims = Claims {
            sub: 1,
            email: "user@example.com".to_string(),
            role: PersonRole::User,
            iat: past,
            exp: past + 60,
        };
        let token = encode(&Header::default(), &claims, &tokens.encoding_key).unwrap();

        assert!(matches!(
            tokens.verify(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn verify_rejects_garbage() {
        let tokens = service("a-very-long-test-secret-of-32-plus-chars");
        assert!(tokens.verify("not.a.jwt").is_err());
        assert!(tokens.verify("").is_err());
    }
}
