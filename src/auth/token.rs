use crate::{config::JwtSettings, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Distinguishes short-lived access tokens from refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Represents the claims encoded within a JWT.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: i32,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    pub token_type: TokenType,
    /// Unique token id. For refresh tokens this is what the user row remembers.
    pub jti: Uuid,
}

/// Signs and verifies HS256 tokens with a shared secret.
///
/// Holds the keys explicitly instead of reading `JWT_SECRET` per call, so one
/// instance is built at startup and shared through `web::Data`.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_settings(settings: &JwtSettings) -> Self {
        Self::new(
            &settings.secret,
            Duration::minutes(settings.access_token_expire_minutes),
            Duration::days(settings.refresh_token_expire_days),
        )
    }

    pub fn issue_access_token(&self, user_id: i32) -> Result<String, AppError> {
        self.issue(user_id, TokenType::Access, Uuid::new_v4(), self.access_ttl)
    }

    /// Issues a refresh token whose `jti` is `token_id`.
    pub fn issue_refresh_token(&self, user_id: i32, token_id: Uuid) -> Result<String, AppError> {
        self.issue(user_id, TokenType::Refresh, token_id, self.refresh_ttl)
    }

    /// Verifies signature, expiry and token type, returning the decoded claims.
    ///
    /// Every failure is reported as `AppError::Unauthorized`.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        if claims.token_type != expected {
            return Err(AppError::Unauthorized("Invalid token type".into()));
        }
        Ok(claims)
    }

    fn issue(
        &self,
        user_id: i32,
        token_type: TokenType,
        jti: Uuid,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
            token_type,
            jti,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_for_token_service_0123456789";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::minutes(30), Duration::days(7))
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = service();
        let token = tokens.issue_access_token(1).unwrap();
        let claims = tokens.verify(&token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, 1);
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_carries_id() {
        let tokens = service();
        let jti = Uuid::new_v4();
        let token = tokens.issue_refresh_token(7, jti).unwrap();
        let claims = tokens.verify(&token, TokenType::Refresh).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.jti, jti);
    }

    #[test]
    fn test_token_type_is_enforced() {
        let tokens = service();
        let refresh = tokens.issue_refresh_token(1, Uuid::new_v4()).unwrap();
        match tokens.verify(&refresh, TokenType::Access) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid token type"),
            other => panic!("Refresh token accepted as access token: {:?}", other),
        }

        let access = tokens.issue_access_token(1).unwrap();
        assert!(tokens.verify(&access, TokenType::Refresh).is_err());
    }

    #[test]
    fn test_token_expiration() {
        let now = Utc::now();
        let claims_expired = Claims {
            sub: 2,
            exp: (now - Duration::hours(2)).timestamp() as usize,
            iat: (now - Duration::hours(3)).timestamp() as usize,
            token_type: TokenType::Access,
            jti: Uuid::new_v4(),
        };
        let expired_token = encode(
            &Header::default(),
            &claims_expired,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        match service().verify(&expired_token, TokenType::Access) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(msg.contains("ExpiredSignature"), "{}", msg)
            }
            other => panic!("Token should have been invalid due to expiration: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let other = TokenService::new(
            "a_completely_different_secret_0123456789",
            Duration::minutes(30),
            Duration::days(7),
        );
        let token = other.issue_access_token(1).unwrap();

        match service().verify(&token, TokenType::Access) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(msg.contains("InvalidSignature"), "{}", msg)
            }
            other => panic!("Token should have been invalid due to signature mismatch: {:?}", other),
        }
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let tokens = service();
        let token = tokens.issue_access_token(1).unwrap();
        let other_payload = tokens.issue_access_token(2).unwrap();

        // Splice the payload of user 2's token under user 1's signature.
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other_payload.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(tokens.verify(&forged, TokenType::Access).is_err());
        assert!(tokens.verify("not-a-jwt", TokenType::Access).is_err());
    }
}
