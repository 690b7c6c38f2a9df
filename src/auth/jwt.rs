use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique per issue, so two tokens minted in the same second differ.
    #[serde(default)]
    pub jti: String,
}

/// Subject-only view of a token payload, so a missing `sub` is reported
/// as malformed rather than as a decode failure of the whole struct.
#[derive(Debug, Deserialize)]
struct SubjectClaim {
    sub: Option<String>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("JWT encode failed: {0}")]
    Encode(String),
}

/// Issues and checks HS256 bearer tokens. Built once at startup from the
/// configured secret and shared read-only.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verifies the signature and returns the user id in `sub`. Expiry is
    /// not checked here; callers run `validate` first.
    pub fn extract_user_id(&self, token: &str) -> Result<Uuid, TokenError> {
        let data = decode::<SubjectClaim>(token, &self.decoding, &self.validation(true))
            .map_err(|_| TokenError::Malformed)?;
        data.claims
            .sub
            .as_deref()
            .and_then(|sub| Uuid::parse_str(sub).ok())
            .ok_or(TokenError::Malformed)
    }

    /// `false` on any verification failure. With `ignore_expiry` an elapsed
    /// `exp` is tolerated, but a bad signature or structure still fails.
    pub fn validate(&self, token: &str, ignore_expiry: bool) -> bool {
        decode::<Claims>(token, &self.decoding, &self.validation(ignore_expiry)).is_ok()
    }

    fn validation(&self, ignore_expiry: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = !ignore_expiry;
        if ignore_expiry {
            validation.required_spec_claims.clear();
        }
        validation
    }
}

/// Tokens are persisted by digest only.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
