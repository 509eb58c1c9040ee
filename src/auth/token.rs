//! Signed session tokens.
//!
//! Tokens are HMAC-signed JWTs. The payload carries the principal under
//! `user_id` plus `iat` and `exp` in Unix seconds; every token lives for
//! [`TOKEN_LIFETIME`] from issuance. Verification accepts only the HMAC
//! family, so a token whose header names any other algorithm is refused
//! before its signature is even looked at.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::AuthError;

/// How long an issued token stays valid.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Payload field holding the authenticated principal.
pub const IDENTITY_CLAIM: &str = "user_id";

const ACCEPTED: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Verified token payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, issued_at: u64) -> Self {
        Self {
            user_id: user_id.into(),
            exp: issued_at + TOKEN_LIFETIME.as_secs(),
            iat: Some(issued_at),
        }
    }

    /// Checks the shape of a payload whose signature and expiry already passed.
    fn from_payload(payload: &Map<String, Value>) -> Result<Self, AuthError> {
        let Some(Value::String(user_id)) = payload.get(IDENTITY_CLAIM) else {
            return Err(AuthError::MalformedClaims);
        };
        let exp = payload
            .get("exp")
            .and_then(Value::as_u64)
            .ok_or(AuthError::MalformedClaims)?;
        let iat = payload.get("iat").and_then(Value::as_u64);
        Ok(Self { user_id: user_id.clone(), exp, iat })
    }
}

/// Signing and verification keys derived from one process-wide secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED.to_vec();
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issues an HS256 token for `user_id`, valid from now.
    pub fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        self.issue_at(user_id, jsonwebtoken::get_current_timestamp())
    }

    /// Issues a token as if it had been signed at `issued_at` (Unix seconds).
    pub fn issue_at(&self, user_id: &str, issued_at: u64) -> Result<String, AuthError> {
        let claims = Claims::new(user_id, issued_at);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::Signing)
    }

    /// Verifies signature, algorithm family, and expiry, then checks the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Map<String, Value>>(token, &self.decoding, &self.validation)?;
        Claims::from_payload(&data.claims)
    }
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}
