use crate::config::SigningSecret;
use crate::error::AppError;
use crate::models::{Role, User};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token, the user's unique identifier.
    pub sub: i32,
    pub username: String,
    /// Role at the time of issuance. The middleware re-reads the current role from
    /// the credential store, so this value is informational.
    pub role: Role,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Not-before timestamp (seconds since epoch).
    pub nbf: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &User, issued_at: i64, ttl: Duration) -> Self {
        Self {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            iat: issued_at,
            nbf: issued_at,
            exp: issued_at + ttl.num_seconds(),
        }
    }
}

/// Issues and verifies HS256-signed bearer tokens.
///
/// Built once at startup from [`crate::config::Config`] and shared through
/// `web::Data<TokenService>`.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &SigningSecret, ttl: Duration) -> Self {
        if secret.is_insecure() {
            log::warn!(
                "JWT_SECRET is not set; signing tokens with a random per-process secret. \
                 This is insecure and tokens will not survive a restart."
            );
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user` valid for the configured time-to-live.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        self.issue_with_ttl(user, self.ttl)
    }

    pub fn issue_with_ttl(&self, user: &User, ttl: Duration) -> Result<String, AppError> {
        let claims = Claims::for_user(user, Utc::now().timestamp(), ttl);
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature, structure and the `[nbf, exp)` validity window.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        // jsonwebtoken accepts a token in the very second it expires.
        if Utc::now().timestamp() >= claims.exp {
            return Err(AppError::InvalidToken);
        }
        Ok(claims)
    }
}
