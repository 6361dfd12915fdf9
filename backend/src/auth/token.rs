//! Signed session tokens (HS256 JWT)

use crate::config::JwtConfig;
use crate::error::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const GENERATED_SECRET_LEN: usize = 32;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Username
    pub iat: i64,    // Issued at
    pub exp: i64,    // Expiration
    pub iss: String, // Issuer
    pub jti: String, // Token ID
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// A freshly issued token and when it stops being valid
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies session tokens
#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
    issuer: String,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = match &config.secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                tracing::warn!(
                    "No JWT secret configured; tokens will not survive a restart"
                );
                let mut bytes = vec![0u8; GENERATED_SECRET_LEN];
                rand::rngs::OsRng.fill_bytes(&mut bytes);
                bytes
            }
        };

        Self {
            secret,
            issuer: config.issuer.clone(),
            lifetime: Duration::hours(config.expiration_hours),
        }
    }

    pub fn issue(&self, username: &str) -> Result<IssuedToken> {
        self.issue_at(username, Utc::now())
    }

    fn issue_at(&self, username: &str, now: DateTime<Utc>) -> Result<IssuedToken> {
        let expires_at = now + self.lifetime;

        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature, issuer and expiry; return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)?;
        Ok(data.claims)
    }
}
