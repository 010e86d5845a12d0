//! HS256 JWT による Authenticator 実装

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, Authenticator, UserId};

/// トークンに載せるクレーム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// ユーザー ID
    pub sub: u64,
    pub iat: i64,
    pub exp: i64,
}

/// 共有鍵で署名・検証する Authenticator
pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtAuthenticator {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::IssueFailed(e.to_string()))
    }
}

impl Authenticator for JwtAuthenticator {
    fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let validation = Validation::new(Algorithm::HS256);
        let data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        Ok(UserId::new(data.claims.sub))
    }

    fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::IssueFailed(format!("ttl {} is out of range", self.ttl)))?;
        let claims = Claims {
            sub: user_id.value(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        self.sign(&claims)
    }
}
