//! Bearer-token validation for Microsoft Entra ID access tokens, plus an
//! HS256 shared-secret mode for local development.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AuthConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    /// Space-separated delegated scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scp: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Local development claims valid for `hours`.
    pub fn development(subject: &str, name: Option<&str>, hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.to_string(),
            oid: None,
            name: name.map(str::to_string),
            preferred_username: Some(subject.to_string()),
            scp: Some("access_as_user".to_string()),
            roles: vec![],
            exp: (now + Duration::hours(hours)).timestamp(),
            iat: Some(now.timestamp()),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token validation is not configured")]
    NotConfigured,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token signed with unknown key {0}")]
    UnknownKey(String),

    #[error("Failed to load signing keys: {0}")]
    Jwks(String),
}

enum KeySource {
    /// RS256 keys from the tenant's JWKS document, by `kid`.
    Jwks(HashMap<String, DecodingKey>),
    Secret(DecodingKey),
}

pub struct TokenValidator {
    keys: KeySource,
    validation: Validation,
}

impl TokenValidator {
    /// Entra ID validation when a tenant and client id are configured,
    /// otherwise the development shared secret.
    pub async fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        match (config.tenant_id.as_deref(), config.client_id.as_deref()) {
            (Some(tenant_id), Some(client_id)) => {
                let jwks = fetch_jwks(&config.authority, tenant_id).await?;
                Self::entra(tenant_id, client_id, &jwks)
            }
            _ => match config.dev_secret.as_deref() {
                Some(secret) if !secret.is_empty() => Ok(Self::shared_secret(secret)),
                _ => Err(AuthError::NotConfigured),
            },
        }
    }

    pub fn entra(tenant_id: &str, client_id: &str, jwks: &JwkSet) -> Result<Self, AuthError> {
        let mut keys = HashMap::new();
        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(e) => debug!("Skipping unusable JWK {}: {}", kid, e),
            }
        }
        if keys.is_empty() {
            return Err(AuthError::Jwks("no usable signing keys".to_string()));
        }

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[format!("api://{}", client_id), client_id.to_string()]);
        validation.set_issuer(&[
            format!("https://login.microsoftonline.com/{}/v2.0", tenant_id),
            format!("https://sts.windows.net/{}/", tenant_id),
        ]);

        info!("Loaded {} Entra ID signing keys", keys.len());
        Ok(Self {
            keys: KeySource::Jwks(keys),
            validation,
        })
    }

    pub fn shared_secret(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        Self {
            keys: KeySource::Secret(DecodingKey::from_secret(secret.as_bytes())),
            validation,
        }
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let key = match &self.keys {
            KeySource::Secret(key) => key,
            KeySource::Jwks(keys) => {
                let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
                let kid = header
                    .kid
                    .ok_or_else(|| AuthError::InvalidToken("token header has no kid".to_string()))?;
                keys.get(&kid).ok_or(AuthError::UnknownKey(kid))?
            }
        };

        decode::<Claims>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

async fn fetch_jwks(authority: &str, tenant_id: &str) -> Result<JwkSet, AuthError> {
    let url = format!(
        "{}/{}/discovery/v2.0/keys",
        authority.trim_end_matches('/'),
        tenant_id
    );
    info!("Fetching signing keys from {}", url);
    let response = reqwest::get(&url)
        .await
        .map_err(|e| AuthError::Jwks(e.to_string()))?;
    if !response.status().is_success() {
        return Err(AuthError::Jwks(format!("{} returned {}", url, response.status())));
    }
    response
        .json::<JwkSet>()
        .await
        .map_err(|e| AuthError::Jwks(e.to_string()))
}

/// Signs `claims` with the development shared secret.
pub fn issue_dev_token(secret: &str, claims: &Claims) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::NotConfigured);
    }
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_tokens_round_trip() {
        let token = issue_dev_token("s3cret", &Claims::development("dev@example.com", Some("Dev"), 1)).unwrap();
        let claims = TokenValidator::shared_secret("s3cret").validate(&token).unwrap();
        assert_eq!(claims.sub, "dev@example.com");
        assert_eq!(claims.name.as_deref(), Some("Dev"));
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let token = issue_dev_token("s3cret", &Claims::development("dev", None, 1)).unwrap();
        assert!(TokenValidator::shared_secret("other").validate(&token).is_err());

        let expired = issue_dev_token("s3cret", &Claims::development("dev", None, -2)).unwrap();
        assert!(matches!(
            TokenValidator::shared_secret("s3cret").validate(&expired),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn entra_requires_usable_keys() {
        let empty = JwkSet { keys: vec![] };
        assert!(matches!(
            TokenValidator::entra("tenant", "client", &empty),
            Err(AuthError::Jwks(_))
        ));
    }

    #[tokio::test]
    async fn unconfigured_auth_is_an_error() {
        let config = crate::config::AppConfig::production().security.auth;
        assert!(matches!(
            TokenValidator::from_config(&config).await,
            Err(AuthError::NotConfigured)
        ));
    }
}
