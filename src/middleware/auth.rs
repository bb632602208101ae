use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::auth::{AuthError, Claims};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated principal extracted from the bearer token
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub scopes: Vec<String>,
    pub roles: Vec<String>,
}

impl AuthUser {
    /// Principal injected when authentication is disabled.
    pub fn development() -> Self {
        Self {
            id: "00000000-0000-0000-0000-000000000000".to_string(),
            name: Some("Development User".to_string()),
            username: Some("dev@localhost".to_string()),
            scopes: vec!["access_as_user".to_string()],
            roles: vec![],
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.oid.unwrap_or(claims.sub),
            name: claims.name,
            username: claims.preferred_username,
            scopes: claims
                .scp
                .map(|scp| scp.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            roles: claims.roles,
        }
    }
}

/// Validates the bearer token and injects [`AuthUser`] into the request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = if !state.config.security.auth.enabled {
        AuthUser::development()
    } else {
        let validator = state.tokens.as_ref().ok_or(AuthError::NotConfigured)?;
        let token = bearer_token(request.headers())?;
        let claims = validator.validate(token).map_err(|err| {
            tracing::debug!("Rejected bearer token: {}", err);
            err
        })?;
        AuthUser::from(claims)
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Authorization header is not valid text".to_string()))?;

    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        Some(_) => Err(AuthError::MissingToken),
        None => Err(AuthError::InvalidToken(
            "Authorization header must use the Bearer scheme".to_string(),
        )),
    }
}
