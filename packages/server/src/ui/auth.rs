//! Bearer authentication for the REST API.

use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};

use crate::{
    domain::{AuthError, UserId},
    infrastructure::dto::http::ErrorResponse,
    ui::state::AppState,
};

/// Caller identity taken from `Authorization: Bearer <token>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingToken)
            .map_err(unauthorized)?;

        let user_id = state.authenticator.verify(header).map_err(unauthorized)?;
        Ok(Self(user_id))
    }
}

fn unauthorized(e: AuthError) -> (StatusCode, Json<ErrorResponse>) {
    tracing::warn!("Rejected REST request: {}", e);
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}
