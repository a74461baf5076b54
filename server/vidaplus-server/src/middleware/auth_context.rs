//! Authentication context extraction
//!
//! Handlers take [`AuthContext`] as an argument to require a valid bearer
//! token. Missing or invalid tokens are rejected with 401 before the handler
//! runs.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use database_layer::models::UserType;

use crate::error::ApiError;
use crate::middleware::RequestContext;
use crate::server::VidaPlusServer;

/// Authenticated caller, decoded from the bearer token
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub email: String,
    pub user_type: UserType,
    /// Request context (automatically extracted)
    pub request: RequestContext,
}

impl AuthContext {
    /// Caller network origin recorded on audit entries
    #[must_use]
    pub fn origin(&self) -> Option<String> {
        self.request.remote_addr.clone()
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request.request_id
    }
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::authentication("Missing Authorization header"))?;

    auth_header.strip_prefix("Bearer ").map(str::trim).ok_or_else(|| {
        ApiError::authentication("Invalid Authorization header format. Expected: Bearer <token>")
    })
}

#[async_trait]
impl FromRequestParts<VidaPlusServer> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &VidaPlusServer,
    ) -> Result<Self, Self::Rejection> {
        let request = match RequestContext::from_request_parts(parts, state).await {
            Ok(request) => request,
            Err(never) => match never {},
        };

        let claims = state.tokens.validate(extract_token(parts)?)?;
        let user_id = claims.user_id()?;
        let user_type = claims
            .user_type
            .parse::<UserType>()
            .map_err(|()| ApiError::authentication("Invalid user type in token"))?;

        tracing::debug!(user_id, request_id = %request.request_id, "Authenticated request");

        Ok(Self {
            user_id,
            email: claims.email,
            user_type,
            request,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/auth/profile");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(extract_token(&parts(Some("Bearer abc.def"))).unwrap(), "abc.def");
        assert!(extract_token(&parts(Some("Token abc"))).is_err());
        assert!(extract_token(&parts(None)).is_err());
    }
}
