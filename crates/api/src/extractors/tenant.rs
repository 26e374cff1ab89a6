//! Tenant context extractor.
//!
//! Every tracking endpoint runs on behalf of one actor of one tenant. The
//! context comes from the Bearer access token issued by the school platform.

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use shared::jwt::Role;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Caller identity resolved from the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub actor_id: Uuid,
    pub role: Role,
}

impl TenantContext {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        match self.role {
            Role::Admin => Ok(()),
            _ => Err(ApiError::Forbidden("Admin role required".to_string())),
        }
    }

    /// Students may only see themselves; staff may see any actor of the tenant.
    pub fn ensure_can_access(&self, actor_id: Uuid) -> Result<(), ApiError> {
        if self.role.is_staff() || self.actor_id == actor_id {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Students may only access their own locations".to_string(),
            ))
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for TenantContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<TenantContext>() {
            return Ok(*ctx);
        }

        let token = bearer_token(parts)?;
        let claims = state.jwt.validate_token(token)?;
        let ctx = TenantContext {
            tenant_id: claims.tenant_id()?,
            actor_id: claims.actor_id()?,
            role: claims.role,
        };

        parts.extensions.insert(ctx);
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn ctx(role: Role) -> TenantContext {
        TenantContext {
            tenant_id: Uuid::new_v4(),
            actor_id: Uuid::new_v4(),
            role,
        }
    }

    fn parts_with(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/locations");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_require_admin() {
        assert!(ctx(Role::Admin).require_admin().is_ok());
        assert!(matches!(
            ctx(Role::Teacher).require_admin(),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            ctx(Role::Student).require_admin(),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_student_can_only_access_self() {
        let student = ctx(Role::Student);
        assert!(student.ensure_can_access(student.actor_id).is_ok());
        assert!(matches!(
            student.ensure_can_access(Uuid::new_v4()),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_staff_can_access_any_actor() {
        assert!(ctx(Role::Teacher).ensure_can_access(Uuid::new_v4()).is_ok());
        assert!(ctx(Role::Admin).ensure_can_access(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def"))).unwrap(), "abc.def");
        assert!(matches!(
            bearer_token(&parts_with(None)),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            bearer_token(&parts_with(Some("Basic dXNlcjpwYXNz"))),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            bearer_token(&parts_with(Some("Bearer "))),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
