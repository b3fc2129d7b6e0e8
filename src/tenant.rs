//! Tenant scoping
//!
//! Every read and write in the service is parameterized by a [`TenantScope`].
//! There is no default organization: a request that does not name one is
//! rejected before it reaches a service.

use std::fmt;
use std::str::FromStr;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Header carrying the active organization id
pub const ORG_HEADER: &str = "x-organization-id";

/// The active organization. Records owned by any other organization are
/// invisible through a scope, indistinguishable from records that do not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantScope(Uuid);

impl TenantScope {
    pub fn new(org_id: Uuid) -> Self {
        Self(org_id)
    }

    pub fn org_id(&self) -> Uuid {
        self.0
    }

    /// True when `org_id` belongs to this scope
    pub fn owns(&self, org_id: Uuid) -> bool {
        self.0 == org_id
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantScope {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ORG_HEADER)
            .ok_or_else(|| AppError::validation("X-Organization-Id", "Organization header is required"))?
            .to_str()
            .map_err(|_| AppError::validation("X-Organization-Id", "Organization header must be ASCII"))?;

        raw.parse()
            .map_err(|_| AppError::validation("X-Organization-Id", "Organization id must be a UUID"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<TenantScope, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(ORG_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        TenantScope::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_org_from_header() {
        let org = Uuid::new_v4();
        let scope = extract(Some(&org.to_string())).await.unwrap();
        assert_eq!(scope.org_id(), org);
        assert!(scope.owns(org));
        assert!(!scope.owns(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn test_missing_header_is_a_validation_error() {
        let err = extract(None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref f) if f.fields()[0].field == "X-Organization-Id"));
    }

    #[tokio::test]
    async fn test_malformed_header_is_rejected() {
        assert!(matches!(extract(Some("acme")).await, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_display_round_trips() {
        let scope = TenantScope::new(Uuid::new_v4());
        assert_eq!(scope.to_string().parse::<TenantScope>().unwrap(), scope);
    }
}
