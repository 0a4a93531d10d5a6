//! Request authorization against the role/permission tables.
//!
//! The [`Authorizer`] answers one question per request: may a caller holding
//! role R invoke method M on path P? It resolves (M, P) to a stored
//! [`PermissionRecord`] by walking the probes produced by the
//! [`PathNormalizer`], then asks the store whether R is linked to that
//! permission.
//!
//! Storage stays behind two collaborator traits so the same logic runs
//! against PostgreSQL in the server and against an in-memory
//! [`PermissionTable`](crate::memory::PermissionTable) in tests and the CLI.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;
use warehouse_config::AccessConfig;

use crate::matcher::{PathNormalizer, PermissionPattern, Probe};

/// The fields of a stored permission the interceptor needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRecord {
    pub id: i32,
    pub name: String,
    pub api_path: String,
    pub http_method: String,
    pub module: String,
}

/// Per-request input to [`Authorizer::authorize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub http_method: String,
    pub path: String,
    pub role_id: Option<i32>,
}

impl RequestContext {
    pub fn new(http_method: &str, path: &str, role_id: Option<i32>) -> Self {
        Self {
            http_method: http_method.to_ascii_uppercase(),
            path: path.to_string(),
            role_id,
        }
    }
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("permission store unavailable: {0}")]
    Store(#[from] anyhow::Error),
}

/// Resolves permissions by path and method.
#[async_trait]
pub trait PermissionLookup: Send + Sync {
    /// The permission stored with exactly this `api_path` and method.
    async fn find_by_path(
        &self,
        api_path: &str,
        http_method: &str,
    ) -> Result<Option<PermissionRecord>, AccessError>;

    /// Every permission for `http_method`, ordered by id.
    async fn list_by_method(&self, http_method: &str) -> Result<Vec<PermissionRecord>, AccessError>;
}

/// Answers role → permission membership.
#[async_trait]
pub trait RoleMembership: Send + Sync {
    async fn role_has_permission(&self, role_id: i32, permission_id: i32) -> Result<bool, AccessError>;
}

/// Both collaborators behind one object.
pub trait AccessStore: PermissionLookup + RoleMembership {}

impl<T> AccessStore for T where T: PermissionLookup + RoleMembership + ?Sized {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The caller is authenticated but holds no role.
    NoRole,
    /// No stored permission matches any probe for the request.
    NotConfigured,
    /// A permission matched but the caller's role is not linked to it.
    RoleLacksPermission,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NoRole => "no_role",
            DenyReason::NotConfigured => "not_configured",
            DenyReason::RoleLacksPermission => "role_lacks_permission",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            DenyReason::NoRole => "Access denied. No role is assigned to this account",
            DenyReason::NotConfigured => "Access denied. No permission is configured for this endpoint",
            DenyReason::RoleLacksPermission => "Access denied. Your role does not grant this permission",
        };
        f.write_str(message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(PermissionRecord),
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    normalizer: PathNormalizer,
}

impl Authorizer {
    pub fn new(normalizer: PathNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn from_config(config: &AccessConfig) -> Self {
        Self::new(PathNormalizer::from_config(config))
    }

    pub fn normalizer(&self) -> &PathNormalizer {
        &self.normalizer
    }

    /// First permission matched by the probes for (`http_method`, `path`).
    pub async fn resolve<S>(
        &self,
        store: &S,
        http_method: &str,
        path: &str,
    ) -> Result<Option<PermissionRecord>, AccessError>
    where
        S: PermissionLookup + ?Sized,
    {
        for probe in self.normalizer.candidates(path) {
            let found = match &probe {
                Probe::Literal(candidate) => store.find_by_path(candidate, http_method).await?,
                Probe::NumericPattern => store
                    .list_by_method(http_method)
                    .await?
                    .into_iter()
                    .find(|permission| {
                        let pattern = PermissionPattern::compile(&permission.api_path);
                        pattern.has_placeholders() && pattern.is_match(path)
                    }),
            };

            if let Some(permission) = &found {
                debug!(http_method, path, ?probe, permission_id = permission.id, "permission resolved");
                return Ok(found);
            }
        }

        debug!(http_method, path, "no permission matches");
        Ok(None)
    }

    pub async fn authorize<S>(&self, store: &S, ctx: &RequestContext) -> Result<Decision, AccessError>
    where
        S: AccessStore + ?Sized,
    {
        let Some(role_id) = ctx.role_id else {
            return Ok(Decision::Deny(DenyReason::NoRole));
        };

        let Some(permission) = self.resolve(store, &ctx.http_method, &ctx.path).await? else {
            return Ok(Decision::Deny(DenyReason::NotConfigured));
        };

        if store.role_has_permission(role_id, permission.id).await? {
            Ok(Decision::Allow(permission))
        } else {
            Ok(Decision::Deny(DenyReason::RoleLacksPermission))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::PermissionTable;

    const ADMIN: i32 = 1;
    const STAFF: i32 = 2;

    fn record(id: i32, api_path: &str, http_method: &str, module: &str) -> PermissionRecord {
        PermissionRecord {
            id,
            name: format!("{module}:{id}"),
            api_path: api_path.to_string(),
            http_method: http_method.to_string(),
            module: module.to_string(),
        }
    }

    fn table() -> PermissionTable {
        PermissionTable::new()
            .with_permission(record(1, "/api/admin/users/{id}", "GET", "users"))
            .with_permission(record(2, "/api/admin/users/search", "GET", "users"))
            .with_permission(record(3, "/api/products/{productCode}", "GET", "products"))
            .with_permission(record(4, "/api/admin/roles/{id}/permissions", "PUT", "roles"))
            .with_permission(record(5, "/api/products", "GET", "products"))
            .grant(ADMIN, 1)
            .grant(ADMIN, 2)
            .grant(ADMIN, 3)
            .grant(ADMIN, 4)
            .grant(STAFF, 3)
            .grant(STAFF, 5)
    }

    #[tokio::test]
    async fn test_numeric_id_allowed_for_linked_role() {
        let authorizer = Authorizer::default();
        let ctx = RequestContext::new("GET", "/api/admin/users/42", Some(ADMIN));
        let decision = authorizer.authorize(&table(), &ctx).await.unwrap();
        assert!(matches!(decision, Decision::Allow(ref p) if p.id == 1));
    }

    #[tokio::test]
    async fn test_numeric_id_denied_without_link() {
        let authorizer = Authorizer::default();
        let ctx = RequestContext::new("GET", "/api/admin/users/42", Some(STAFF));
        let decision = authorizer.authorize(&table(), &ctx).await.unwrap();
        assert_eq!(decision, Decision::Deny(DenyReason::RoleLacksPermission));
    }

    #[tokio::test]
    async fn test_exact_match_beats_placeholder() {
        let store = PermissionTable::new()
            .with_permission(record(10, "/api/admin/users/{id}", "GET", "users"))
            .with_permission(record(11, "/api/admin/users/7", "GET", "users"));
        let found = Authorizer::default()
            .resolve(&store, "GET", "/api/admin/users/7")
            .await
            .unwrap();
        assert_eq!(found.map(|p| p.id), Some(11));
    }

    #[tokio::test]
    async fn test_product_code_placeholder() {
        let ctx = RequestContext::new("get", "/api/products/SKU-9", Some(STAFF));
        let decision = Authorizer::default().authorize(&table(), &ctx).await.unwrap();
        assert!(matches!(decision, Decision::Allow(ref p) if p.id == 3));
    }

    #[tokio::test]
    async fn test_code_under_other_module_is_not_configured() {
        let ctx = RequestContext::new("GET", "/api/admin/users/ABC123", Some(ADMIN));
        let decision = Authorizer::default().authorize(&table(), &ctx).await.unwrap();
        assert_eq!(decision, Decision::Deny(DenyReason::NotConfigured));
    }

    #[tokio::test]
    async fn test_numeric_pattern_scan_matches_inner_segment() {
        let ctx = RequestContext::new("PUT", "/api/admin/roles/3/permissions", Some(ADMIN));
        let decision = Authorizer::default().authorize(&table(), &ctx).await.unwrap();
        assert!(matches!(decision, Decision::Allow(ref p) if p.id == 4));
    }

    #[tokio::test]
    async fn test_method_must_match() {
        let ctx = RequestContext::new("DELETE", "/api/admin/users/42", Some(ADMIN));
        let decision = Authorizer::default().authorize(&table(), &ctx).await.unwrap();
        assert_eq!(decision, Decision::Deny(DenyReason::NotConfigured));
    }

    #[tokio::test]
    async fn test_missing_role_is_denied() {
        let ctx = RequestContext::new("GET", "/api/products", None);
        let decision = Authorizer::default().authorize(&table(), &ctx).await.unwrap();
        assert_eq!(decision, Decision::Deny(DenyReason::NoRole));
    }

    #[tokio::test]
    async fn test_exact_permission_allowed_iff_granted() {
        let store = table();
        let authorizer = Authorizer::default();
        for (role, expected) in [(STAFF, true), (ADMIN, false), (99, false)] {
            let ctx = RequestContext::new("GET", "/api/products", Some(role));
            let decision = authorizer.authorize(&store, &ctx).await.unwrap();
            assert_eq!(decision.is_allowed(), expected, "role {role}");
        }
    }

    #[tokio::test]
    async fn test_malformed_path_is_denied_not_error() {
        let authorizer = Authorizer::default();
        for path in ["", "/", "//", "/api/products/%00", "/api/admin/users/4 2"] {
            let ctx = RequestContext::new("GET", path, Some(ADMIN));
            let decision = authorizer.authorize(&table(), &ctx).await.unwrap();
            assert_eq!(decision, Decision::Deny(DenyReason::NotConfigured), "{path:?}");
        }
    }

    #[test]
    fn test_request_context_uppercases_method() {
        let ctx = RequestContext::new("patch", "/x", Some(1));
        assert_eq!(ctx.http_method, "PATCH");
    }

    #[test]
    fn test_deny_reason_labels() {
        assert_eq!(DenyReason::NotConfigured.as_str(), "not_configured");
        assert!(DenyReason::RoleLacksPermission.to_string().starts_with("Access denied"));
    }

    struct OfflineStore;

    #[async_trait]
    impl PermissionLookup for OfflineStore {
        async fn find_by_path(
            &self,
            _api_path: &str,
            _http_method: &str,
        ) -> Result<Option<PermissionRecord>, AccessError> {
            Err(AccessError::Store(anyhow::anyhow!("connection refused")))
        }

        async fn list_by_method(&self, _http_method: &str) -> Result<Vec<PermissionRecord>, AccessError> {
            Err(AccessError::Store(anyhow::anyhow!("connection refused")))
        }
    }

    #[async_trait]
    impl RoleMembership for OfflineStore {
        async fn role_has_permission(&self, _role_id: i32, _permission_id: i32) -> Result<bool, AccessError> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_an_error_not_a_deny() {
        let ctx = RequestContext::new("GET", "/api/products", Some(ADMIN));
        let err = Authorizer::default().authorize(&OfflineStore, &ctx).await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_missing_role_denies_before_touching_store() {
        let ctx = RequestContext::new("GET", "/api/products", None);
        let decision = Authorizer::default().authorize(&OfflineStore, &ctx).await.unwrap();
        assert_eq!(decision, Decision::Deny(DenyReason::NoRole));
    }
}
