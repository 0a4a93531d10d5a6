//! # Warehouse Auth
//!
//! Authentication tokens and request authorization.
//!
//! - [`claims`] / [`jwt`]: HS256 access tokens carrying the caller's role
//! - [`matcher`]: ordered path matchers turning a concrete URL into lookup probes
//! - [`access`]: the [`Authorizer`] and the storage traits it reads through
//! - [`memory`]: an in-memory [`PermissionTable`] implementing those traits
//!
//! ```ignore
//! use warehouse_auth::{Authorizer, Decision, RequestContext};
//!
//! let authorizer = Authorizer::from_config(&access_config);
//! let ctx = RequestContext::new("GET", "/api/admin/users/42", claims.role_id);
//! match authorizer.authorize(store.as_ref(), &ctx).await? {
//!     Decision::Allow(permission) => { /* continue */ }
//!     Decision::Deny(reason) => { /* 403 */ }
//! }
//! ```

pub mod access;
pub mod claims;
pub mod jwt;
pub mod matcher;
pub mod memory;

pub use access::{
    AccessError, AccessStore, Authorizer, Decision, DenyReason, PermissionLookup,
    PermissionRecord, RequestContext, RoleMembership,
};
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
pub use matcher::{PathMatcher, PathNormalizer, PermissionPattern, Probe};
pub use memory::PermissionTable;
