//! Permission interceptor.
//!
//! Runs in front of every protected route. The caller is authenticated
//! through [`AuthUser`], then the request's method and full path are handed
//! to the [`Authorizer`](warehouse_auth::Authorizer), which resolves the
//! stored permission for the endpoint and checks the caller's role holds it.
//!
//! - no bearer token or an invalid one: `401`
//! - no role, no configured permission, or role not linked: `403`
//! - permission store failure: `500`
//!
//! On success the matched [`PermissionRecord`](warehouse_auth::PermissionRecord)
//! and the [`AuthUser`] are stored in the request extensions.

use axum::{
    extract::{FromRequestParts, OriginalUri, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, warn};
use warehouse_auth::{Decision, RequestContext};
use warehouse_core::AppError;

use crate::metrics::track_authorization_decision;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Usage:
///
/// ```rust,ignore
/// Router::new()
///     .nest("/products", init_products_router())
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_permission));
/// ```
pub async fn require_permission(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    // Nested routers see a stripped URI; permissions are stored with the full path.
    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_owned())
        .unwrap_or_else(|| parts.uri.path().to_owned());

    let ctx = RequestContext::new(parts.method.as_str(), &path, auth_user.role_id());

    let decision = state
        .authorizer
        .authorize(state.access_store.as_ref(), &ctx)
        .await
        .map_err(|e| {
            error!(method = %ctx.http_method, path = %ctx.path, error = %e, "permission lookup failed");
            AppError::internal(e)
        })?;

    track_authorization_decision(&decision);

    match decision {
        Decision::Allow(permission) => {
            debug!(
                method = %ctx.http_method,
                path = %ctx.path,
                permission_id = permission.id,
                permission = %permission.name,
                "access granted"
            );
            parts.extensions.insert(permission);
            parts.extensions.insert(auth_user);
            Ok(next.run(Request::from_parts(parts, body)).await)
        }
        Decision::Deny(reason) => {
            warn!(
                method = %ctx.http_method,
                path = %ctx.path,
                user = %auth_user.username(),
                role_id = ?ctx.role_id,
                reason = reason.as_str(),
                "access denied"
            );
            Err(AppError::forbidden(reason.to_string()))
        }
    }
}
