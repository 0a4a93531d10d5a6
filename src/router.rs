use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::permission::require_permission;
use crate::modules::auth::router::init_auth_router;
use crate::modules::inventory::router::init_inventory_router;
use crate::modules::permissions::router::init_permissions_router;
use crate::modules::products::router::init_products_router;
use crate::modules::roles::router::init_roles_router;
use crate::modules::stock::router::{init_stock_in_router, init_stock_out_router};
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

/// Routes guarded by the permission interceptor.
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/admin/users", init_users_router())
        .nest("/admin/roles", init_roles_router())
        .nest("/admin/permissions", init_permissions_router())
        .nest("/products", init_products_router())
        .nest("/stock-in", init_stock_in_router())
        .nest("/stock-out", init_stock_out_router())
        .nest("/inventory", init_inventory_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_permission))
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                .merge(protected_routes(&state)),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
