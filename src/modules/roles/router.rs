use axum::{
    Router,
    routing::{get, put},
};

use super::controller::{
    create_role, delete_role, get_role, get_roles, set_role_permissions, update_role,
};
use crate::state::AppState;

pub fn init_roles_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_roles).post(create_role))
        .route("/{id}", get(get_role).put(update_role).delete(delete_role))
        .route("/{id}/permissions", put(set_role_permissions))
}
