use axum::{Router, routing::get};

use super::controller::{generate_snapshots, get_snapshots};
use crate::state::AppState;

pub fn init_inventory_router() -> Router<AppState> {
    Router::new().route("/snapshots", get(get_snapshots).post(generate_snapshots))
}
