use axum::{Router, routing::get};

use super::controller::{
    create_stock_in, create_stock_out, get_stock_in_form, get_stock_in_forms, get_stock_out_form,
    get_stock_out_forms,
};
use crate::state::AppState;

pub fn init_stock_in_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_stock_in_forms).post(create_stock_in))
        .route("/{id}", get(get_stock_in_form))
}

pub fn init_stock_out_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_stock_out_forms).post(create_stock_out))
        .route("/{id}", get(get_stock_out_form))
}
