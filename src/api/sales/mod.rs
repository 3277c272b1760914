//! Sale API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sales", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        // Static segment must be registered alongside /{id}; axum resolves
        // /report to the static route
        .route("/report", get(handler::report))
        .route("/{id}", get(handler::get_by_id))
}
