//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查接口
//! - [`auth`] - 认证相关接口
//! - [`categories`] - 分类管理接口
//! - [`products`] - 商品管理接口
//! - [`sales`] - 销售管理接口

pub mod auth;
pub mod categories;
pub mod health;
pub mod products;
pub mod sales;

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_router() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(sales::router())
}

/// Build the complete application: routes + auth + tower-http middleware
pub fn build_app(state: ServerState) -> Router {
    build_router()
        // JWT 认证中间件 - 在 Router 级别应用，require_auth 内部会跳过公共路由
        // 使用 from_fn_with_state 以便中间件可以访问 ServerState
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        // Tower HTTP 中间件
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        // HTTP 请求日志中间件
        .layer(middleware::from_fn(log_request))
}
