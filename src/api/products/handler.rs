//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::product as product_repo;
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult};

/// GET /api/products - 获取所有商品 (按名称排序)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = product_repo::find_all(&state.pool).await?;
    Ok(Json(products))
}

/// GET /api/products/{id} - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let product = product_repo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;
    Ok(Json(product))
}

/// POST /api/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<Product>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let product = product_repo::create(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id} - 部分更新商品 (仅给出的字段生效)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.image_url, "imageUrl", 500)?;

    let product = product_repo::update(&state.pool, id, payload).await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id} - 删除商品
///
/// 已出现在历史销售中的商品返回 409。
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    product_repo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
