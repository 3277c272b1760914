//! Category API Handlers
//!
//! GET 接口为公共接口 (店面浏览无需登录)，写操作要求认证。

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::core::ServerState;
use crate::db::models::{Category, CategoryCreate, CategoryUpdate};
use crate::db::repository::category as category_repo;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

/// GET /api/categories - 获取所有分类 (按名称排序)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let categories = category_repo::find_all(&state.pool).await?;
    Ok(Json(categories))
}

/// GET /api/categories/{id} - 获取单个分类
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    let category = category_repo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Category {} not found", id)))?;
    Ok(Json(category))
}

/// POST /api/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<Category>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let category = category_repo::create(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id} - 重命名分类
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let category = category_repo::update(&state.pool, id, payload).await?;
    Ok(Json(category))
}

/// DELETE /api/categories/{id} - 删除分类
///
/// 被商品引用的分类返回 409。
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    category_repo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
