//! Sale API Handlers
//!
//! 销售创建是系统中唯一的多表事务，全部委托给仓储层；
//! 这里只做参数提取和错误转换。

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Sale, SaleCreate, SalesReport};
use crate::db::repository::sale as sale_repo;
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult};

/// POST /api/sales - 创建销售 (原子扣减库存)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SaleCreate>,
) -> AppResult<(StatusCode, Json<Sale>)> {
    validate_optional_text(&payload.customer_name, "customerName", MAX_NAME_LEN)?;

    let sale = sale_repo::create(&state.pool, payload).await?;

    tracing::info!(
        sale_id = %sale.id,
        total = %sale.total,
        items = sale.items.len(),
        "Sale recorded"
    );

    Ok((StatusCode::CREATED, Json(sale)))
}

/// GET /api/sales - 获取所有销售 (最新在前)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Sale>>> {
    let sales = sale_repo::find_all(&state.pool).await?;
    Ok(Json(sales))
}

/// GET /api/sales/{id} - 获取单笔销售
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Sale>> {
    let sale = sale_repo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Sale {} not found", id)))?;
    Ok(Json(sale))
}

/// 报表查询参数 (ISO 8601 日期, UTC 日历日)
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// GET /api/sales/report?from=YYYY-MM-DD&to=YYYY-MM-DD - 日期区间报表
///
/// 参数解析失败也走统一的 `{code, message}` 错误响应。
pub async fn report(
    State(state): State<ServerState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> AppResult<Json<SalesReport>> {
    let Query(query) = query.map_err(|e| AppError::validation(e.body_text()))?;
    let report = sale_repo::report(&state.pool, query.from, query.to).await?;
    Ok(Json(report))
}
