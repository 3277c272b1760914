//! Authentication Handlers
//!
//! Handles registration, login and current-user lookup

use std::time::Duration;

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::UserCreate;
use crate::db::repository::user as user_repo;
use crate::security_log;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 认证成功响应 (注册和登录共用)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub email: String,
    pub full_name: String,
    pub token: String,
}

/// POST /api/auth/register - 注册新用户
///
/// 邮箱不区分大小写，重复注册返回 409。
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_required_text(&payload.email, "email", MAX_NAME_LEN)?;
    validate_required_text(&payload.full_name, "fullName", MAX_NAME_LEN)?;
    if payload.password.len() < 6 {
        return Err(AppError::validation(
            "password must be at least 6 characters",
        ));
    }

    let user = user_repo::create(&state.pool, payload).await?;

    let token = state
        .jwt_service
        .generate_token(user.id, &user.email, &user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(user_id = %user.id, email = %user.email, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            email: user.email,
            full_name: user.full_name,
            token,
        }),
    ))
}

/// POST /api/auth/login - 登录
///
/// 认证失败统一返回 "Invalid email or password"，避免账号枚举。
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = user_repo::find_by_email(&state.pool, &req.email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match user {
        Some(u) => u,
        None => {
            security_log!("WARN", "login_failed", email = req.email.clone());
            return Err(AppError::invalid_credentials());
        }
    };

    let password_valid = user
        .verify_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

    if !password_valid {
        security_log!("WARN", "login_failed", email = req.email.clone());
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_token(user.id, &user.email, &user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(user_id = %user.id, email = %user.email, "User logged in");

    Ok(Json(AuthResponse {
        email: user.email,
        full_name: user.full_name,
        token,
    }))
}

/// GET /api/auth/me - 当前用户信息
///
/// 从数据库读取最新资料 (令牌中的 email 可能过期)。
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<serde_json::Value>> {
    let user = user_repo::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(serde_json::json!({
        "id": user.id,
        "email": user.email,
        "fullName": user.full_name,
        "role": user.role,
    })))
}
