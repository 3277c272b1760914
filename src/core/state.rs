use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc / 连接池实现浅拷贝，所有权成本极低。
/// 除数据库外，处理器不在内存中持有任何跨请求状态。
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 手动构造 (测试中可注入内存数据库)
    pub fn new(config: Config, pool: SqlitePool, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            pool,
            jwt_service,
        }
    }

    /// 创建服务器状态: 打开数据库、应用迁移、装配服务
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let work_dir = PathBuf::from(&config.work_dir);
        std::fs::create_dir_all(&work_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;

        let db_path = work_dir.join("mostrador.db");
        let db = DbService::new(&db_path.to_string_lossy()).await?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self::new(config.clone(), db.pool, jwt_service))
    }
}
