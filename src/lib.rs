//! Mostrador - 小商铺销售管理后端
//!
//! # 架构概述
//!
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **数据库** (`db`): 嵌入式 SQLite 存储 (sqlx, WAL)
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (models + repositories)
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};
pub use utils::logger::init_logger;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
   __  ___         __               __
  /  |/  /__  ___ / /________ _____/ /__  ____
 / /|_/ / _ \(_-</ __/ __/ _ `/ _  / _ \/ __/
/_/  /_/\___/___/\__/_/  \_,_/\_,_/\___/_/
"#
    );
}

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    utils::logger::init_logger();
    Ok(())
}
