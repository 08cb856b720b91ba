use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::config::DatabaseConfig;
use crate::error::AppError;

/// 存储初始化失败时的进程退出码，进程管理器据此停止重启
pub const EXIT_STORE_UNAVAILABLE: i32 = 4;

const CREATE_PRODUCTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(63) NOT NULL,
        category VARCHAR(63) NOT NULL,
        price INTEGER NOT NULL DEFAULT 100,
        stock INTEGER NOT NULL,
        description VARCHAR(128)
    )
"#;

pub async fn init_sqlite(config: &DatabaseConfig) -> Result<SqlitePool, AppError> {
    tracing::info!("Initializing SQLite connection pool");

    let options = SqliteConnectOptions::from_str(&config.url)?;

    // 内存库只存在于单个连接中，连接不能回收
    let pool = if is_memory_url(&config.url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?
    };

    create_tables(&pool).await?;

    Ok(pool)
}

pub async fn create_tables(pool: &SqlitePool) -> Result<(), AppError> {
    tracing::info!("Initializing database");
    sqlx::query(CREATE_PRODUCTS_TABLE).execute(pool).await?;
    Ok(())
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> Result<SqlitePool, AppError> {
    init_sqlite(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    })
    .await
}
