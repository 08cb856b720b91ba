use std::sync::Arc;

use product_service::config::Config;
use product_service::domain::repositories::product_repository::SqliteProductRepository;
use product_service::error::AppError;
use product_service::infrastructure::database::sqlite::{init_sqlite, EXIT_STORE_UNAVAILABLE};
use product_service::logging::init_logging;
use product_service::server::{create_app, AppState};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    init_logging(&config)?;
    if config.auth.uses_dev_secret() {
        tracing::warn!("SECRET_KEY is not set, using the development secret");
    }

    // 初始化数据库连接，失败时直接退出
    let db_pool = match init_sqlite(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("{}: Cannot continue", e);
            std::process::exit(EXIT_STORE_UNAVAILABLE);
        }
    };
    let repository = Arc::new(SqliteProductRepository::new(db_pool));

    tracing::info!("Service initialized!");

    // 创建并启动服务器
    let app = create_app(AppState::new(repository));
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", &addr);

    axum::serve(listener, app).await?;
    Ok(())
}
