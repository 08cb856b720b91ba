use crate::config::Config;
use crate::error::AppError;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

const BANNER_WIDTH: usize = 70;

/// 安装全局 subscriber 并打印启动横幅，`RUST_LOG` 优先于配置的级别
pub fn init_logging(config: &Config) -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directives(&config.logging.level)))
        .map_err(|e| AppError::Internal(format!("Invalid log level: {}", e)))?;

    let service_layer = match config.logging.format.as_str() {
        "json" => fmt::layer().json().with_target(true).boxed(),
        _ => fmt::layer().pretty().with_target(true).boxed(),
    };

    registry()
        .with(env_filter)
        .with(service_layer)
        .try_init()
        .map_err(|e| AppError::Internal(format!("Failed to initialize logging: {}", e)))?;

    for line in banner() {
        tracing::info!("{}", line);
    }
    Ok(())
}

// sqlx 每条语句都会打 info，压到 warn
fn filter_directives(level: &str) -> String {
    format!("{},sqlx=warn", level)
}

fn banner() -> [String; 3] {
    let stars = "*".repeat(BANNER_WIDTH);
    let title = format!(
        "{:*^width$}",
        "  P R O D U C T   S T O R E   S E R V I C E  ",
        width = BANNER_WIDTH
    );
    [stars.clone(), title, stars]
}
