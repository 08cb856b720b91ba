use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

// 错误日志中间件
pub async fn log_errors(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    // 检查是否为错误响应
    if response.status().is_client_error() || response.status().is_server_error() {
        warn!("请求失败: {} {} -> {}", method, path, response.status());
    }

    response
}
