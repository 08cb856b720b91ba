use axum::{
    http::{Method, Uri},
    middleware, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::{health, products};
use crate::domain::repositories::product_repository::ProductRepository;
use crate::error::AppError;
use crate::middleware::log_errors::log_errors;

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
}

impl AppState {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }
}

pub fn create_app(state: AppState) -> Router {
    let app_state = Arc::new(state);

    Router::new()
        .merge(health::routes())
        .merge(products::routes())
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn(log_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Resource '{}' was not found.", uri.path()))
}

async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method.to_string())
}
