use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::extract::{parse_payload, JsonPayload, ProductId};
use crate::domain::services::product_service::{ProductFilter, ProductService};
use crate::error::AppError;
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/{id}/purchase", put(purchase_product))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub name: Option<String>,
    pub category: Option<String>,
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Value>>, AppError> {
    tracing::info!("Request to list Products...");
    let Query(params) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let product_service = ProductService::new(state.products.clone());

    let products = product_service
        .list_products(ProductFilter::from_query(params.name, params.category))
        .await?;

    Ok(Json(products.iter().map(|p| p.to_value()).collect()))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    ProductId(id): ProductId,
) -> Result<Json<Value>, AppError> {
    tracing::info!("Request to Retrieve a product with id [{}]", id);
    let product_service = ProductService::new(state.products.clone());

    let product = product_service.get_product(id).await?;

    Ok(Json(product.to_value()))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    JsonPayload(payload): JsonPayload,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Request to Create a Product");
    tracing::debug!("Payload = {}", payload);
    let product_service = ProductService::new(state.products.clone());

    let product = product_service.create_product(&payload).await?;
    let location = location_of(&headers, product.id.unwrap_or_default());

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(product.to_value()),
    ))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    ProductId(id): ProductId,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    tracing::info!("Request to Update a product with id [{}]", id);
    let product_service = ProductService::new(state.products.clone());

    let product = product_service.update_product(id, &parse_payload(&body)).await?;

    Ok(Json(product.to_value()))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    ProductId(id): ProductId,
) -> Result<StatusCode, AppError> {
    tracing::info!("Request to Delete a product with id [{}]", id);
    let product_service = ProductService::new(state.products.clone());

    product_service.delete_product(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn purchase_product(
    State(state): State<Arc<AppState>>,
    ProductId(id): ProductId,
) -> Result<Json<Value>, AppError> {
    tracing::info!("Request to Purchase a Product");
    let product_service = ProductService::new(state.products.clone());

    let product = product_service.purchase_product(id).await?;

    Ok(Json(product.to_value()))
}

// 有 Host 时返回绝对地址
fn location_of(headers: &HeaderMap, id: i64) -> String {
    match headers.get(header::HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => format!("http://{}/products/{}", host, id),
        None => format!("/products/{}", id),
    }
}
