use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::RequestPartsExt;
use serde_json::Value;

use crate::error::{AppError, InvalidProduct};

pub const JSON_MEDIA_TYPE: &str = "application/json";

/// 路径中的商品 id，非整数视为不存在
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductId(pub i64);

impl<S> FromRequestParts<S> for ProductId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = parts
            .extract::<Path<String>>()
            .await
            .map_err(|e| AppError::Internal(format!("Missing product id: {}", e)))?;

        raw.parse::<i64>()
            .map(ProductId)
            .map_err(|_| AppError::NotFound(format!("Product with id '{}' was not found.", raw)))
    }
}

/// 要求 `Content-Type: application/json` 的请求体，在读取 body 之前校验
#[derive(Debug, Clone)]
pub struct JsonPayload(pub Value);

impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        require_content_type(req.headers(), JSON_MEDIA_TYPE)?;

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| {
                tracing::debug!("Failed to read request body: {}", e);
                AppError::Validation(InvalidProduct::single(
                    "Invalid Product: body of request contained bad or no data",
                ))
            })?;

        Ok(Self(parse_payload(&bytes)))
    }
}

pub fn require_content_type(headers: &HeaderMap, media_type: &str) -> Result<(), AppError> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());

    let matches = content_type
        .and_then(|v| v.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(media_type))
        .unwrap_or(false);

    if matches {
        return Ok(());
    }

    tracing::error!("Invalid Content-Type: {:?}", content_type);
    Err(AppError::UnsupportedMediaType(media_type.to_string()))
}

/// 无法解析的 JSON 按空请求体处理，由解码阶段报告
pub fn parse_payload(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or(Value::Null)
}
