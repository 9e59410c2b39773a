use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use discoverfin_core::error::{ApiError, ErrorEnvelope};
use discoverfin_metadata::MetadataError;
use discoverfin_metadata::catalog::CatalogIdError;

/// Newtype wrapper so we can implement `IntoResponse` in this crate.
pub struct AppError(pub ApiError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = ErrorEnvelope::from(&self.0);
        (status, Json(envelope)).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<CatalogIdError> for AppError {
    fn from(e: CatalogIdError) -> Self {
        Self(ApiError::BadRequest(e.to_string()))
    }
}

impl From<MetadataError> for AppError {
    fn from(e: MetadataError) -> Self {
        Self(match e {
            MetadataError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            MetadataError::Network(_) | MetadataError::Provider(_) | MetadataError::NotFound => {
                ApiError::BadGateway(e.to_string())
            }
            MetadataError::Db(_)
            | MetadataError::InvalidItem { .. }
            | MetadataError::Client(_) => {
                ApiError::Internal(e.to_string())
            }
        })
    }
}
