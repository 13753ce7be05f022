/// API routes and handlers
pub mod auth;
pub mod bodegas;
pub mod health;
pub mod recovery;
pub mod usuarios;

use crate::context::AppContext;
use crate::error::{ApiError, ApiResult};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(usuarios::routes())
        .merge(bodegas::routes())
        .merge(recovery::routes())
}

/// Wrap payload data in the `{"success": true, "data": ...}` envelope every
/// 2xx response carries
pub(crate) fn envelope<T: Serialize>(data: T) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": data,
    }))
}

/// Decode a JSON body, collapsing every axum rejection (malformed syntax,
/// wrong content type, type mismatch) into the 400 "Datos inválidos" the
/// frontend expects instead of axum's default 422
pub(crate) fn decode_json<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "request body rejected");
            Err(ApiError::Validation("Datos inválidos".to_string()))
        }
    }
}

/// Parse the `{id}` path segment, mapping non-numeric ids to 400 "ID inválido"
pub(crate) fn decode_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "path id rejected");
            Err(ApiError::Validation("ID inválido".to_string()))
        }
    }
}
