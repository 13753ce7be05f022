/// Winery record endpoints
///
/// Listing takes the optional session into account: anonymous callers only
/// see active records, a logged-in session sees the full registry.
use crate::api::{decode_id, decode_json, envelope};
use crate::auth::MaybeAuthUser;
use crate::bodega::NuevaBodega;
use crate::context::AppContext;
use crate::error::ApiResult;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;

/// Build winery routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/bodegas", get(list_bodegas).post(create_bodega))
        .route("/api/bodegas/:id", get(get_bodega))
}

/// GET /api/bodegas - list wineries, inactive ones only for a logged-in session
pub async fn list_bodegas(
    State(ctx): State<AppContext>,
    MaybeAuthUser(claims): MaybeAuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let bodegas = ctx.bodegas.list(claims.is_some()).await?;
    Ok(envelope(bodegas))
}

/// POST /api/bodegas - register a winery
pub async fn create_bodega(
    State(ctx): State<AppContext>,
    payload: Result<Json<NuevaBodega>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let solicitud = decode_json(payload)?;
    let bodega = ctx.bodegas.create(solicitud).await?;
    tracing::info!(id_bodega = bodega.id_bodega, "bodega creada");

    Ok((StatusCode::CREATED, envelope(bodega)))
}

/// GET /api/bodegas/{id} - winery by id
pub async fn get_bodega(
    State(ctx): State<AppContext>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let id_bodega = decode_id(path)?;
    let bodega = ctx.bodegas.get_by_id(id_bodega).await?;
    Ok(envelope(bodega))
}
