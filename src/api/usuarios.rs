/// Account endpoints
///
/// `/api/usuarios/me` is the only gated route; everything else is open, with
/// password hashes stripped via the public projection before anything leaves
/// the process. POST `/api/usuarios` and `/api/usuarios/verificar` are legacy
/// aliases for register and login kept for older frontends.
use crate::api::{decode_id, decode_json, envelope};
use crate::auth::cookies;
use crate::auth::AuthUser;
use crate::context::AppContext;
use crate::db::models::UsuarioPublico;
use crate::error::ApiResult;
use crate::usuario::LoginUsuario;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;

/// Build account routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/usuarios", get(list_usuarios).post(super::auth::register))
        .route("/api/usuarios/me", get(current_usuario))
        .route("/api/usuarios/verificar", post(verificar))
        .route("/api/usuarios/:id", get(get_usuario).delete(deactivate_usuario))
}

/// GET /api/usuarios - every account, public form
pub async fn list_usuarios(State(ctx): State<AppContext>) -> ApiResult<Json<serde_json::Value>> {
    let usuarios = ctx.usuarios.list().await?;
    let publicos: Vec<UsuarioPublico> = usuarios.iter().map(|u| u.to_public()).collect();
    Ok(envelope(publicos))
}

/// GET /api/usuarios/me - the account behind the session cookie
pub async fn current_usuario(
    State(ctx): State<AppContext>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let usuario = ctx.usuarios.get_by_id(claims.id_usuario).await?;
    Ok(envelope(usuario.to_public()))
}

/// POST /api/usuarios/verificar - legacy credential check, no cookies issued
pub async fn verificar(
    State(ctx): State<AppContext>,
    payload: Result<Json<LoginUsuario>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let solicitud = decode_json(payload)?;
    let usuario = ctx
        .usuarios
        .verify_credentials(&solicitud.email, &solicitud.password)
        .await?;
    Ok(envelope(usuario.to_public()))
}

/// GET /api/usuarios/{id} - account by id
pub async fn get_usuario(
    State(ctx): State<AppContext>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let id_usuario = decode_id(path)?;
    let usuario = ctx.usuarios.get_by_id(id_usuario).await?;
    Ok(envelope(usuario.to_public()))
}

/// DELETE /api/usuarios/{id} - deactivate the account and close the session
pub async fn deactivate_usuario(
    State(ctx): State<AppContext>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<(HeaderMap, Json<serde_json::Value>)> {
    let id_usuario = decode_id(path)?;
    ctx.usuarios.deactivate(id_usuario).await?;

    let mut headers = HeaderMap::new();
    cookies::clear_session_cookies(&mut headers, ctx.config.auth.cookie_secure)?;
    tracing::info!(id_usuario, "usuario desactivado");

    Ok((headers, envelope(json!({ "message": "Usuario desactivado correctamente" }))))
}
