/// Session endpoints: register, login, logout, refresh
///
/// Successful register/login responses carry the session as two HttpOnly
/// cookies plus the public account in the body, so browser clients never
/// handle the raw JWT.
use crate::api::{decode_json, envelope};
use crate::auth::cookies::{self, REFRESH_COOKIE};
use crate::auth::token::{ACCESS_TTL_HOURS, REFRESH_TTL_HOURS};
use crate::context::AppContext;
use crate::error::{ApiError, ApiResult};
use crate::usuario::{LoginUsuario, NuevoUsuario};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

/// Build session routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/refresh", post(refresh))
}

/// POST /api/auth/register - create an account and open a session
pub async fn register(
    State(ctx): State<AppContext>,
    payload: Result<Json<NuevoUsuario>, JsonRejection>,
) -> ApiResult<(StatusCode, HeaderMap, Json<serde_json::Value>)> {
    let solicitud = decode_json(payload)?;
    let usuario = ctx.usuarios.register(solicitud).await?;

    let headers = session_headers(&ctx, usuario.id_usuario, &usuario.email, &usuario.rol)?;
    tracing::info!(id_usuario = usuario.id_usuario, "usuario registrado");

    Ok((
        StatusCode::CREATED,
        headers,
        envelope(json!({
            "usuario": usuario.to_public(),
            "message": "Usuario registrado exitosamente",
        })),
    ))
}

/// POST /api/auth/login - verify credentials and open a session
pub async fn login(
    State(ctx): State<AppContext>,
    payload: Result<Json<LoginUsuario>, JsonRejection>,
) -> ApiResult<(HeaderMap, Json<serde_json::Value>)> {
    let solicitud = decode_json(payload)?;
    let usuario = ctx
        .usuarios
        .verify_credentials(&solicitud.email, &solicitud.password)
        .await?;

    let headers = session_headers(&ctx, usuario.id_usuario, &usuario.email, &usuario.rol)?;
    tracing::info!(id_usuario = usuario.id_usuario, "login exitoso");

    Ok((
        headers,
        envelope(json!({
            "usuario": usuario.to_public(),
            "message": "Login exitoso",
        })),
    ))
}

/// POST /api/auth/logout - drop both session cookies
pub async fn logout(
    State(ctx): State<AppContext>,
) -> ApiResult<(HeaderMap, Json<serde_json::Value>)> {
    let mut headers = HeaderMap::new();
    cookies::clear_session_cookies(&mut headers, ctx.config.auth.cookie_secure)?;

    Ok((headers, envelope(json!({ "message": "Sesión cerrada correctamente" }))))
}

/// POST /api/auth/refresh - mint a fresh access cookie off the refresh cookie
///
/// The refresh token itself is not rotated; it keeps its original expiry.
pub async fn refresh(
    State(ctx): State<AppContext>,
    jar: CookieJar,
) -> ApiResult<(HeaderMap, Json<serde_json::Value>)> {
    let token = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()).ok_or_else(|| {
        ApiError::Authentication("No autorizado: token no encontrado".to_string())
    })?;

    let access = ctx.tokens.refresh(&token)?;
    let mut headers = HeaderMap::new();
    cookies::apply_access_cookie(&mut headers, &access, ctx.config.auth.cookie_secure)?;

    Ok((headers, envelope(json!({ "message": "Token renovado" }))))
}

/// Issue the access/refresh pair and bind both to response cookies
fn session_headers(
    ctx: &AppContext,
    id_usuario: i64,
    email: &str,
    rol: &str,
) -> ApiResult<HeaderMap> {
    let access = ctx.tokens.issue(id_usuario, email, rol, ACCESS_TTL_HOURS)?;
    let refresh = ctx.tokens.issue(id_usuario, email, rol, REFRESH_TTL_HOURS)?;

    let mut headers = HeaderMap::new();
    cookies::apply_session_cookies(&mut headers, &access, &refresh, ctx.config.auth.cookie_secure)?;
    Ok(headers)
}
