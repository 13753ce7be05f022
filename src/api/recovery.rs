/// Password recovery endpoints
///
/// These speak the `{success, message}` wire shape directly instead of the
/// error envelope: the reset-request answer must be indistinguishable for
/// known and unknown emails, which the regular error path cannot express.
use crate::context::AppContext;
use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use serde::{Deserialize, Serialize};

/// Answer for reset requests; never reveals whether the email exists
const GENERIC_RESET_MESSAGE: &str = "Si el email existe, recibirás un correo de recuperación";

/// Reset-request body
#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Reset-consume body
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// Wire shape for both recovery endpoints
#[derive(Debug, Serialize)]
pub struct RecoveryResponse {
    pub success: bool,
    pub message: String,
}

/// Build password recovery routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/request-password-reset", post(request_password_reset))
        .route("/api/reset-password", post(reset_password))
}

fn respond(
    status: StatusCode,
    success: bool,
    message: &str,
) -> (StatusCode, Json<RecoveryResponse>) {
    (status, Json(RecoveryResponse { success, message: message.to_string() }))
}

/// POST /api/request-password-reset - issue a reset token and email the link
pub async fn request_password_reset(
    State(ctx): State<AppContext>,
    payload: Result<Json<PasswordResetRequest>, JsonRejection>,
) -> (StatusCode, Json<RecoveryResponse>) {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "reset request body rejected");
            return respond(StatusCode::BAD_REQUEST, false, "Datos inválidos");
        }
    };

    let usuario = match ctx.usuarios.find_by_email(&req.email).await {
        Ok(Some(usuario)) => usuario,
        Ok(None) => {
            tracing::info!(email = %req.email, "reset requested for unknown email");
            return respond(StatusCode::OK, true, GENERIC_RESET_MESSAGE);
        }
        Err(e) => {
            tracing::error!(error = %e, "reset request: account lookup failed");
            return respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                false,
                "Error al procesar solicitud",
            );
        }
    };

    let token = match ctx.recovery.issue_token(usuario.id_usuario).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "reset request: token issue failed");
            return respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                false,
                "Error al procesar solicitud",
            );
        }
    };

    if let Err(e) = ctx
        .mailer
        .send_password_reset_email(&usuario.email, &token, &ctx.config.service.frontend_url)
        .await
    {
        tracing::error!(error = %e, "reset request: email dispatch failed");
        return respond(StatusCode::INTERNAL_SERVER_ERROR, false, "Error al enviar email");
    }

    tracing::info!(id_usuario = usuario.id_usuario, "reset email dispatched");
    respond(StatusCode::OK, true, GENERIC_RESET_MESSAGE)
}

/// POST /api/reset-password - consume a reset token and set the new password
pub async fn reset_password(
    State(ctx): State<AppContext>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> (StatusCode, Json<RecoveryResponse>) {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "reset body rejected");
            return respond(StatusCode::BAD_REQUEST, false, "Datos inválidos");
        }
    };

    match ctx.recovery.consume(&req.token, &req.new_password).await {
        Ok(()) => respond(StatusCode::OK, true, "Contraseña actualizada exitosamente"),
        Err(ApiError::Validation(message)) => respond(StatusCode::BAD_REQUEST, false, &message),
        Err(e) => {
            tracing::error!(error = %e, "reset: token consumption failed");
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                false,
                "Error al procesar solicitud",
            )
        }
    }
}
