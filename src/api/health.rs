/// Service index and health endpoints
///
/// `/` answers with the route map frontends probe on boot; `/health` adds a
/// database round-trip so a deployment check catches a wedged pool, not just
/// a live process.
use crate::context::AppContext;
use axum::{extract::State, response::Json, routing::get, Router};

/// Build index and health routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}

/// GET / - service banner and route map
pub async fn index(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Bodega API",
        "version": ctx.config.service.version,
        "status": "ok",
        "endpoints": {
            "usuarios": "/api/usuarios",
            "bodegas": "/api/bodegas",
        }
    }))
}

/// GET /health - liveness plus database connectivity
pub async fn health(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    let database = match sqlx::query("SELECT 1").fetch_one(&ctx.db).await {
        Ok(_) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "health check: database ping failed");
            "error"
        }
    };
    let status = if database == "connected" { "ok" } else { "degraded" };

    Json(serde_json::json!({
        "status": status,
        "database": database,
        "version": ctx.config.service.version,
    }))
}
