/// Reset-token lifecycle implementation
use crate::{
    config::ServerConfig,
    db::models::ResetToken,
    error::{ApiError, ApiResult},
};
use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Reset tokens are valid for one hour
const TOKEN_TTL_HOURS: i64 = 1;

/// Password recovery manager service
pub struct PasswordResetManager {
    db: SqlitePool,
    config: Arc<ServerConfig>,
}

impl PasswordResetManager {
    /// Create a new password recovery manager
    pub fn new(db: SqlitePool, config: Arc<ServerConfig>) -> Self {
        Self { db, config }
    }

    /// Create a fresh reset token for an account
    ///
    /// Previous tokens for the account are dropped first, best-effort: a
    /// failed delete is logged and the new token inserted anyway, leaving an
    /// overlapping token as a tolerated degraded condition.
    pub async fn issue_token(&self, user_id: i64) -> ApiResult<String> {
        if let Err(e) = sqlx::query("DELETE FROM restaurar_contrasenas WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.db)
            .await
        {
            tracing::warn!(
                "failed to clear previous reset tokens for usuario {}: {}",
                user_id,
                e
            );
        }

        let token = generate_token();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO restaurar_contrasenas (token, user_id, expires_at, used, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&token)
        .bind(user_id)
        .bind(now + Duration::hours(TOKEN_TTL_HOURS))
        .bind(false)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        tracing::info!("issued reset token for usuario {}", user_id);
        Ok(token)
    }

    /// Redeem a token: overwrite the account password and burn the token
    ///
    /// The password length check runs before any lookup, so a short password
    /// never touches token state. The password write precedes the used-flag
    /// write; a crash between them leaves a retryable token, and a failure
    /// marking it used is logged without failing the operation (the sweep
    /// collects it either way).
    pub async fn consume(&self, token: &str, new_password: &str) -> ApiResult<()> {
        if new_password.chars().count() < 6 {
            return Err(ApiError::Validation(
                "La contraseña debe tener al menos 6 caracteres".to_string(),
            ));
        }

        let registro = sqlx::query_as::<_, ResetToken>(
            "SELECT token, user_id, expires_at, used, created_at
             FROM restaurar_contrasenas WHERE token = ?1",
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::Validation("Token inválido".to_string()))?;

        if registro.used {
            return Err(ApiError::Validation(
                "Este token ya fue utilizado".to_string(),
            ));
        }

        if Utc::now() > registro.expires_at {
            return Err(ApiError::Validation("El token ha expirado".to_string()));
        }

        let hash = bcrypt::hash(new_password, self.config.auth.bcrypt_cost)
            .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;

        let updated = sqlx::query("UPDATE usuarios SET password = ?1 WHERE id_usuario = ?2")
            .bind(&hash)
            .bind(registro.user_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        // No FK backs user_id, so the account may have vanished meanwhile
        if updated.rows_affected() == 0 {
            tracing::warn!(
                "reset token {} pointed at missing usuario {}",
                token,
                registro.user_id
            );
        }

        if let Err(e) = sqlx::query("UPDATE restaurar_contrasenas SET used = 1 WHERE token = ?1")
            .bind(token)
            .execute(&self.db)
            .await
        {
            tracing::error!("failed to mark reset token as used: {}", e);
        }

        tracing::info!(
            "password updated via reset token for usuario {}",
            registro.user_id
        );
        Ok(())
    }

    /// Delete expired and spent tokens, returning how many went away
    ///
    /// Runs hourly from the job scheduler. Issue and consume need no
    /// coordination with the sweep beyond row-level consistency; deleting a
    /// row mid-redeem just surfaces as "Token inválido" to that caller.
    pub async fn sweep_expired(&self) -> ApiResult<u64> {
        let result =
            sqlx::query("DELETE FROM restaurar_contrasenas WHERE expires_at < ?1 OR used = 1")
                .bind(Utc::now())
                .execute(&self.db)
                .await
                .map_err(ApiError::Database)?;

        Ok(result.rows_affected())
    }
}

/// 32 bytes from the OS-seeded RNG, hex-encoded: 256 bits of entropy
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::usuario::{NuevoUsuario, UsuarioManager};
    use std::path::Path;

    async fn setup() -> (PasswordResetManager, UsuarioManager) {
        let pool = db::create_pool(Path::new(":memory:"), db::DatabaseOptions::default())
            .await
            .expect("Failed to create pool");
        db::run_migrations(&pool).await.expect("Migrations failed");

        let config = Arc::new(ServerConfig::for_tests());
        (
            PasswordResetManager::new(pool.clone(), Arc::clone(&config)),
            UsuarioManager::new(pool, config),
        )
    }

    async fn register(usuarios: &UsuarioManager) -> i64 {
        usuarios
            .register(NuevoUsuario {
                email: "maria@example.com".to_string(),
                password: "secreta123".to_string(),
                nombre: "María".to_string(),
                apellido: "González".to_string(),
                rol: None,
            })
            .await
            .expect("Registration failed")
            .id_usuario
    }

    async fn token_count(manager: &PasswordResetManager, user_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM restaurar_contrasenas WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&manager.db)
            .await
            .expect("Count failed")
    }

    async fn force_expiry(manager: &PasswordResetManager, token: &str) {
        sqlx::query("UPDATE restaurar_contrasenas SET expires_at = ?1 WHERE token = ?2")
            .bind(Utc::now() - Duration::hours(2))
            .bind(token)
            .execute(&manager.db)
            .await
            .expect("Update failed");
    }

    #[test]
    fn generated_tokens_are_64_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[tokio::test]
    async fn issuing_replaces_previous_tokens() {
        let (manager, _) = setup().await;

        let primero = manager.issue_token(1).await.expect("Issue failed");
        let segundo = manager.issue_token(1).await.expect("Issue failed");
        assert_ne!(primero, segundo);

        assert_eq!(token_count(&manager, 1).await, 1, "one active token only");
        assert!(manager.consume(&primero, "nueva-clave").await.is_err());
    }

    #[tokio::test]
    async fn consume_round_trip_changes_password() {
        let (manager, usuarios) = setup().await;
        let user_id = register(&usuarios).await;

        let token = manager.issue_token(user_id).await.expect("Issue failed");
        manager
            .consume(&token, "clave-nueva")
            .await
            .expect("Consume failed");

        assert!(usuarios
            .verify_credentials("maria@example.com", "secreta123")
            .await
            .is_err());
        assert!(usuarios
            .verify_credentials("maria@example.com", "clave-nueva")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn token_is_single_use() {
        let (manager, usuarios) = setup().await;
        let user_id = register(&usuarios).await;

        let token = manager.issue_token(user_id).await.expect("Issue failed");
        manager
            .consume(&token, "clave-nueva")
            .await
            .expect("Consume failed");

        let err = manager
            .consume(&token, "otra-clave")
            .await
            .expect_err("Spent token accepted");
        match err {
            ApiError::Validation(msg) => assert_eq!(msg, "Este token ya fue utilizado"),
            other => panic!("Unexpected error: {other:?}"),
        }

        // The first password change is still the one in effect
        assert!(usuarios
            .verify_credentials("maria@example.com", "clave-nueva")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let (manager, _) = setup().await;
        let err = manager
            .consume("deadbeef", "clave-nueva")
            .await
            .expect_err("Unknown token accepted");
        match err {
            ApiError::Validation(msg) => assert_eq!(msg, "Token inválido"),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn expired_token_is_rejected_without_sweep() {
        let (manager, usuarios) = setup().await;
        let user_id = register(&usuarios).await;

        let token = manager.issue_token(user_id).await.expect("Issue failed");
        force_expiry(&manager, &token).await;

        let err = manager
            .consume(&token, "clave-nueva")
            .await
            .expect_err("Expired token accepted");
        match err {
            ApiError::Validation(msg) => assert_eq!(msg, "El token ha expirado"),
            other => panic!("Unexpected error: {other:?}"),
        }

        assert!(
            usuarios
                .verify_credentials("maria@example.com", "secreta123")
                .await
                .is_ok(),
            "password must be untouched"
        );
    }

    #[tokio::test]
    async fn short_password_leaves_token_and_password_alone() {
        let (manager, usuarios) = setup().await;
        let user_id = register(&usuarios).await;
        let token = manager.issue_token(user_id).await.expect("Issue failed");

        let err = manager
            .consume(&token, "corta")
            .await
            .expect_err("Short password accepted");
        assert!(matches!(err, ApiError::Validation(_)));

        // Token still spendable, old password still valid
        assert!(usuarios
            .verify_credentials("maria@example.com", "secreta123")
            .await
            .is_ok());
        manager
            .consume(&token, "clave-valida")
            .await
            .expect("Token should remain consumable");
    }

    #[tokio::test]
    async fn sweep_removes_expired_and_used_but_keeps_valid() {
        let (manager, usuarios) = setup().await;
        let user_id = register(&usuarios).await;

        // Three tokens across distinct accounts: expired, spent, and live
        let expirado = manager.issue_token(100).await.expect("Issue failed");
        force_expiry(&manager, &expirado).await;

        let usado = manager.issue_token(user_id).await.expect("Issue failed");
        manager
            .consume(&usado, "clave-nueva")
            .await
            .expect("Consume failed");

        let vigente = manager.issue_token(200).await.expect("Issue failed");

        let removed = manager.sweep_expired().await.expect("Sweep failed");
        assert_eq!(removed, 2);

        assert_eq!(token_count(&manager, 100).await, 0);
        assert_eq!(token_count(&manager, user_id).await, 0);
        assert_eq!(token_count(&manager, 200).await, 1);

        // The survivor is still redeemable state-wise
        let restante: ResetToken = sqlx::query_as(
            "SELECT token, user_id, expires_at, used, created_at
             FROM restaurar_contrasenas WHERE token = ?1",
        )
        .bind(&vigente)
        .fetch_one(&manager.db)
        .await
        .expect("Fetch failed");
        assert!(!restante.used);
    }

    #[tokio::test]
    async fn sweep_on_empty_table_removes_nothing() {
        let (manager, _) = setup().await;
        assert_eq!(manager.sweep_expired().await.expect("Sweep failed"), 0);
    }
}
