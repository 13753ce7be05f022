/// Account manager implementation using runtime queries
use crate::{
    config::ServerConfig,
    db::models::Usuario,
    error::{ApiError, ApiResult},
    usuario::NuevoUsuario,
};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Default role assigned to self-registered accounts
const ROL_POR_DEFECTO: &str = "bodega";

/// Account manager service
pub struct UsuarioManager {
    db: SqlitePool,
    config: Arc<ServerConfig>,
}

impl UsuarioManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool, config: Arc<ServerConfig>) -> Self {
        Self { db, config }
    }

    /// Register a new account
    pub async fn register(&self, solicitud: NuevoUsuario) -> ApiResult<Usuario> {
        self.validate_registration(&solicitud)?;

        if self.email_exists(&solicitud.email).await? {
            return Err(ApiError::Validation(
                "El email ya está registrado".to_string(),
            ));
        }

        let password_hash = bcrypt::hash(&solicitud.password, self.config.auth.bcrypt_cost)
            .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;

        let rol = solicitud
            .rol
            .clone()
            .unwrap_or_else(|| ROL_POR_DEFECTO.to_string());
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO usuarios (email, password, nombre, apellido, rol, activo, fecha_registro)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&solicitud.email)
        .bind(&password_hash)
        .bind(&solicitud.nombre)
        .bind(&solicitud.apellido)
        .bind(&rol)
        .bind(true)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        let id_usuario = result.last_insert_rowid();
        tracing::info!("registered usuario {} ({})", id_usuario, solicitud.email);

        Ok(Usuario {
            id_usuario,
            email: solicitud.email,
            password: password_hash,
            nombre: solicitud.nombre,
            apellido: solicitud.apellido,
            rol,
            activo: true,
            fecha_registro: now,
        })
    }

    /// Authenticate an account by email and password
    ///
    /// Unknown email, wrong password, and deactivated accounts all collapse
    /// into the same message so callers cannot probe which emails exist.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> ApiResult<Usuario> {
        let usuario = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::Authentication("Credenciales inválidas".to_string()))?;

        if !usuario.activo {
            return Err(ApiError::Authentication("Credenciales inválidas".to_string()));
        }

        let valido = bcrypt::verify(password, &usuario.password)
            .map_err(|e| ApiError::Internal(format!("Password verification failed: {}", e)))?;
        if !valido {
            return Err(ApiError::Authentication("Credenciales inválidas".to_string()));
        }

        Ok(usuario)
    }

    /// Look up an account by email
    pub async fn find_by_email(&self, email: &str) -> ApiResult<Option<Usuario>> {
        let usuario = sqlx::query_as::<_, Usuario>(
            "SELECT id_usuario, email, password, nombre, apellido, rol, activo, fecha_registro
             FROM usuarios WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(usuario)
    }

    /// Get an account by id
    pub async fn get_by_id(&self, id_usuario: i64) -> ApiResult<Usuario> {
        sqlx::query_as::<_, Usuario>(
            "SELECT id_usuario, email, password, nombre, apellido, rol, activo, fecha_registro
             FROM usuarios WHERE id_usuario = ?1",
        )
        .bind(id_usuario)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("Usuario no encontrado".to_string()))
    }

    /// List every account, oldest first
    pub async fn list(&self) -> ApiResult<Vec<Usuario>> {
        let usuarios = sqlx::query_as::<_, Usuario>(
            "SELECT id_usuario, email, password, nombre, apellido, rol, activo, fecha_registro
             FROM usuarios ORDER BY id_usuario",
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(usuarios)
    }

    /// Deactivate an account
    ///
    /// The row stays in place; a deactivated account keeps its data but can
    /// no longer log in.
    pub async fn deactivate(&self, id_usuario: i64) -> ApiResult<()> {
        let result = sqlx::query("UPDATE usuarios SET activo = 0 WHERE id_usuario = ?1")
            .bind(id_usuario)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Usuario no encontrado".to_string()));
        }

        tracing::info!("deactivated usuario {}", id_usuario);
        Ok(())
    }

    fn validate_registration(&self, solicitud: &NuevoUsuario) -> ApiResult<()> {
        if !solicitud.email.contains('@') {
            return Err(ApiError::Validation("El email no es válido".to_string()));
        }

        if solicitud.password.chars().count() < 6 {
            return Err(ApiError::Validation(
                "La contraseña debe tener al menos 6 caracteres".to_string(),
            ));
        }

        if solicitud.nombre.trim().is_empty() {
            return Err(ApiError::Validation("El nombre es obligatorio".to_string()));
        }

        if solicitud.apellido.trim().is_empty() {
            return Err(ApiError::Validation("El apellido es obligatorio".to_string()));
        }

        Ok(())
    }

    async fn email_exists(&self, email: &str) -> ApiResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios WHERE email = ?1")
            .bind(email)
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(count > 0)
    }
}
