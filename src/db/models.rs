/// Persisted row types shared across managers
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Registered account, as stored in `usuarios`
///
/// Carries the bcrypt hash, so it never goes on the wire directly; responses
/// use [`UsuarioPublico`].
#[derive(Debug, Clone, FromRow)]
pub struct Usuario {
    pub id_usuario: i64,
    pub email: String,
    /// bcrypt hash of the account password
    pub password: String,
    pub nombre: String,
    pub apellido: String,
    pub rol: String,
    pub activo: bool,
    pub fecha_registro: DateTime<Utc>,
}

/// Public projection of a [`Usuario`], safe to serialize in responses
///
/// The id key is camelCase for historical reasons; the remaining keys stay
/// snake_case because the frontend reads them that way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsuarioPublico {
    #[serde(rename = "idUsuario")]
    pub id_usuario: i64,
    pub email: String,
    pub nombre: String,
    pub apellido: String,
    pub rol: String,
    pub activo: bool,
    pub fecha_registro: DateTime<Utc>,
}

impl Usuario {
    /// Strip credentials for responses
    pub fn to_public(&self) -> UsuarioPublico {
        UsuarioPublico {
            id_usuario: self.id_usuario,
            email: self.email.clone(),
            nombre: self.nombre.clone(),
            apellido: self.apellido.clone(),
            rol: self.rol.clone(),
            activo: self.activo,
            fecha_registro: self.fecha_registro,
        }
    }
}

/// Winery registry record, as stored in `bodegas`
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Bodega {
    #[serde(rename = "idBodega")]
    pub id_bodega: i64,
    pub nombre: String,
    pub cuit: String,
    pub provincia: String,
    pub departamento: Option<String>,
    pub activa: bool,
    pub fecha_alta: DateTime<Utc>,
}

/// Password reset token, as stored in `restaurar_contrasenas`
#[derive(Debug, Clone, FromRow)]
pub struct ResetToken {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}
