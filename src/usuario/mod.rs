/// Account management
///
/// Registration, credential verification, listing, and deactivation for the
/// `usuarios` table.

mod manager;

pub use manager::UsuarioManager;

use serde::{Deserialize, Serialize};

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NuevoUsuario {
    pub email: String,
    pub password: String,
    pub nombre: String,
    pub apellido: String,
    /// Defaults to "bodega" when omitted
    pub rol: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUsuario {
    pub email: String,
    pub password: String,
}
