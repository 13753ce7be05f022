/// Winery registry
///
/// Creation, lookup, and listing for the `bodegas` table.

mod manager;

pub use manager::BodegaManager;

use serde::{Deserialize, Serialize};

/// Winery creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NuevaBodega {
    pub nombre: String,
    pub cuit: String,
    pub provincia: String,
    pub departamento: Option<String>,
}
