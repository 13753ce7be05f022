/// Winery manager implementation using runtime queries
use crate::{
    bodega::NuevaBodega,
    db::models::Bodega,
    error::{ApiError, ApiResult},
};
use chrono::Utc;
use sqlx::SqlitePool;

/// Winery manager service
pub struct BodegaManager {
    db: SqlitePool,
}

impl BodegaManager {
    /// Create a new winery manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Register a new winery
    pub async fn create(&self, solicitud: NuevaBodega) -> ApiResult<Bodega> {
        self.validate(&solicitud)?;

        if self.cuit_exists(&solicitud.cuit).await? {
            return Err(ApiError::Validation(
                "El CUIT ya está registrado".to_string(),
            ));
        }

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO bodegas (nombre, cuit, provincia, departamento, activa, fecha_alta)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&solicitud.nombre)
        .bind(&solicitud.cuit)
        .bind(&solicitud.provincia)
        .bind(&solicitud.departamento)
        .bind(true)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        let id_bodega = result.last_insert_rowid();
        tracing::info!("registered bodega {} ({})", id_bodega, solicitud.cuit);

        Ok(Bodega {
            id_bodega,
            nombre: solicitud.nombre,
            cuit: solicitud.cuit,
            provincia: solicitud.provincia,
            departamento: solicitud.departamento,
            activa: true,
            fecha_alta: now,
        })
    }

    /// List wineries, oldest first
    ///
    /// Anonymous callers only see active records; authenticated callers get
    /// everything.
    pub async fn list(&self, include_inactive: bool) -> ApiResult<Vec<Bodega>> {
        let query = if include_inactive {
            "SELECT id_bodega, nombre, cuit, provincia, departamento, activa, fecha_alta
             FROM bodegas ORDER BY id_bodega"
        } else {
            "SELECT id_bodega, nombre, cuit, provincia, departamento, activa, fecha_alta
             FROM bodegas WHERE activa = 1 ORDER BY id_bodega"
        };

        let bodegas = sqlx::query_as::<_, Bodega>(query)
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(bodegas)
    }

    /// Get a winery by id
    pub async fn get_by_id(&self, id_bodega: i64) -> ApiResult<Bodega> {
        sqlx::query_as::<_, Bodega>(
            "SELECT id_bodega, nombre, cuit, provincia, departamento, activa, fecha_alta
             FROM bodegas WHERE id_bodega = ?1",
        )
        .bind(id_bodega)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("Bodega no encontrada".to_string()))
    }

    fn validate(&self, solicitud: &NuevaBodega) -> ApiResult<()> {
        if solicitud.nombre.trim().is_empty() {
            return Err(ApiError::Validation("El nombre es obligatorio".to_string()));
        }

        if solicitud.cuit.trim().is_empty() {
            return Err(ApiError::Validation("El CUIT es obligatorio".to_string()));
        }

        if solicitud.provincia.trim().is_empty() {
            return Err(ApiError::Validation(
                "La provincia es obligatoria".to_string(),
            ));
        }

        Ok(())
    }

    async fn cuit_exists(&self, cuit: &str) -> ApiResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bodegas WHERE cuit = ?1")
            .bind(cuit)
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(count > 0)
    }
}
