/// Application context and dependency injection
use crate::{
    auth::TokenCodec,
    bodega::BodegaManager,
    config::ServerConfig,
    db,
    error::ApiResult,
    mailer::Mailer,
    recovery::PasswordResetManager,
    usuario::UsuarioManager,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub tokens: TokenCodec,
    pub usuarios: Arc<UsuarioManager>,
    pub bodegas: Arc<BodegaManager>,
    pub recovery: Arc<PasswordResetManager>,
    pub mailer: Arc<Mailer>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        // Validate configuration
        config.validate()?;

        // Initialize database
        let options = db::DatabaseOptions {
            max_connections: config.database.max_connections,
            ..Default::default()
        };
        let pool = db::create_pool(&config.database.path, options).await?;

        // Run migrations and verify the connection
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let config = Arc::new(config);

        // Initialize the token codec and managers
        let tokens = TokenCodec::new(&config.auth);
        let usuarios = Arc::new(UsuarioManager::new(pool.clone(), Arc::clone(&config)));
        let bodegas = Arc::new(BodegaManager::new(pool.clone()));
        let recovery = Arc::new(PasswordResetManager::new(pool.clone(), Arc::clone(&config)));

        // Initialize mailer
        let mailer = Arc::new(Mailer::new(config.email.clone())?);
        if !mailer.is_configured() {
            tracing::warn!("SMTP not configured; password recovery emails will fail");
        }

        Ok(Self {
            config,
            db: pool,
            tokens,
            usuarios,
            bodegas,
            recovery,
            mailer,
        })
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
