/// Configuration management for the bodega API
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Development fallback used when no JWT secret is configured. Long enough to
/// pass validation, but every deployment must override it.
const DEV_JWT_SECRET: &str = "tu-secret-key-super-segura-cambiar-en-produccion";

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub email: Option<EmailConfig>,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Base URL of the frontend, used to build password reset links
    pub frontend_url: String,
    pub version: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Issuer claim stamped into every token and required on validation
    pub issuer: String,
    pub bcrypt_cost: u32,
    /// Mark session cookies Secure (HTTPS-only deployments)
    pub cookie_secure: bool,
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from_address: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("BODEGA_HOSTNAME").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ApiError::Validation("Invalid port number".to_string()))?;
        let frontend_url = env::var("BODEGA_FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let version =
            env::var("BODEGA_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

        let database_path: PathBuf = env::var("BODEGA_DATABASE_PATH")
            .unwrap_or_else(|_| "./data/bodega.sqlite".to_string())
            .into();
        let max_connections = env::var("BODEGA_DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let jwt_secret = match env::var("BODEGA_JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                tracing::warn!(
                    "BODEGA_JWT_SECRET not set, falling back to the built-in development secret"
                );
                DEV_JWT_SECRET.to_string()
            }
        };
        let issuer = env::var("BODEGA_JWT_ISSUER").unwrap_or_else(|_| "bodega-api".to_string());
        let bcrypt_cost = env::var("BODEGA_BCRYPT_COST")
            .unwrap_or_else(|_| bcrypt::DEFAULT_COST.to_string())
            .parse()
            .unwrap_or(bcrypt::DEFAULT_COST);
        let cookie_secure = env::var("BODEGA_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        let email = if let Ok(smtp_url) = env::var("BODEGA_SMTP_URL") {
            Some(EmailConfig {
                smtp_url,
                from_address: env::var("BODEGA_EMAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| format!("noreply@{}", hostname)),
            })
        } else {
            None
        };

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                frontend_url,
                version,
            },
            database: DatabaseConfig {
                path: database_path,
                max_connections,
            },
            auth: AuthConfig {
                jwt_secret,
                issuer,
                bcrypt_cost,
                cookie_secure,
            },
            email,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ApiError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.service.port == 0 {
            return Err(ApiError::Validation(
                "Port number cannot be zero".to_string(),
            ));
        }

        if self.auth.jwt_secret.len() < 32 {
            return Err(ApiError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(ApiError::Validation(
                "bcrypt cost must be between 4 and 31".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
impl ServerConfig {
    /// In-memory configuration for unit tests. The bcrypt cost is the lowest
    /// legal value so hashing does not dominate test time.
    pub(crate) fn for_tests() -> Self {
        ServerConfig {
            service: ServiceConfig {
                hostname: "127.0.0.1".to_string(),
                port: 8080,
                frontend_url: "http://localhost:3000".to_string(),
                version: "0.0.0-test".to_string(),
            },
            database: DatabaseConfig {
                path: PathBuf::from(":memory:"),
                max_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: "clave-de-pruebas-suficientemente-larga-123456".to_string(),
                issuer: "bodega-api".to_string(),
                bcrypt_cost: 4,
                cookie_secure: false,
            },
            email: None,
        }
    }
}
