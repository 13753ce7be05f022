/// Session token signing and validation
use crate::config::AuthConfig;
use crate::error::{ApiError, ApiResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime of the access token, in hours
pub const ACCESS_TTL_HOURS: i64 = 24;
/// Lifetime of the refresh token, in hours (one week)
pub const REFRESH_TTL_HOURS: i64 = 168;

/// Claims embedded in every session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id_usuario: i64,
    pub email: String,
    pub rol: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Signs and validates session tokens
///
/// Tokens are HS256 over the configured secret. Validation pins the
/// algorithm, requires the configured issuer, and allows no expiry leeway:
/// cookie lifetimes already match token lifetimes, so a token that outlives
/// its cookie is stale by definition.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
}

impl TokenCodec {
    pub fn new(auth: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&auth.issuer]);

        Self {
            encoding_key: EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
            validation,
            issuer: auth.issuer.clone(),
        }
    }

    /// Sign a token for the given account with the given lifetime
    pub fn issue(
        &self,
        id_usuario: i64,
        email: &str,
        rol: &str,
        ttl_hours: i64,
    ) -> ApiResult<String> {
        let now = Utc::now();
        let claims = Claims {
            id_usuario,
            email: email.to_string(),
            rol: rol.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(ttl_hours)).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate a token and return its claims
    ///
    /// Rejects bad signatures, foreign issuers, headers naming any other
    /// algorithm, and expired tokens.
    pub fn validate(&self, token: &str) -> ApiResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("token validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        ApiError::Authentication("El token ha expirado".to_string())
                    }
                    _ => ApiError::Authentication("Token inválido".to_string()),
                }
            })
    }

    /// Issue a fresh access token from a still-valid refresh token
    ///
    /// The refresh token goes through full validation first; an expired or
    /// tampered refresh token mints nothing.
    pub fn refresh(&self, refresh_token: &str) -> ApiResult<String> {
        let claims = self.validate(refresh_token)?;
        self.issue(
            claims.id_usuario,
            &claims.email,
            &claims.rol,
            ACCESS_TTL_HOURS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn codec() -> TokenCodec {
        TokenCodec::new(&ServerConfig::for_tests().auth)
    }

    #[test]
    fn issue_and_validate_round_trip() {
        let codec = codec();
        let token = codec
            .issue(42, "maria@example.com", "bodega", ACCESS_TTL_HOURS)
            .expect("Failed to issue token");

        let claims = codec.validate(&token).expect("Failed to validate token");
        assert_eq!(claims.id_usuario, 42);
        assert_eq!(claims.email, "maria@example.com");
        assert_eq!(claims.rol, "bodega");
        assert_eq!(claims.iss, "bodega-api");
        assert_eq!(claims.exp - claims.iat, ACCESS_TTL_HOURS * 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let token = codec
            .issue(1, "a@example.com", "bodega", -1)
            .expect("Failed to issue token");

        let err = codec.validate(&token).expect_err("Expired token accepted");
        match err {
            ApiError::Authentication(msg) => assert_eq!(msg, "El token ha expirado"),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let codec = codec();

        let mut other_config = ServerConfig::for_tests();
        other_config.auth.jwt_secret = "otra-clave-distinta-pero-igual-de-larga-9876".to_string();
        let other = TokenCodec::new(&other_config.auth);

        let token = other
            .issue(1, "a@example.com", "bodega", ACCESS_TTL_HOURS)
            .expect("Failed to issue token");
        assert!(codec.validate(&token).is_err());
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let codec = codec();

        let mut other_config = ServerConfig::for_tests();
        other_config.auth.issuer = "otra-api".to_string();
        let other = TokenCodec::new(&other_config.auth);

        let token = other
            .issue(1, "a@example.com", "bodega", ACCESS_TTL_HOURS)
            .expect("Failed to issue token");
        assert!(codec.validate(&token).is_err());
    }

    #[test]
    fn non_hs256_header_is_rejected() {
        let config = ServerConfig::for_tests();
        let codec = TokenCodec::new(&config.auth);

        let now = Utc::now();
        let claims = Claims {
            id_usuario: 1,
            email: "a@example.com".to_string(),
            rol: "bodega".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
            iss: "bodega-api".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(config.auth.jwt_secret.as_bytes()),
        )
        .expect("Failed to encode token");

        assert!(codec.validate(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(codec().validate("no-es-un-jwt").is_err());
    }

    #[test]
    fn refresh_mints_new_access_token() {
        let codec = codec();
        let refresh_token = codec
            .issue(7, "b@example.com", "admin", REFRESH_TTL_HOURS)
            .expect("Failed to issue token");

        let access = codec
            .refresh(&refresh_token)
            .expect("Failed to refresh session");
        let claims = codec.validate(&access).expect("Failed to validate token");
        assert_eq!(claims.id_usuario, 7);
        assert_eq!(claims.rol, "admin");
        assert_eq!(claims.exp - claims.iat, ACCESS_TTL_HOURS * 3600);
    }

    #[test]
    fn refresh_of_expired_token_is_rejected() {
        let codec = codec();
        let stale = codec
            .issue(7, "b@example.com", "bodega", -1)
            .expect("Failed to issue token");
        assert!(codec.refresh(&stale).is_err());
    }
}
