/// Authentication extractors
///
/// `AuthUser` gates a handler on a valid access-token cookie and rejects with
/// 401 otherwise. `MaybeAuthUser` attaches claims when a valid cookie arrived
/// but never rejects; anonymous requests simply carry `None`.
use crate::auth::cookies::ACCESS_COOKIE;
use crate::auth::token::Claims;
use crate::context::AppContext;
use crate::error::ApiError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;

/// Authenticated session claims, extracted from the access cookie
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppContext> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(ACCESS_COOKIE).map(|c| c.value().to_string()).ok_or_else(|| {
            ApiError::Authentication("No autorizado: token no encontrado".to_string())
        })?;

        let claims = state.tokens.validate(&token)?;
        Ok(AuthUser(claims))
    }
}

/// Optional session claims, `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Claims>);

#[async_trait]
impl FromRequestParts<AppContext> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let claims = jar
            .get(ACCESS_COOKIE)
            .and_then(|c| state.tokens.validate(c.value()).ok());
        Ok(MaybeAuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::ACCESS_TTL_HOURS;
    use crate::config::ServerConfig;
    use axum::http::{header, Request};

    async fn test_context() -> AppContext {
        AppContext::new(ServerConfig::for_tests())
            .await
            .expect("Failed to build context")
    }

    fn parts_with_cookie(cookie: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/api/usuarios/me");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let (parts, _) = builder.body(()).expect("Failed to build request").into_parts();
        parts
    }

    #[tokio::test]
    async fn valid_cookie_yields_claims() {
        let ctx = test_context().await;
        let token = ctx
            .tokens
            .issue(5, "ana@example.com", "bodega", ACCESS_TTL_HOURS)
            .expect("Failed to issue token");
        let mut parts = parts_with_cookie(Some(format!("auth_token={}", token)));

        let AuthUser(claims) = AuthUser::from_request_parts(&mut parts, &ctx)
            .await
            .expect("Extractor rejected a valid session");
        assert_eq!(claims.id_usuario, 5);
        assert_eq!(claims.email, "ana@example.com");
    }

    #[tokio::test]
    async fn missing_cookie_is_rejected() {
        let ctx = test_context().await;
        let mut parts = parts_with_cookie(None);

        let err = AuthUser::from_request_parts(&mut parts, &ctx)
            .await
            .expect_err("Extractor accepted an anonymous request");
        assert!(matches!(err, ApiError::Authentication(_)));
    }

    #[tokio::test]
    async fn optional_extractor_never_rejects() {
        let ctx = test_context().await;

        let mut parts = parts_with_cookie(None);
        let MaybeAuthUser(claims) = MaybeAuthUser::from_request_parts(&mut parts, &ctx)
            .await
            .expect("Optional extractor rejected");
        assert!(claims.is_none());

        let mut parts = parts_with_cookie(Some("auth_token=basura".to_string()));
        let MaybeAuthUser(claims) = MaybeAuthUser::from_request_parts(&mut parts, &ctx)
            .await
            .expect("Optional extractor rejected");
        assert!(claims.is_none(), "garbage token must read as anonymous");
    }
}
