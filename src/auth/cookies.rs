/// Session cookie pair
///
/// The frontend never sees raw tokens; both travel in HttpOnly cookies.
/// SameSite=Lax keeps them on top-level navigations while blocking
/// cross-site subrequests, and Secure is only added when configured so
/// plain-HTTP local development keeps working.
use crate::auth::token::{ACCESS_TTL_HOURS, REFRESH_TTL_HOURS};
use crate::error::{ApiError, ApiResult};
use axum::http::{header, HeaderMap, HeaderValue};

/// Cookie carrying the access token
pub const ACCESS_COOKIE: &str = "auth_token";
/// Cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Build a session cookie string with the standard attributes
pub fn session_cookie(name: &str, value: &str, ttl_hours: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        name,
        value,
        ttl_hours * 3600
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build a cookie that clears `name` on the client (empty value, Max-Age=0)
pub fn expired_cookie(name: &str, secure: bool) -> String {
    session_cookie(name, "", 0, secure)
}

/// Append both session cookies to response headers
pub fn apply_session_cookies(
    headers: &mut HeaderMap,
    access: &str,
    refresh: &str,
    secure: bool,
) -> ApiResult<()> {
    append_cookie(
        headers,
        &session_cookie(ACCESS_COOKIE, access, ACCESS_TTL_HOURS, secure),
    )?;
    append_cookie(
        headers,
        &session_cookie(REFRESH_COOKIE, refresh, REFRESH_TTL_HOURS, secure),
    )?;
    Ok(())
}

/// Append a fresh access cookie only, leaving the refresh cookie untouched
pub fn apply_access_cookie(headers: &mut HeaderMap, access: &str, secure: bool) -> ApiResult<()> {
    append_cookie(
        headers,
        &session_cookie(ACCESS_COOKIE, access, ACCESS_TTL_HOURS, secure),
    )
}

/// Append cookies clearing the whole session
pub fn clear_session_cookies(headers: &mut HeaderMap, secure: bool) -> ApiResult<()> {
    append_cookie(headers, &expired_cookie(ACCESS_COOKIE, secure))?;
    append_cookie(headers, &expired_cookie(REFRESH_COOKIE, secure))?;
    Ok(())
}

fn append_cookie(headers: &mut HeaderMap, cookie: &str) -> ApiResult<()> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| ApiError::Internal(format!("Invalid cookie value: {}", e)))?;
    headers.append(header::SET_COOKIE, value);
    Ok(())
}
