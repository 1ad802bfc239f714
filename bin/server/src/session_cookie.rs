//! The session cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cloudgate_core::SessionId;

use crate::config::SessionConfig;

/// Reads the session id from the request cookies. Malformed ids are
/// treated as absent.
#[must_use]
pub fn session_id(jar: &CookieJar, config: &SessionConfig) -> Option<SessionId> {
    jar.get(&config.cookie_name)
        .and_then(|cookie| cookie.value().parse().ok())
}

/// Builds the cookie that carries `id`.
#[must_use]
pub fn build(id: SessionId, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), id.to_string()))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .build()
}
