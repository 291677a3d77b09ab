//! Credential issuance: validates the submitted password against the
//! configured secret and mints the session cookie. The cookie carries the
//! shared secret itself; the guard re-checks it on every admin request.

use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;
use serde::Deserialize;

use crate::web::{
    AppState,
    guard::{SESSION_COOKIE, secret_matches},
    responses::{Ack, ApiError, json_error},
};

/// Session lifetime, thirty minutes.
pub const SESSION_MAX_AGE_SECS: i64 = 30 * 60;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<LoginRequest>>,
) -> Result<(CookieJar, Json<Ack>), (StatusCode, Json<ApiError>)> {
    let password = body
        .and_then(|Json(request)| request.password)
        .unwrap_or_default();
    if password.is_empty() {
        return Err(json_error(StatusCode::BAD_REQUEST, "Password required"));
    }

    let expected = state.config().admin_token.trim().to_string();
    if expected.is_empty() || password != expected {
        return Err(json_error(StatusCode::UNAUTHORIZED, "Unauthorized"));
    }

    let jar = jar.add(session_cookie(&expected, state.config().production));
    Ok((jar, Json(Ack::ok())))
}

/// Read-only re-validation of the existing cookie; used by the admin pages to
/// decide whether to render or bounce to login.
pub async fn check(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Ack>, (StatusCode, Json<ApiError>)> {
    let cookie = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    if secret_matches(cookie.as_deref(), &state.config().admin_token) {
        Ok(Json(Ack::ok()))
    } else {
        Err(json_error(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Ack>) {
    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    removal.set_http_only(true);
    removal.set_same_site(SameSite::Lax);
    removal.set_max_age(CookieDuration::seconds(0));
    (jar.remove(removal), Json(Ack::ok()))
}

fn session_cookie(value: &str, production: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(production);
    cookie.set_max_age(CookieDuration::seconds(SESSION_MAX_AGE_SECS));
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_carries_required_attributes() {
        let cookie = session_cookie("secret1", false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "secret1");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(
            cookie.max_age(),
            Some(CookieDuration::seconds(SESSION_MAX_AGE_SECS))
        );
    }

    #[test]
    fn session_cookie_is_secure_in_production() {
        let cookie = session_cookie("secret1", true);
        assert_eq!(cookie.secure(), Some(true));
    }
}
