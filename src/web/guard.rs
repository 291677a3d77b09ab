//! Admin session guard. Every request passes through here; admin-prefixed
//! paths must carry the shared-secret cookie, with an optional HTTP Basic
//! gate in front of the cookie check.

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{
    config::BasicAuthPair,
    web::{AppState, responses::ApiError},
};

pub const SESSION_COOKIE: &str = "admin_token";

pub const ADMIN_BASE: &str = "/admin";
pub const ADMIN_API_BASE: &str = "/api/admin";
pub const AUTH_API_BASE: &str = "/api/admin/auth";
pub const LOGIN_PAGE: &str = "/admin/login";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathClass {
    /// Login/check/logout API. Must stay reachable or nobody could ever
    /// establish a session.
    AuthEndpoint,
    Unprotected,
    /// `/admin/login` renders for anonymous users.
    LoginPage,
    ProtectedApi,
    ProtectedPage,
}

/// Classification is evaluated in a fixed order: the auth endpoints live
/// under the protected prefix and take precedence, then non-admin paths,
/// then the login page, and only then the credential check.
pub fn classify_path(path: &str) -> PathClass {
    if path.starts_with(AUTH_API_BASE) {
        return PathClass::AuthEndpoint;
    }
    if !path.starts_with(ADMIN_BASE) && !path.starts_with(ADMIN_API_BASE) {
        return PathClass::Unprotected;
    }
    if path == LOGIN_PAGE {
        return PathClass::LoginPage;
    }
    if path.starts_with(ADMIN_API_BASE) {
        return PathClass::ProtectedApi;
    }
    PathClass::ProtectedPage
}

/// Trimmed exact comparison. An empty or unset secret never matches anything,
/// including an empty cookie, so a misconfigured deployment stays closed.
pub fn secret_matches(cookie: Option<&str>, secret: &str) -> bool {
    let expected = secret.trim();
    if expected.is_empty() {
        return false;
    }
    cookie.map(str::trim) == Some(expected)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardVerdict {
    Allow,
    /// 401 with a JSON body.
    DenyApi,
    /// Redirect to the login page, carrying the originally requested path.
    DenyPage { login: String },
}

pub fn login_redirect(path: &str) -> String {
    format!("{LOGIN_PAGE}?redirect={path}")
}

pub fn evaluate(path: &str, cookie: Option<&str>, secret: &str) -> GuardVerdict {
    match classify_path(path) {
        PathClass::AuthEndpoint | PathClass::Unprotected | PathClass::LoginPage => {
            GuardVerdict::Allow
        }
        PathClass::ProtectedApi => {
            if secret_matches(cookie, secret) {
                GuardVerdict::Allow
            } else {
                GuardVerdict::DenyApi
            }
        }
        PathClass::ProtectedPage => {
            if secret_matches(cookie, secret) {
                GuardVerdict::Allow
            } else {
                GuardVerdict::DenyPage {
                    login: login_redirect(path),
                }
            }
        }
    }
}

/// Validates an `Authorization: Basic …` header against the configured pair.
/// Absent or malformed headers are authentication failures, not errors.
pub fn basic_auth_ok(header_value: Option<&str>, pair: &BasicAuthPair) -> bool {
    let Some(value) = header_value else {
        return false;
    };
    let Some(encoded) = value.strip_prefix("Basic ") else {
        return false;
    };
    let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
        return false;
    };
    let Ok(text) = String::from_utf8(decoded) else {
        return false;
    };
    match text.split_once(':') {
        Some((user, pass)) => user == pair.username && pass == pair.password,
        None => false,
    }
}

pub async fn admin_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let class = classify_path(&path);

    // Stricter mode: a second, independent credential pair fronts everything
    // under the admin prefixes except the auth endpoints themselves.
    if let Some(pair) = &state.config().basic_auth {
        if matches!(
            class,
            PathClass::LoginPage | PathClass::ProtectedApi | PathClass::ProtectedPage
        ) {
            let authorization = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());
            if !basic_auth_ok(authorization, pair) {
                return basic_challenge();
            }
        }
    }

    let cookie = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    match evaluate(&path, cookie.as_deref(), &state.config().admin_token) {
        GuardVerdict::Allow => next.run(req).await,
        GuardVerdict::DenyApi => (
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new("Unauthorized")),
        )
            .into_response(),
        GuardVerdict::DenyPage { login } => Redirect::to(&login).into_response(),
    }
}

fn basic_challenge() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, r#"Basic realm="admin""#)],
        Json(ApiError::new("Unauthorized")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_endpoints_classify_first() {
        assert_eq!(classify_path("/api/admin/auth"), PathClass::AuthEndpoint);
        assert_eq!(
            classify_path("/api/admin/auth/check"),
            PathClass::AuthEndpoint
        );
    }

    #[test]
    fn classification_covers_all_surfaces() {
        assert_eq!(classify_path("/publications"), PathClass::Unprotected);
        assert_eq!(classify_path("/"), PathClass::Unprotected);
        assert_eq!(classify_path("/admin/login"), PathClass::LoginPage);
        assert_eq!(
            classify_path("/api/admin/publications"),
            PathClass::ProtectedApi
        );
        assert_eq!(classify_path("/admin/publications"), PathClass::ProtectedPage);
    }

    #[test]
    fn auth_endpoint_allowed_without_any_cookie() {
        assert_eq!(evaluate("/api/admin/auth", None, "secret1"), GuardVerdict::Allow);
        assert_eq!(evaluate("/api/admin/auth", None, ""), GuardVerdict::Allow);
    }

    #[test]
    fn empty_secret_denies_everything() {
        assert!(!secret_matches(Some(""), ""));
        assert!(!secret_matches(Some("anything"), ""));
        assert!(!secret_matches(None, "   "));
        assert_eq!(
            evaluate("/api/admin/publications", Some(""), ""),
            GuardVerdict::DenyApi
        );
    }

    #[test]
    fn matching_cookie_passes_after_trimming() {
        assert!(secret_matches(Some("secret1"), "secret1"));
        assert!(secret_matches(Some("  secret1  "), "secret1"));
        assert!(secret_matches(Some("secret1"), " secret1 "));
        assert!(!secret_matches(Some("wrong"), "secret1"));
        assert_eq!(
            evaluate("/admin/publications", Some("secret1"), "secret1"),
            GuardVerdict::Allow
        );
    }

    #[test]
    fn wrong_cookie_on_page_redirects_with_original_path() {
        assert_eq!(
            evaluate("/admin/publications", Some("wrong"), "secret1"),
            GuardVerdict::DenyPage {
                login: "/admin/login?redirect=/admin/publications".to_string()
            }
        );
    }

    #[test]
    fn wrong_cookie_on_api_denies_with_json() {
        assert_eq!(
            evaluate("/api/admin/publications", Some("wrong"), "secret1"),
            GuardVerdict::DenyApi
        );
    }

    fn pair() -> BasicAuthPair {
        BasicAuthPair {
            username: "ops".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn basic_auth_accepts_valid_header() {
        // base64("ops:hunter2")
        assert!(basic_auth_ok(Some("Basic b3BzOmh1bnRlcjI="), &pair()));
    }

    #[test]
    fn basic_auth_rejects_absent_or_malformed_headers() {
        assert!(!basic_auth_ok(None, &pair()));
        assert!(!basic_auth_ok(Some("Bearer token"), &pair()));
        assert!(!basic_auth_ok(Some("Basic %%%"), &pair()));
        assert!(!basic_auth_ok(Some("Basic b3BzaHVudGVyMg=="), &pair())); // no colon
        assert!(!basic_auth_ok(Some("Basic d3Jvbmc6d3Jvbmc="), &pair())); // wrong pair
    }
}
