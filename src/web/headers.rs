//! Security headers attached to every response, regardless of route or auth
//! outcome, plus the per-request CSP nonce used by inline script/style tags.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand_core::{OsRng, RngCore};

use crate::web::AppState;

/// Per-request nonce, inserted into request extensions so page renderers can
/// mark their inline tags.
#[derive(Clone, Debug)]
pub struct CspNonce(pub String);

pub fn issue_nonce() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Script, style and connect origins are restricted to the site itself; the
/// nonce selectively re-admits inline tags without `unsafe-inline`, and an
/// externally configured data origin may extend `connect-src`.
pub fn content_security_policy(nonce: &str, trusted_data_origin: Option<&str>) -> String {
    let connect = match trusted_data_origin {
        Some(origin) => format!("'self' {origin}"),
        None => "'self'".to_string(),
    };
    format!(
        "default-src 'self'; script-src 'self' 'nonce-{nonce}'; style-src 'self' 'nonce-{nonce}'; img-src 'self' data:; connect-src {connect}; frame-ancestors 'self'"
    )
}

pub async fn security_headers(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let nonce = issue_nonce();
    req.extensions_mut().insert(CspNonce(nonce.clone()));

    let mut response = next.run(req).await;

    let csp = content_security_policy(&nonce, state.config().trusted_data_origin.as_deref());
    let headers = response.headers_mut();
    headers.insert(
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static("SAMEORIGIN"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
    );
    if let Ok(value) = HeaderValue::from_str(&csp) {
        headers.insert(header::CONTENT_SECURITY_POLICY, value);
    }
    if let Ok(value) = HeaderValue::from_str(&nonce) {
        headers.insert(HeaderName::from_static("x-csp-nonce"), value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_embeds_nonce_in_script_and_style() {
        let policy = content_security_policy("abc123", None);
        assert!(policy.contains("script-src 'self' 'nonce-abc123'"));
        assert!(policy.contains("style-src 'self' 'nonce-abc123'"));
        assert!(policy.contains("connect-src 'self';"));
    }

    #[test]
    fn policy_extends_connect_src_with_trusted_origin() {
        let policy = content_security_policy("n", Some("https://data.example.org"));
        assert!(policy.contains("connect-src 'self' https://data.example.org"));
    }

    #[test]
    fn nonces_are_fresh_per_request() {
        assert_ne!(issue_nonce(), issue_nonce());
    }
}
