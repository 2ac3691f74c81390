//! Anti-forgery middleware for Axum
//!
//! Keeps a per-client secret in a cookie, hands handlers a [`CsrfToken`]
//! to embed in forms, and rejects unsafe requests whose token does not
//! match the secret.

use axum::{
    body::{self, Body},
    extract::{FromRequest, State},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::infrastructure::crypto::csrf::{
    generate_csrf_secret, generate_csrf_token, is_valid_secret, verify_csrf_token,
};

/// Header accepted as an alternative to the form field.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Largest form body buffered for token extraction.
const MAX_FORM_BYTES: usize = 64 * 1024;

/// Cookie settings for the anti-forgery secret
#[derive(Clone, Debug)]
pub struct CsrfConfig {
    pub cookie_name: String,
    pub secure: bool,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: "_csrf".to_string(),
            secure: false,
        }
    }
}

/// Issues tokens for the current client. Inserted into request extensions.
///
/// Extract in handlers: `Extension(csrf): Extension<CsrfToken>`
#[derive(Clone)]
pub struct CsrfToken {
    secret: String,
}

impl CsrfToken {
    /// A fresh token; call once per rendered form.
    pub fn issue(&self) -> String {
        generate_csrf_token(&self.secret)
    }
}

#[derive(Deserialize)]
struct CsrfField {
    #[serde(rename = "_csrf")]
    csrf: Option<String>,
}

/// Anti-forgery error types
#[derive(Debug)]
pub enum CsrfError {
    MissingToken,
    InvalidToken,
    BodyTooLarge,
}

impl IntoResponse for CsrfError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            CsrfError::MissingToken => (StatusCode::FORBIDDEN, "Missing CSRF token"),
            CsrfError::InvalidToken => (StatusCode::FORBIDDEN, "Invalid CSRF token"),
            CsrfError::BodyTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large"),
        };
        (status, message).into_response()
    }
}

fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// Pull the submitted token from the header or the form body. The body is
/// buffered and put back so the handler can still extract it.
async fn submitted_token(
    request: Request<Body>,
) -> Result<(Request<Body>, Option<String>), CsrfError> {
    if let Some(token) = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        let token = token.to_string();
        return Ok((request, Some(token)));
    }

    if !is_form(request.headers()) {
        return Ok((request, None));
    }

    let (parts, body) = request.into_parts();
    let bytes = body::to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|_| CsrfError::BodyTooLarge)?;

    let probe = Request::builder()
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(bytes.clone()))
        .map_err(|_| CsrfError::InvalidToken)?;
    let token = Form::<CsrfField>::from_request(probe, &())
        .await
        .ok()
        .and_then(|Form(field)| field.csrf);

    Ok((Request::from_parts(parts, Body::from(bytes)), token))
}

fn secret_cookie(config: &CsrfConfig, secret: &str) -> Option<HeaderValue> {
    let secure = if config.secure { "; Secure" } else { "" };
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict{}",
        config.cookie_name, secret, secure
    );
    HeaderValue::from_str(&cookie).ok()
}

/// Anti-forgery middleware
pub async fn csrf_middleware(
    State(config): State<CsrfConfig>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let existing =
        cookie_value(request.headers(), &config.cookie_name).filter(|s| is_valid_secret(s));
    let fresh = existing.is_none();
    let secret = existing.unwrap_or_else(generate_csrf_secret);

    let mut request = if is_safe_method(request.method()) {
        request
    } else {
        let (request, token) = match submitted_token(request).await {
            Ok(found) => found,
            Err(e) => return e.into_response(),
        };
        let Some(token) = token else {
            warn!("Rejected request without CSRF token");
            return CsrfError::MissingToken.into_response();
        };
        // a secret minted just now cannot have signed anything
        if fresh || !verify_csrf_token(&secret, &token) {
            warn!("Rejected request with invalid CSRF token");
            return CsrfError::InvalidToken.into_response();
        }
        debug!("CSRF token verified");
        request
    };

    request.extensions_mut().insert(CsrfToken {
        secret: secret.clone(),
    });

    let mut response = next.run(request).await;

    if fresh {
        if let Some(cookie) = secret_cookie(&config, &secret) {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
    }

    response
}
