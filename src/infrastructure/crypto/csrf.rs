//! Anti-forgery token generation and verification
//!
//! Each client holds a random secret (kept in a cookie). Tokens are
//! `<salt>-<base64url(sha256(salt "-" secret))>`, so every issue yields a
//! different token and any of them verifies against the same secret.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Secret length in bytes (hex encoded in the cookie).
const SECRET_BYTES: usize = 32;

/// Salt length in characters.
const SALT_LEN: usize = 8;

/// Generate a new per-client secret.
pub fn generate_csrf_secret() -> String {
    let bytes: [u8; SECRET_BYTES] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Whether a cookie value looks like a secret we issued.
pub fn is_valid_secret(secret: &str) -> bool {
    secret.len() == SECRET_BYTES * 2 && secret.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Issue a fresh token bound to `secret`.
pub fn generate_csrf_token(secret: &str) -> String {
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect();
    tokenize(&salt, secret)
}

/// Check `token` against `secret` in constant time.
pub fn verify_csrf_token(secret: &str, token: &str) -> bool {
    let Some((salt, _)) = token.split_once('-') else {
        return false;
    };
    if salt.is_empty() {
        return false;
    }
    let expected = tokenize(salt, secret);
    constant_time_eq(expected.as_bytes(), token.as_bytes())
}

fn tokenize(salt: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"-");
    hasher.update(secret.as_bytes());
    format!("{}-{}", salt, URL_SAFE_NO_PAD.encode(hasher.finalize()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
