//! Admin authentication and session management.
//!
//! Handles admin sessions with HMAC-signed cookies. The admin area is
//! optional and enabled by setting the PROOFROOM_PASSWORD environment
//! variable; the password doubles as the signing secret.

use axum_extra::extract::CookieJar;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Session cookie name
pub const SESSION_COOKIE: &str = "proofroom_session";

/// Session time-to-live in hours
pub const SESSION_TTL_HOURS: i64 = 12;

// ============================================================================
// Session Structure
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Session {
    created: i64,
    expires: i64,
    nonce: String,
}

// ============================================================================
// Authentication Functions
// ============================================================================

/// Constant-time password comparison
pub fn password_matches(input: &str, expected: &str) -> bool {
    let input_bytes = input.as_bytes();
    let expected_bytes = expected.as_bytes();
    input_bytes.len() == expected_bytes.len() && input_bytes.ct_eq(expected_bytes).unwrap_u8() == 1
}

/// Create a new session token signed with `secret`
pub fn create_session(secret: &[u8]) -> Option<String> {
    create_session_at(secret, Utc::now().timestamp())
}

fn create_session_at(secret: &[u8], now: i64) -> Option<String> {
    let nonce: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();

    let session = Session {
        created: now,
        expires: now + (SESSION_TTL_HOURS * 3600),
        nonce,
    };
    let session_json = serde_json::to_string(&session).ok()?;
    let signature = sign(secret, &session_json)?;

    Some(format!("{}.{}", base64_encode(&session_json), signature))
}

fn sign(secret: &[u8], payload: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    Some(hex_encode(mac.finalize().into_bytes().as_slice()))
}

/// Verify a session token
pub fn verify_session(token: &str, secret: &[u8]) -> bool {
    let (encoded, signature) = match token.split_once('.') {
        Some(parts) => parts,
        None => return false,
    };

    let session_json = match base64_decode(encoded) {
        Some(s) => s,
        None => return false,
    };

    let expected_sig = match sign(secret, &session_json) {
        Some(s) => s,
        None => return false,
    };

    // Constant-time comparison to prevent timing attacks
    let sig_bytes = signature.as_bytes();
    let expected_bytes = expected_sig.as_bytes();
    if sig_bytes.len() != expected_bytes.len() {
        return false;
    }
    if sig_bytes.ct_eq(expected_bytes).unwrap_u8() != 1 {
        return false;
    }

    let session: Session = match serde_json::from_str(&session_json) {
        Ok(s) => s,
        Err(_) => return false,
    };

    Utc::now().timestamp() < session.expires
}

/// Check if the admin is logged in via cookie
pub fn is_logged_in(jar: &CookieJar, password: Option<&str>) -> bool {
    let secret = match password {
        Some(p) => p.as_bytes(),
        None => return false,
    };

    match jar.get(SESSION_COOKIE) {
        Some(cookie) => verify_session(cookie.value(), secret),
        None => false,
    }
}

pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE,
        token,
        SESSION_TTL_HOURS * 3600
    )
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; Secure; Max-Age=0", SESSION_COOKIE)
}

// ============================================================================
// Encoding Helpers
// ============================================================================

/// Encode a string as base64
pub fn base64_encode(s: &str) -> String {
    STANDARD.encode(s.as_bytes())
}

/// Decode a base64 string
pub fn base64_decode(s: &str) -> Option<String> {
    let bytes = STANDARD.decode(s).ok()?;
    String::from_utf8(bytes).ok()
}

/// Encode bytes as hexadecimal
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn test_session_round_trip() {
        let token = create_session(b"secret").unwrap();
        assert!(verify_session(&token, b"secret"));
        assert!(!verify_session(&token, b"other"));
    }

    #[test]
    fn test_tampered_session_rejected() {
        let token = create_session(b"secret").unwrap();
        let (payload, sig) = token.split_once('.').unwrap();
        let flipped = if sig.ends_with('0') { '1' } else { '0' };
        let forged = format!("{}.{}{}", payload, &sig[..sig.len() - 1], flipped);
        assert!(!verify_session(&forged, b"secret"));
        assert!(!verify_session("garbage", b"secret"));
        assert!(!verify_session("a.b", b"secret"));
    }

    #[test]
    fn test_expired_session_rejected() {
        let long_ago = Utc::now().timestamp() - SESSION_TTL_HOURS * 3600 - 1;
        let token = create_session_at(b"secret", long_ago).unwrap();
        assert!(!verify_session(&token, b"secret"));
    }

    #[test]
    fn test_password_matches() {
        assert!(password_matches("hunter2", "hunter2"));
        assert!(!password_matches("hunter", "hunter2"));
        assert!(!password_matches("hunter3", "hunter2"));
    }

    #[test]
    fn test_is_logged_in_requires_password() {
        let token = create_session(b"pw").unwrap();
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, token));
        assert!(is_logged_in(&jar, Some("pw")));
        assert!(!is_logged_in(&jar, None));
        assert!(!is_logged_in(&CookieJar::new(), Some("pw")));
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0x00, 0xab, 0xff]), "00abff");
    }
}
