//! HMAC-SHA256 verification of GitHub push deliveries.
//!
//! GitHub signs the raw request body with the shared webhook secret and sends
//! the result in `X-Hub-Signature-256` as `sha256=<hex>`. Verification must run
//! over the bytes exactly as received: parsing and re-serializing the JSON
//! changes whitespace and key order, and with them the digest.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the payload signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Decodes a `sha256=<hex>` header value into the raw digest bytes.
///
/// Returns `None` when the prefix is missing or the hex is malformed.
///
/// ```
/// use changelog_sync::webhooks::parse_signature_header;
///
/// assert_eq!(parse_signature_header("sha256=0a0b"), Some(vec![0x0a, 0x0b]));
/// assert!(parse_signature_header("sha1=0a0b").is_none());
/// assert!(parse_signature_header("sha256=not-hex").is_none());
/// ```
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.strip_prefix(SIGNATURE_PREFIX)?;
    hex::decode(hex_sig).ok()
}

/// Computes the HMAC-SHA256 digest of `payload` under `secret`.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a digest the way GitHub sends it.
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("{SIGNATURE_PREFIX}{}", hex::encode(signature))
}

/// Signs `payload` and returns the ready-to-send header value.
pub fn sign(payload: &[u8], secret: &[u8]) -> String {
    format_signature_header(&compute_signature(payload, secret))
}

/// Checks `signature_header` against the digest of `payload`.
///
/// A missing header, a malformed header and a mismatching digest all return
/// `false`. The comparison is constant-time (`Mac::verify_slice`).
///
/// ```
/// use changelog_sync::webhooks::{sign, verify_signature};
///
/// let body = br#"{"ref":"refs/heads/main","commits":[]}"#;
/// let header = sign(body, b"s3cret");
///
/// assert!(verify_signature(body, Some(&header), b"s3cret"));
/// assert!(!verify_signature(body, Some(&header), b"other"));
/// assert!(!verify_signature(body, None, b"s3cret"));
/// ```
pub fn verify_signature(payload: &[u8], signature_header: Option<&str>, secret: &[u8]) -> bool {
    let Some(expected) = signature_header.and_then(parse_signature_header) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}
