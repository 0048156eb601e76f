//! `X-Line-Signature` verification.
//!
//! The platform signs the raw request body with HMAC-SHA256 keyed by the
//! channel secret and sends the base64-encoded digest in the header.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{RelayError, Result};

/// Name of the header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

fn mac(channel_secret: &str, body: &[u8]) -> Result<HmacSha256> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(channel_secret.as_bytes())
        .map_err(|e| RelayError::Config(format!("Invalid channel secret: {e}")))?;
    mac.update(body);
    Ok(mac)
}

/// Computes the base64 signature for `body`.
pub fn sign(channel_secret: &str, body: &[u8]) -> Result<String> {
    Ok(BASE64.encode(mac(channel_secret, body)?.finalize().into_bytes()))
}

/// Checks `signature` against the body in constant time.
pub fn verify(channel_secret: &str, body: &[u8], signature: &str) -> Result<()> {
    let expected = BASE64
        .decode(signature.trim())
        .map_err(|_| RelayError::InvalidSignature)?;

    mac(channel_secret, body)?
        .verify_slice(&expected)
        .map_err(|_| RelayError::InvalidSignature)
}
