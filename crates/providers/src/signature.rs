//! Webhook signatures: `t=<unix>,v1=<hex hmac-sha256 of "<t>.<payload>">`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::ProviderError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age (and clock skew) of a signature timestamp.
pub const TOLERANCE_SECS: i64 = 300;

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

/// Hex signature over `"<timestamp>.<payload>"`.
pub fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    hex::encode(&mac_for(secret, timestamp, payload).finalize().into_bytes())
}

/// Complete header value for `payload` signed at `timestamp`.
pub fn header_value(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!("t={timestamp},v1={}", sign(secret, timestamp, payload))
}

/// Verify `header` against `payload` at time `now` (unix seconds).
///
/// Any `v1` entry may match; comparison is constant-time. An empty secret
/// rejects everything.
pub fn verify(secret: &str, payload: &[u8], header: &str, now: i64) -> Result<(), ProviderError> {
    if secret.is_empty() {
        return Err(ProviderError::InvalidSignature(
            "webhook secret not configured".to_string(),
        ));
    }

    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| ProviderError::InvalidSignature("missing timestamp".to_string()))?;
    if (now - timestamp).abs() > TOLERANCE_SECS {
        return Err(ProviderError::InvalidSignature(
            "timestamp outside tolerance".to_string(),
        ));
    }

    let matched = candidates.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac_for(secret, timestamp, payload).verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err(ProviderError::InvalidSignature(
            "no matching signature".to_string(),
        ));
    }
    Ok(())
}

/// Minimal hex helpers (avoids pulling in an extra crate).
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn decode(s: &str) -> Result<Vec<u8>, ()> {
        if s.len() % 2 != 0 {
            return Err(());
        }
        (0..s.len())
            .step_by(2)
            .map(|i| s.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()).ok_or(()))
            .collect()
    }
}
