//! Security utilities for API key hashing and webhook signature verification.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook delivery, in seconds.
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Hashes an API key using SHA-256.
pub fn hash_api_key(key: &str) -> String {
    let hash = Sha256::digest(key.as_bytes());
    hex::encode(hash)
}

/// Verifies an API key against a stored hash using constant-time comparison.
pub fn verify_api_key(input: &str, stored_hash: &str) -> bool {
    let input_hash = hash_api_key(input);
    input_hash.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

/// Why a webhook signature was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Unable to extract timestamp and signatures from header")]
    MalformedHeader,

    #[error("Timestamp outside the tolerance zone")]
    TimestampOutOfTolerance,

    #[error("No signatures found matching the expected signature for payload")]
    Mismatch,
}

/// HMAC-SHA256 of `"<timestamp>.<payload>"`, hex encoded.
pub fn sign_webhook(payload: &[u8], timestamp: i64, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Builds a `t=<timestamp>,v1=<signature>` signature header.
pub fn webhook_signature_header(payload: &[u8], timestamp: i64, secret: &str) -> String {
    format!(
        "t={},v1={}",
        timestamp,
        sign_webhook(payload, timestamp, secret)
    )
}

/// Verifies a `t=...,v1=...` signature header against the raw payload.
///
/// Any `v1` entry may match; other schemes are ignored.
pub fn verify_webhook_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }

    let expected = sign_webhook(payload, timestamp, secret);
    let matched = signatures
        .iter()
        .any(|sig| bool::from(expected.as_bytes().ct_eq(sig.as_bytes())));
    if !matched {
        return Err(SignatureError::Mismatch);
    }

    if now.abs_diff(timestamp) > tolerance_secs.unsigned_abs() {
        return Err(SignatureError::TimestampOutOfTolerance);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_123";
    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_api_key_hashing() {
        let key = "sk_test_abc123";
        let hash = hash_api_key(key);

        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_api_key(key));
    }

    #[test]
    fn test_api_key_verification() {
        let key = "sk_test_abc123";
        let hash = hash_api_key(key);

        assert!(verify_api_key(key, &hash));
        assert!(!verify_api_key("wrong_key", &hash));
    }

    #[test]
    fn test_webhook_signature_verification() {
        let payload = br#"{"id":"evt_1","type":"payment_intent.succeeded"}"#;
        let header = webhook_signature_header(payload, NOW, SECRET);

        assert_eq!(verify_webhook_signature(payload, &header, SECRET, NOW + 10, 300), Ok(()));
        assert_eq!(
            verify_webhook_signature(payload, &header, "whsec_other", NOW, 300),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify_webhook_signature(b"tampered", &header, SECRET, NOW, 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_stale_webhook_is_rejected() {
        let payload = b"{}";
        let header = webhook_signature_header(payload, NOW, SECRET);

        assert_eq!(
            verify_webhook_signature(payload, &header, SECRET, NOW + 301, 300),
            Err(SignatureError::TimestampOutOfTolerance)
        );
    }

    #[test]
    fn test_extreme_timestamps_are_out_of_tolerance() {
        let payload = b"{}";
        for timestamp in [i64::MIN, i64::MAX] {
            let header = webhook_signature_header(payload, timestamp, SECRET);
            assert_eq!(
                verify_webhook_signature(payload, &header, SECRET, NOW, 300),
                Err(SignatureError::TimestampOutOfTolerance)
            );
        }
    }

    #[test]
    fn test_any_v1_signature_may_match() {
        let payload = b"{}";
        let good = sign_webhook(payload, NOW, SECRET);
        let header = format!("t={NOW},v0=legacy,v1=deadbeef,v1={good}");

        assert_eq!(verify_webhook_signature(payload, &header, SECRET, NOW, 300), Ok(()));
    }

    #[test]
    fn test_malformed_header() {
        assert_eq!(
            verify_webhook_signature(b"{}", "garbage", SECRET, NOW, 300),
            Err(SignatureError::MalformedHeader)
        );
        assert_eq!(
            verify_webhook_signature(b"{}", "t=123", SECRET, NOW, 300),
            Err(SignatureError::MalformedHeader)
        );
    }
}
