use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
#[error("invalid signing key: {0}")]
pub struct SignError(String);

/// Signs `payload` with HMAC-SHA256 and returns the base64 digest.
pub fn sign_payload(secret: &[u8], payload: &[u8]) -> Result<String, SignError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|e| SignError(e.to_string()))?;
    mac.update(payload);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

pub fn verify_signature(secret: &[u8], payload: &[u8], signature_b64: &str) -> bool {
    let Ok(sig_bytes) = STANDARD.decode(signature_b64) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&sig_bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_payload_verifies() {
        let secret = b"webhook-secret";
        let payload = br#"{"rule_id":"r-1"}"#;
        let sig = sign_payload(secret, payload).unwrap();
        assert!(verify_signature(secret, payload, &sig));
    }

    #[test]
    fn tampered_payload_rejected() {
        let sig = sign_payload(b"secret", b"original").unwrap();
        assert!(!verify_signature(b"secret", b"tampered", &sig));
    }

    #[test]
    fn wrong_signature_rejected() {
        assert!(!verify_signature(b"secret", b"data", "bad-base64!"));
        assert!(!verify_signature(
            b"secret",
            b"data",
            &STANDARD.encode(b"wrong")
        ));
    }

    #[test]
    fn different_secrets_differ() {
        let a = sign_payload(b"one", b"data").unwrap();
        let b = sign_payload(b"two", b"data").unwrap();
        assert_ne!(a, b);
    }
}
