use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// DingTalk robot signature.
///
/// HMAC-SHA256 keyed by the secret over `"{timestamp_ms}\n{secret}"`,
/// base64-encoded. Delivered as `timestamp` and `sign` query parameters.
pub fn dingtalk_sign(secret: &str, timestamp_ms: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(format!("{}\n{}", timestamp_ms, secret).as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Lanxin bot signature.
///
/// HMAC-SHA256 keyed by `"{timestamp_s}@{secret}"` over an empty message,
/// base64-encoded. Delivered as a `sign` body field next to the string
/// `timestamp`.
pub fn lanxin_sign(secret: &str, timestamp_s: i64) -> String {
    let mac = HmacSha256::new_from_slice(format!("{}@{}", timestamp_s, secret).as_bytes())
        .expect("HMAC can take key of any size");
    BASE64.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dingtalk_sign_is_deterministic() {
        let a = dingtalk_sign("secret", 1700000000000);
        let b = dingtalk_sign("secret", 1700000000000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_dingtalk_sign_is_base64_of_a_sha256_digest() {
        let sig = dingtalk_sign("secret", 1700000000000);
        let raw = BASE64.decode(sig).unwrap();
        assert_eq!(raw.len(), 32);
    }

    #[test]
    fn test_dingtalk_sign_varies_with_secret_and_timestamp() {
        let base = dingtalk_sign("secret", 1700000000000);
        assert_ne!(base, dingtalk_sign("other", 1700000000000));
        assert_ne!(base, dingtalk_sign("secret", 1700000060000));
    }

    #[test]
    fn test_lanxin_sign_is_base64_of_a_sha256_digest() {
        let sig = lanxin_sign("secret", 1700000000);
        let raw = BASE64.decode(sig).unwrap();
        assert_eq!(raw.len(), 32);
    }

    #[test]
    fn test_lanxin_sign_varies_with_secret_and_timestamp() {
        let base = lanxin_sign("secret", 1700000000);
        assert_ne!(base, lanxin_sign("other", 1700000000));
        assert_ne!(base, lanxin_sign("secret", 1700000060));
    }

    #[test]
    fn test_schemes_differ_for_the_same_inputs() {
        // The two providers must not accidentally share a signature.
        assert_ne!(
            dingtalk_sign("secret", 1700000000),
            lanxin_sign("secret", 1700000000)
        );
    }
}
