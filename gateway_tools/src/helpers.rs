use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Calculates the base64-encoded HMAC-SHA256 signature of `data` under `secret`.
///
/// This is the same digest the gateway attaches to webhook deliveries, so verification is a
/// straight comparison of the header value against this result computed over the *exact* raw
/// request bytes. Signing a re-serialized form of the payload will not match.
pub fn calculate_hmac(secret: &str, data: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(data);
    base64::encode(mac.finalize().into_bytes())
}
