use base64::{Engine as _, engine::general_purpose};
use rand::{Rng, thread_rng};

/// Prefix carried by every ingestion API key
pub const API_KEY_PREFIX: &str = "pp_";

/// Generates a cryptographically secure API key with 256 bits of entropy.
///
/// The key is formatted as `pp_{base64url_encoded_random_bytes}` where the random bytes are
/// 32 bytes of cryptographically secure random data.
pub fn generate_api_key() -> String {
    let mut key_bytes = [0u8; 32];
    thread_rng().fill(&mut key_bytes);

    format!("{API_KEY_PREFIX}{}", general_purpose::URL_SAFE_NO_PAD.encode(key_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_api_key_format() {
        let api_key = generate_api_key();
        assert!(api_key.starts_with(API_KEY_PREFIX));
        // "pp_" + 43 base64url chars
        assert_eq!(api_key.len(), 46);
        assert!(
            api_key[API_KEY_PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_api_key_unique() {
        let keys: HashSet<String> = (0..100).map(|_| generate_api_key()).collect();
        assert_eq!(keys.len(), 100);
    }
}
