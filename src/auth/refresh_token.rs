/// Refresh token storage helpers
///
/// The repository never stores a refresh token as issued. It keeps the
/// SHA-256 fingerprint, and a presented token is redeemable only if its
/// fingerprint equals the stored one.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};

const TOKEN_ID_LENGTH: usize = 32;

/// Random identifier used as the `jti` claim
pub fn generate_token_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Hex SHA-256 of a refresh token
pub fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_id() {
        let id = generate_token_id();

        assert_eq!(id.len(), TOKEN_ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, generate_token_id());
    }

    #[test]
    fn test_fingerprint() {
        let token = "header.payload.signature";
        let first = fingerprint(token);

        assert_eq!(first, fingerprint(token));
        assert_ne!(first, token);
        assert_eq!(first.len(), 64);
        assert_ne!(first, fingerprint("header.payload.signaturX"));
    }
}
