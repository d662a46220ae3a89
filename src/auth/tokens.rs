//! Opaque credential tokens (refresh, invite, password reset).
//!
//! The raw value is handed to the client once; only its SHA-256 digest is stored.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 32;

/// 32 random bytes, hex encoded (64 characters).
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn expiry_from_now(ttl: Duration) -> DateTime<Utc> {
    Utc::now() + ttl
}

/// A single-use token row is redeemable when it has not been used and has not expired.
pub fn is_redeemable(expires_at: DateTime<Utc>, used_at: Option<DateTime<Utc>>) -> bool {
    used_at.is_none() && expires_at > Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation() {
        let token1 = generate_token();
        let token2 = generate_token();

        assert_eq!(token1.len(), 64);
        assert!(token1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token1, token2);
    }

    #[test]
    fn test_hash_is_stable_and_not_the_token() {
        let token = generate_token();
        assert_eq!(hash_token(&token), hash_token(&token));
        assert_ne!(hash_token(&token), token);
        assert_eq!(hash_token(&token).len(), 64);
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_redeemable_rules() {
        let future = expiry_from_now(Duration::hours(1));
        let past = Utc::now() - Duration::minutes(1);

        assert!(is_redeemable(future, None));
        assert!(!is_redeemable(past, None));
        assert!(!is_redeemable(future, Some(Utc::now())));
    }
}
