//! One-time account tokens.

use rand::Rng;
use std::fmt::Write;

/// Random bytes per token, rendered as twice as many hex characters.
const TOKEN_BYTES: usize = 20;

/// Generate a fresh activation key.
#[must_use]
pub fn generate_activation_key() -> String {
    random_hex_token()
}

/// Generate a fresh password reset key.
#[must_use]
pub fn generate_reset_key() -> String {
    random_hex_token()
}

fn random_hex_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; TOKEN_BYTES] = rng.random();

    bytes
        .iter()
        .fold(String::with_capacity(TOKEN_BYTES * 2), |mut acc, b| {
            let _ = write!(acc, "{b:02x}");
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tokens_are_url_safe_hex() {
        let key = generate_activation_key();
        assert_eq!(key.len(), TOKEN_BYTES * 2);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn tokens_do_not_repeat() {
        let keys: HashSet<String> = (0..1000).map(|_| generate_reset_key()).collect();
        assert_eq!(keys.len(), 1000);
    }
}
