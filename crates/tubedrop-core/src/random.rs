//! Random identifiers.
//!
//! Output tokens and fake file names only need to be improbable enough not to
//! collide with one another; they are not secrets.

use rand::Rng;

/// Lowercase ASCII letters. Tokens end up in file names and object keys, where
/// uppercase letters are not always allowed.
pub const LOWERCASE_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Generate a random string of `length` lowercase letters.
pub fn generate_random_string(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| LOWERCASE_LETTERS[rng.random_range(0..LOWERCASE_LETTERS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generates_requested_length() {
        assert_eq!(generate_random_string(8).len(), 8);
        assert_eq!(generate_random_string(24).len(), 24);
        assert!(generate_random_string(0).is_empty());
    }

    #[test]
    fn test_only_lowercase_letters() {
        let token = generate_random_string(256);
        assert!(token.bytes().all(|b| b.is_ascii_lowercase()));
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..1000).map(|_| generate_random_string(8)).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
