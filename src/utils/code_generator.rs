//! Short code generation.
//!
//! Codes are drawn from the URL-safe base64 alphabet (`A-Z a-z 0-9 - _`).
//! The generator does not check for existing codes; uniqueness is enforced by
//! the store and the insert retry loop in
//! [`crate::application::services::LinkService`].

use base64::Engine as _;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use std::sync::Mutex;

/// Source of random bytes for code generation.
pub trait RandomSource: Send + Sync {
    fn fill_bytes(&self, buf: &mut [u8]);
}

/// Operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    /// # Panics
    ///
    /// Panics if the system random number generator fails. There is no
    /// sensible way to keep serving without entropy.
    fn fill_bytes(&self, buf: &mut [u8]) {
        getrandom::fill(buf).expect("Failed to generate random bytes");
    }
}

/// Deterministic source for tests and simulations.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn fill_bytes(&self, buf: &mut [u8]) {
        self.rng
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .fill_bytes(buf);
    }
}

/// Generates a code of exactly `length` URL-safe characters.
///
/// Reads `length` random bytes and truncates their base64 encoding, which is
/// always at least `length` characters long.
///
/// # Examples
///
/// ```
/// use linkgate::utils::code_generator::{OsRandom, generate_code};
///
/// let code = generate_code(6, &OsRandom);
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
/// ```
pub fn generate_code(length: usize, random: &dyn RandomSource) -> String {
    let mut buffer = vec![0u8; length];
    random.fill_bytes(&mut buffer);

    let mut code = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buffer);
    code.truncate(length);
    code
}

/// Returns true if `code` is non-empty and uses only the code alphabet.
///
/// Used to reject malformed path segments before touching the cache or store.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 64
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn is_url_safe(code: &str) -> bool {
        code.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    #[test]
    fn test_generate_code_has_exact_length() {
        for length in [1, 4, 6, 8, 12, 32] {
            let code = generate_code(length, &OsRandom);
            assert_eq!(code.len(), length, "length {}", length);
        }
    }

    #[test]
    fn test_generate_code_url_safe_characters() {
        let random = SeededRandom::new(7);
        for _ in 0..1000 {
            assert!(is_url_safe(&generate_code(6, &random)));
        }
    }

    #[test]
    fn test_generate_code_zero_length() {
        assert_eq!(generate_code(0, &OsRandom), "");
    }

    #[test]
    fn test_seeded_source_is_deterministic() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);

        let first: Vec<String> = (0..10).map(|_| generate_code(6, &a)).collect();
        let second: Vec<String> = (0..10).map(|_| generate_code(6, &b)).collect();

        assert_eq!(first, second);
    }

    /// 10,000 six-character codes over a 64^6 space collide with probability
    /// around 0.07%, while short codes collide almost surely. The generator
    /// alone does not guarantee uniqueness.
    #[test]
    fn test_short_codes_collide_without_store_check() {
        let random = SeededRandom::new(1);
        let mut seen = HashSet::new();
        let mut collisions = 0;

        for _ in 0..10_000 {
            if !seen.insert(generate_code(2, &random)) {
                collisions += 1;
            }
        }

        // 64^2 = 4096 possible codes
        assert!(seen.len() <= 4096);
        assert!(collisions >= 10_000 - 4096);
    }

    #[test]
    fn test_six_char_codes_are_mostly_distinct() {
        let random = SeededRandom::new(2);
        let codes: HashSet<String> = (0..10_000).map(|_| generate_code(6, &random)).collect();

        assert!(codes.len() >= 9_990);
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("abc123"));
        assert!(is_valid_code("A-b_9"));
        assert!(!is_valid_code(""));
        assert!(!is_valid_code("abc/def"));
        assert!(!is_valid_code("abc def"));
        assert!(!is_valid_code(&"a".repeat(65)));
    }
}
