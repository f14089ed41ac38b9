//! Short code generation.
//!
//! Codes are drawn from the URL-safe base64 alphabet (`A-Z a-z 0-9 - _`),
//! so they can be embedded in a path segment without escaping.

use base64::Engine as _;
use rand::{CryptoRng, RngCore};

/// Length of the first candidate code.
pub const BASE_CODE_LENGTH: usize = 7;

/// Candidates tried before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 6;

/// Code length for the given 0-based attempt: 7, 8, 7, 8, ...
pub fn code_length_for_attempt(attempt: usize) -> usize {
    BASE_CODE_LENGTH + attempt % 2
}

/// Generates a random code of exactly `length` characters.
///
/// Each output character encodes six bits of fresh randomness from `rng`;
/// no state is kept between calls.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(7, &mut rand::rng());
/// assert_eq!(code.len(), 7);
/// ```
pub fn generate_code<R>(length: usize, rng: &mut R) -> String
where
    R: RngCore + CryptoRng + ?Sized,
{
    let mut buffer = vec![0u8; length.div_ceil(4) * 3];
    rng.fill_bytes(&mut buffer);

    let mut code = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buffer);
    code.truncate(length);
    code
}

/// Returns true if every character belongs to the generator alphabet.
pub fn is_url_safe(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
