//! Cryptographic Utilities

use rand::{Rng, RngCore, rngs::OsRng};

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate a zero-padded numeric code of the given length
///
/// A 6-digit code is drawn uniformly from `000000..=999999`.
/// `digits` must be between 1 and 18.
pub fn random_numeric_code(digits: usize) -> String {
    debug_assert!((1..=18).contains(&digits));
    let modulus = 10u64.pow(digits as u32);
    let value = OsRng.gen_range(0..modulus);
    format!("{:0width$}", value, width = digits)
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes() {
        let bytes = random_bytes(32);
        assert_eq!(bytes.len(), 32);
        // Should not be all zeros (statistically)
        assert!(bytes.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_random_numeric_code_shape() {
        for _ in 0..50 {
            let code = random_numeric_code(6);
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }

        let code = random_numeric_code(4);
        assert_eq!(code.len(), 4);
    }

    #[test]
    fn test_random_numeric_code_padding() {
        // Small values must keep their leading zeros; drawing enough codes
        // makes at least one leading zero overwhelmingly likely.
        let any_padded = (0..10_000)
            .map(|_| random_numeric_code(6))
            .any(|code| code.starts_with('0'));
        assert!(any_padded);
    }

    #[test]
    fn test_constant_time_eq() {
        let a = [1u8, 2, 3, 4];
        let b = [1u8, 2, 3, 4];
        let c = [1u8, 2, 3, 5];
        assert!(constant_time_eq(&a, &b));
        assert!(!constant_time_eq(&a, &c));
        assert!(!constant_time_eq(&a, &a[..3]));
    }
}
