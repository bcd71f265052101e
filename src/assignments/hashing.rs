//! Deterministic character ids for running without a persistent store

use crate::constants::{CHAR_HASH_MODULUS, CHAR_HASH_MULTIPLIER, MAX_CHARACTER_ID};

/// Requested pool size clamped to `1..=MAX_CHARACTER_ID`
pub fn capped_char_count(char_count: u32) -> u32 {
    char_count.clamp(1, MAX_CHARACTER_ID)
}

/// Rolling hash over the UTF-16 code units of a wallet address
pub fn wallet_hash(owner: &str) -> u64 {
    owner.encode_utf16().fold(0u64, |hash, unit| {
        (hash * CHAR_HASH_MULTIPLIER + unit as u64) % CHAR_HASH_MODULUS
    })
}

/// Character id in `1..=capped_char_count(char_count)`, stable per address
pub fn hashed_char_id(owner: &str, char_count: u32) -> u32 {
    (wallet_hash(owner) % capped_char_count(char_count) as u64) as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_hash_values() {
        assert_eq!(wallet_hash(""), 0);
        assert_eq!(wallet_hash("a"), 97);
        assert_eq!(wallet_hash("ab"), 97 * 31 + 98);
        assert_eq!(hashed_char_id("ab", 3), 2);
        assert_eq!(hashed_char_id("ab", 1), 1);
        assert_eq!(hashed_char_id("a", 2), 2);
    }

    #[test]
    fn test_hash_wraps_at_modulus() {
        let long = "J311MsgsfcChafguWmahyxdzHvYchMcWM8vVoc4bqGWe".repeat(4);
        assert!(wallet_hash(&long) < CHAR_HASH_MODULUS);
    }

    #[test]
    fn test_char_id_is_deterministic_and_capped() {
        let owner = "ABCdefGHIjklMNOpqrSTUvwxYZ123456789abcdefXYZ";
        let first = hashed_char_id(owner, 3);
        assert_eq!(first, hashed_char_id(owner, 3));
        assert!((1..=2).contains(&first));

        for count in [0, 1, 2, 3, 10, u32::MAX] {
            let id = hashed_char_id(owner, count);
            assert!((1..=2).contains(&id), "count {} gave {}", count, id);
        }
    }

    #[test]
    fn test_capped_char_count() {
        assert_eq!(capped_char_count(0), 1);
        assert_eq!(capped_char_count(1), 1);
        assert_eq!(capped_char_count(3), 2);
    }
}
