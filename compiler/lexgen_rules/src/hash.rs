//! Content hashing for rule sets.
//!
//! The hash names every build artifact on disk, so it must be stable across
//! processes, platforms and compiler releases. `std`'s `DefaultHasher` makes
//! no such promise; the `FxHash` mixing step below does.

use std::fmt;
use std::hash::Hasher;
use std::ops::BitXor;

/// A content hash of rendered rule text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(u64);

impl ContentHash {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Format as a fixed-width hex string (used in file names).
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() > 16 {
            return None;
        }
        u64::from_str_radix(s, 16).ok().map(Self)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A fast, non-cryptographic hasher based on `FxHash`.
///
/// Same mixing step as rustc's incremental hashing. Bytes are fed one at a
/// time, so the result does not depend on the host's endianness.
#[derive(Default)]
struct FxHasher {
    hash: u64,
}

impl FxHasher {
    const K: u64 = 0x517c_c1b7_2722_0a95;
}

impl Hasher for FxHasher {
    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.hash = self
                .hash
                .rotate_left(5)
                .bitxor(u64::from(*byte))
                .wrapping_mul(Self::K);
        }
    }

    fn finish(&self) -> u64 {
        self.hash
    }
}

/// Hash a sequence of text parts.
///
/// Each part is followed by a `0x00` separator so that `["ab", "c"]` and
/// `["a", "bc"]` hash differently.
#[must_use]
pub fn hash_parts(parts: &[&str]) -> ContentHash {
    let mut hasher = FxHasher::default();
    for part in parts {
        hasher.write(part.as_bytes());
        hasher.write(&[0]);
    }
    ContentHash(hasher.finish())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_display() {
        let hash = ContentHash::new(0x1234_5678_9abc_def0);
        assert_eq!(hash.to_string(), "123456789abcdef0");
        assert_eq!(hash.to_hex(), hash.to_string());
    }

    #[test]
    fn test_content_hash_from_hex() {
        let hash = ContentHash::from_hex("123456789abcdef0").unwrap();
        assert_eq!(hash.value(), 0x1234_5678_9abc_def0);
        assert_eq!(ContentHash::from_hex(&hash.to_hex()), Some(hash));
    }

    #[test]
    fn test_content_hash_from_hex_invalid() {
        assert!(ContentHash::from_hex("not_hex").is_none());
        assert!(ContentHash::from_hex("").is_none());
        assert!(ContentHash::from_hex("00000000000000000").is_none());
    }

    #[test]
    fn test_hash_parts_deterministic() {
        let h1 = hash_parts(&["token\t[^ ]+\n", "[^ ]+\t{ }\n"]);
        let h2 = hash_parts(&["token\t[^ ]+\n", "[^ ]+\t{ }\n"]);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_hash_parts_separates_boundaries() {
        assert_ne!(hash_parts(&["ab", "c"]), hash_parts(&["a", "bc"]));
        assert_ne!(hash_parts(&["a"]), hash_parts(&["a", ""]));
    }

    #[test]
    fn test_hash_is_stable_across_releases() {
        // Artifacts on disk are named by this value; changing the mixing
        // step orphans every cached scanner.
        assert_eq!(hash_parts(&[]).value(), 0);
        let mut hasher = FxHasher::default();
        hasher.write(&[1]);
        assert_eq!(hasher.finish(), FxHasher::K);
    }
}
