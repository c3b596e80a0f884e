//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] is a 64-bit hash computed from a fully-qualified type name or from
//! a method signature. Because the hash is derived from the name alone, a type
//! recovered from persisted data (where only its name survives) gets the same
//! identity it had when the data was written, without any registration step.
//!
//! # Hash Computation
//!
//! Uses XXHash64 with domain-specific mixing constants so that a type and a
//! method sharing a name never collide.
//!
//! # Examples
//!
//! ```
//! use callwire_core::TypeHash;
//!
//! let int_hash = TypeHash::from_name("int");
//! assert_eq!(int_hash, TypeHash::from_name("int"));
//!
//! let player = TypeHash::from_name("Game.Player");
//! let a = TypeHash::from_method(player, "SetScore", &[TypeHash::from_name("int")]);
//! let b = TypeHash::from_method(player, "SetScore", &[TypeHash::from_name("float")]);
//! assert_ne!(a, b);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant mixed between parameter components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for instance method hashes
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;

    /// Parameter position mixing constants.
    /// Each position gets its own constant so parameter order matters.
    pub const PARAM_MARKERS: [u64; 8] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
    ];
}

/// A deterministic 64-bit hash identifying a type or a method.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a fully-qualified type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a method hash from owner type, method name and parameter type hashes.
    ///
    /// Parameter order matters: `(int, bool)` and `(bool, int)` hash differently.
    #[inline]
    pub fn from_method(owner: TypeHash, name: &str, param_hashes: &[TypeHash]) -> Self {
        let mut hash = hash_constants::METHOD ^ owner.0 ^ xxh64(name.as_bytes(), 0);
        for (i, param) in param_hashes.iter().enumerate() {
            let marker = hash_constants::PARAM_MARKERS
                .get(i)
                .copied()
                .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
            // wrapping_mul keeps this non-commutative, unlike a plain XOR fold
            hash = hash
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(marker ^ param.0);
        }
        TypeHash(hash)
    }

    /// Check if this is the empty hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_hash_is_deterministic() {
        assert_eq!(TypeHash::from_name("Vector3"), TypeHash::from_name("Vector3"));
        assert_ne!(TypeHash::from_name("Vector3"), TypeHash::from_name("Vector3Int"));
    }

    #[test]
    fn method_hash_depends_on_parameter_order() {
        let owner = TypeHash::from_name("Player");
        let int = TypeHash::from_name("int");
        let boolean = TypeHash::from_name("bool");

        let a = TypeHash::from_method(owner, "Apply", &[int, boolean]);
        let b = TypeHash::from_method(owner, "Apply", &[boolean, int]);
        assert_ne!(a, b);
    }

    #[test]
    fn method_hash_depends_on_owner() {
        let int = TypeHash::from_name("int");
        let a = TypeHash::from_method(TypeHash::from_name("Player"), "SetScore", &[int]);
        let b = TypeHash::from_method(TypeHash::from_name("Enemy"), "SetScore", &[int]);
        assert_ne!(a, b);
    }

    #[test]
    fn type_and_method_domains_differ() {
        let as_type = TypeHash::from_name("Reset");
        let as_method = TypeHash::from_method(TypeHash::EMPTY, "Reset", &[]);
        assert_ne!(as_type, as_method);
    }

    #[test]
    fn empty_hash() {
        assert!(TypeHash::EMPTY.is_empty());
        assert!(!TypeHash::from_name("int").is_empty());
    }
}
