//! Hash primitives for the Clockwork ledger.
//!
//! - Lottery commitments use SHA-256 over `identity (32 bytes) || secret
//!   (32 bytes, big-endian)`. Binding the identity into the preimage stops
//!   one player from replaying another player's commitment.
//! - Block hashes and entropy use BLAKE3.
//!
//! # Entropy
//!
//! Winner selection reduces a 256-bit entropy value modulo the player count.
//! The entropy is derived from the previous block hash, which whoever orders
//! operations can influence. It is reproducible, not secure.

use sha2::{Digest, Sha256};

use crate::types::{Hash256, Identity, Secret};

/// One-way commitment function shared by players (when building a
/// commitment) and the lottery (when verifying a reveal).
pub trait CommitmentScheme {
    /// Commit `identity` to `secret`.
    fn commit(&self, identity: &Identity, secret: &Secret) -> Hash256;

    /// Check a revealed secret against a stored commitment.
    ///
    /// Default implementation recomputes the commitment and compares.
    fn verify(&self, identity: &Identity, secret: &Secret, commitment: &Hash256) -> bool {
        self.commit(identity, secret) == *commitment
    }
}

/// SHA-256 commitments: `sha256(identity || secret)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256Commitment;

impl CommitmentScheme for Sha256Commitment {
    fn commit(&self, identity: &Identity, secret: &Secret) -> Hash256 {
        commitment_hash(identity, secret)
    }
}

/// Compute `sha256(identity || secret)`.
pub fn commitment_hash(identity: &Identity, secret: &Secret) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    hasher.update(secret.as_bytes());
    Hash256(hasher.finalize().into())
}

/// Hash of the block sealed at `height` on top of `prev`.
///
/// `blake3(prev || height_le || digest)` where `digest` identifies the
/// operation the block carried (empty for blocks with no operation).
pub fn block_hash(prev: &Hash256, height: u64, digest: &[u8]) -> Hash256 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(prev.as_bytes());
    hasher.update(&height.to_le_bytes());
    hasher.update(digest);
    Hash256(*hasher.finalize().as_bytes())
}

/// Entropy available to an operation executing at `height` on top of the
/// parent block `parent`: `blake3(parent || height_le)`.
pub fn block_entropy(parent: &Hash256, height: u64) -> Hash256 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(parent.as_bytes());
    hasher.update(&height.to_le_bytes());
    Hash256(*hasher.finalize().as_bytes())
}

/// Reduce a 256-bit big-endian entropy value modulo `len`.
///
/// Exact big-integer reduction, byte at a time. Returns `None` for `len == 0`.
pub fn index_from_entropy(entropy: &Hash256, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let modulus = len as u128;
    let rem = entropy
        .as_bytes()
        .iter()
        .fold(0u128, |acc, &b| ((acc << 8) | b as u128) % modulus);
    Some(rem as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn commitment_is_deterministic() {
        let alice = Identity::derive("alice");
        let s = Secret::from(12345u64);
        assert_eq!(commitment_hash(&alice, &s), commitment_hash(&alice, &s));
    }

    #[test]
    fn commitment_binds_identity() {
        let s = Secret::from(12345u64);
        assert_ne!(
            commitment_hash(&Identity::derive("alice"), &s),
            commitment_hash(&Identity::derive("bob"), &s)
        );
    }

    #[test]
    fn commitment_binds_secret() {
        let alice = Identity::derive("alice");
        assert_ne!(
            commitment_hash(&alice, &Secret::from(1u64)),
            commitment_hash(&alice, &Secret::from(2u64))
        );
    }

    #[test]
    fn commitment_matches_manual_sha256() {
        let alice = Identity([7u8; 32]);
        let s = Secret::from(1u64);
        let mut preimage = Vec::new();
        preimage.extend_from_slice(&[7u8; 32]);
        preimage.extend_from_slice(s.as_bytes());
        let expected: [u8; 32] = Sha256::digest(&preimage).into();
        assert_eq!(commitment_hash(&alice, &s), Hash256(expected));
    }

    #[test]
    fn scheme_verify_uses_commit() {
        let scheme = Sha256Commitment;
        let alice = Identity::derive("alice");
        let s = Secret::from(5u64);
        let c = scheme.commit(&alice, &s);
        assert!(scheme.verify(&alice, &s, &c));
        assert!(!scheme.verify(&alice, &Secret::from(6u64), &c));
    }

    #[test]
    fn block_hash_chains() {
        let h1 = block_hash(&Hash256::ZERO, 1, b"op");
        let h2 = block_hash(&h1, 2, b"op");
        assert_ne!(h1, h2);
        assert_ne!(h1, block_hash(&Hash256::ZERO, 1, b"other"));
    }

    #[test]
    fn index_from_entropy_small_values() {
        let mut bytes = [0u8; 32];
        bytes[31] = 7;
        assert_eq!(index_from_entropy(&Hash256(bytes), 5), Some(2));
        assert_eq!(index_from_entropy(&Hash256(bytes), 1), Some(0));
        assert_eq!(index_from_entropy(&Hash256(bytes), 0), None);
    }

    #[test]
    fn index_from_entropy_multi_byte() {
        // 0x0100 = 256; 256 mod 3 = 1
        let mut bytes = [0u8; 32];
        bytes[30] = 1;
        assert_eq!(index_from_entropy(&Hash256(bytes), 3), Some(1));
    }

    proptest! {
        #[test]
        fn index_always_in_range(bytes in any::<[u8; 32]>(), len in 1usize..10_000) {
            let idx = index_from_entropy(&Hash256(bytes), len).unwrap();
            prop_assert!(idx < len);
        }

        #[test]
        fn index_matches_u64_reduction_for_small_entropy(v in any::<u64>(), len in 1usize..1_000) {
            let mut bytes = [0u8; 32];
            bytes[24..].copy_from_slice(&v.to_be_bytes());
            prop_assert_eq!(index_from_entropy(&Hash256(bytes), len), Some((v % len as u64) as usize));
        }
    }
}
