//! Core ledger types: hashes, identities, asset ids, reveal secrets.
//!
//! All monetary values are in units (1 COIN = 10^8 units) and use `u64`.
//! Hashes and identities serialize as lowercase hex strings so that state
//! files and operation scripts stay readable.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 32-byte hash value.
///
/// Used for commitments (SHA-256), block hashes and entropy (BLAKE3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The all-zero hash. Carries no meaning for commitments: entry is
    /// tracked per identity, and a zero commitment is accepted like any other.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash256 from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Hash256 {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_32(s).map(Self)
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Pads a tag into a fixed 32-byte identity at compile time.
const fn tagged(tag: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < tag.len() && i < 32 {
        out[i] = tag[i];
        i += 1;
    }
    out
}

/// A participant on the ledger: a seller, bidder, player or role holder.
///
/// Identities are opaque 32-byte values. Escrow accounts owned by the
/// engines are fixed tagged identities no key can sign for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identity(pub [u8; 32]);

impl Identity {
    /// The empty identity. Never a valid caller.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Escrow account of the auction engine. Holds listed assets, unswept
    /// fees, and bid payments while a bid settles.
    pub const AUCTION_ESCROW: Self = Self(tagged(b"clockwork/escrow/auction"));

    /// Escrow account of the commit-reveal lottery pot.
    pub const LOTTERY_ESCROW: Self = Self(tagged(b"clockwork/escrow/lottery"));

    /// Escrow account of the open (owner-drawn) lottery pot.
    pub const DRAW_ESCROW: Self = Self(tagged(b"clockwork/escrow/draw"));

    /// Create an identity from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a stable identity from a human-readable label (BLAKE3).
    ///
    /// Used by scripts and tests to name participants ("alice", "cfo").
    pub fn derive(label: &str) -> Self {
        Self(*blake3::hash(label.as_bytes()).as_bytes())
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the empty identity.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The empty identity or one of the engine escrow accounts.
    pub fn is_reserved(&self) -> bool {
        self.is_zero()
            || *self == Self::AUCTION_ESCROW
            || *self == Self::LOTTERY_ESCROW
            || *self == Self::DRAW_ESCROW
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Identity {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_32(s).map(Self)
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifier of a transferable asset in the external registry.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct AssetId(pub u64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for AssetId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A lottery reveal secret: a 256-bit big-endian integer.
///
/// Deserializes from either a JSON number (`12345`) or a 64-char hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Secret(pub [u8; 32]);

impl Secret {
    /// Draw a fresh secret from the OS cryptographic RNG.
    pub fn random() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<u64> for Secret {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl FromStr for Secret {
    type Err = hex::FromHexError;

    /// Accepts a 64-char hex string (optionally `0x`-prefixed) or a decimal `u64`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim_start_matches("0x").len() == 64 {
            return decode_32(s).map(Self);
        }
        match s.parse::<u64>() {
            Ok(n) => Ok(Self::from(n)),
            Err(_) => decode_32(s).map(Self),
        }
    }
}

// Secrets never appear in logs in full.
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(Self::from(n)),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

fn decode_32(s: &str) -> Result<[u8; 32], hex::FromHexError> {
    let mut out = [0u8; 32];
    hex::decode_to_slice(s.trim_start_matches("0x"), &mut out)?;
    Ok(out)
}
